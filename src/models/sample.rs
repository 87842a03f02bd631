// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Normalized GPS fix model.

use chrono::{DateTime, Utc};
use geo::Point;
use serde::{Deserialize, Serialize};

/// One GPS fix as delivered by a location source.
///
/// Immutable once constructed. A negative `horizontal_accuracy_m` means the
/// sensor flagged the fix invalid; a negative `speed_mps` means speed was
/// unavailable (clamped to zero only when mapped to a route point).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    /// When the fix was measured
    pub timestamp: DateTime<Utc>,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Platform-reported uncertainty radius in meters (negative = invalid)
    pub horizontal_accuracy_m: f64,
    /// Ground speed in meters per second (negative = unavailable)
    pub speed_mps: f64,
}

impl LocationSample {
    /// Position as a `geo` point (x = longitude, y = latitude).
    pub fn point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}
