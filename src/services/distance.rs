// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Running geodesic distance over consecutively accepted samples.

use geo::{Distance, Haversine, Point};

use crate::models::LocationSample;

/// Maintains a running total of great-circle distance between consecutive
/// accepted samples.
///
/// The total is monotonically non-decreasing between resets; nothing is
/// ever subtracted or decayed.
#[derive(Debug, Clone, Default)]
pub struct DistanceAccumulator {
    last_point: Option<Point<f64>>,
    total_meters: f64,
}

impl DistanceAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero the total and forget the previous sample.
    ///
    /// Called when a session starts.
    pub fn reset(&mut self) {
        self.last_point = None;
        self.total_meters = 0.0;
    }

    /// Fold one accepted sample into the running total.
    ///
    /// Returns the distance added in meters: zero for the first sample
    /// after a reset, the haversine distance from the previous sample
    /// otherwise.
    pub fn accumulate(&mut self, sample: &LocationSample) -> f64 {
        let point = sample.point();
        let delta = match self.last_point {
            Some(last) => Haversine.distance(last, point),
            None => 0.0,
        };
        self.last_point = Some(point);
        self.total_meters += delta;
        delta
    }

    /// Running total in meters.
    pub fn total_meters(&self) -> f64 {
        self.total_meters
    }
}
