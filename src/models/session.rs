// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Recording session model: the persisted shape of one start-to-stop
//! activity, with its route points, notes, and photos.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;
use validator::Validate;

use crate::models::LocationSample;
use crate::time_utils::{format_utc_rfc3339, time_of_day_bucket};

/// Kind of activity being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ActivityKind {
    Ride,
    Walk,
    Hike,
    Run,
    Other,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Ride => "Ride",
            ActivityKind::Walk => "Walk",
            ActivityKind::Hike => "Hike",
            ActivityKind::Run => "Run",
            ActivityKind::Other => "Other",
        }
    }
}

/// Permanent representation of one trail point in a saved session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// When the fix was measured
    pub timestamp: DateTime<Utc>,
    /// Ground speed in meters per second, zero when the fix had none
    pub speed_mps: f64,
}

impl RoutePoint {
    /// Map a live sample to its persisted form.
    ///
    /// Negative (unavailable) speed readings become 0.
    pub fn from_sample(sample: &LocationSample) -> Self {
        Self {
            latitude: sample.latitude,
            longitude: sample.longitude,
            timestamp: sample.timestamp,
            speed_mps: sample.speed_mps.max(0.0),
        }
    }
}

/// Free-text note attached to a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteNote {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub body: String,
    /// Latitude at capture time, if a position was known
    pub latitude: Option<f64>,
    /// Longitude at capture time, if a position was known
    pub longitude: Option<f64>,
}

/// Photo attached to a session. The payload is the raw encoded image;
/// compression and display are the caller's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutePhoto {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(with = "serde_bytes")]
    pub image: Vec<u8>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// One completed start-to-stop recording of an activity.
///
/// Built exactly once, at stop, from the frozen trail. The session
/// exclusively owns its route points, notes, and photos: deleting the
/// session deletes them all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingSession {
    pub id: Uuid,
    pub title: String,
    /// Chosen activity kind, if the user picked one
    pub kind: Option<ActivityKind>,
    pub started_at: DateTime<Utc>,
    /// Set when the session was stopped cleanly
    pub ended_at: Option<DateTime<Utc>>,
    /// Accumulated distance in meters
    pub distance_meters: f64,
    /// The frozen trail in arrival order
    pub route: Vec<RoutePoint>,
    pub notes: Vec<RouteNote>,
    pub photos: Vec<RoutePhoto>,
}

/// Derive the default session title from the activity kind and start time,
/// e.g. "Morning Ride" or "Afternoon Activity" when no kind was chosen.
pub fn derive_title(kind: Option<ActivityKind>, started_at: DateTime<Utc>) -> String {
    let word = kind.map(|k| k.as_str()).unwrap_or("Activity");
    format!("{} {}", time_of_day_bucket(started_at), word)
}

/// List-view projection of a saved session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionSummary {
    pub id: String,
    pub title: String,
    pub kind: Option<ActivityKind>,
    /// Start date/time (RFC3339)
    pub started_at: String,
    /// End date/time (RFC3339), if the session was stopped cleanly
    pub ended_at: Option<String>,
    pub distance_meters: f64,
    pub route_points: u32,
    pub note_count: u32,
    pub photo_count: u32,
}

impl From<&RecordingSession> for SessionSummary {
    fn from(session: &RecordingSession) -> Self {
        Self {
            id: session.id.to_string(),
            title: session.title.clone(),
            kind: session.kind,
            started_at: format_utc_rfc3339(session.started_at),
            ended_at: session.ended_at.map(format_utc_rfc3339),
            distance_meters: session.distance_meters,
            route_points: session.route.len() as u32,
            note_count: session.notes.len() as u32,
            photo_count: session.photos.len() as u32,
        }
    }
}

/// Inbound user payload for attaching a note.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NoteDraft {
    /// Free-text body
    #[validate(length(min = 1, max = 2000, message = "note body must be 1-2000 characters"))]
    pub body: String,
}
