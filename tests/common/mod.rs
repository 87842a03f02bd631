// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::{DateTime, Duration, TimeZone, Utc};
use trail_recorder::models::{ActivityKind, LocationSample, RecordingSession, RoutePoint};
use uuid::Uuid;

/// Mean earth radius the haversine metric is defined over (meters).
#[allow(dead_code)]
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Fixed base instant for deterministic tests.
#[allow(dead_code)]
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap()
}

/// A valid sample at an offset (seconds) from the base instant.
#[allow(dead_code)]
pub fn make_sample(latitude: f64, longitude: f64, offset_secs: i64) -> LocationSample {
    LocationSample {
        timestamp: base_time() + Duration::seconds(offset_secs),
        latitude,
        longitude,
        horizontal_accuracy_m: 5.0,
        speed_mps: 1.5,
    }
}

/// A sample the filter must reject (sensor-invalid accuracy).
#[allow(dead_code)]
pub fn make_invalid_sample(latitude: f64, longitude: f64, offset_secs: i64) -> LocationSample {
    LocationSample {
        horizontal_accuracy_m: -1.0,
        ..make_sample(latitude, longitude, offset_secs)
    }
}

/// Degrees of latitude spanning `meters` along a meridian.
#[allow(dead_code)]
pub fn lat_degrees(meters: f64) -> f64 {
    meters / EARTH_RADIUS_M * 180.0 / std::f64::consts::PI
}

/// A straight north-going trail starting at (37, -122) whose consecutive
/// legs have the given lengths in meters, one sample per second.
#[allow(dead_code)]
pub fn straight_line_samples(leg_meters: &[f64]) -> Vec<LocationSample> {
    let mut samples = vec![make_sample(37.0, -122.0, 0)];
    let mut lat = 37.0;
    for (i, meters) in leg_meters.iter().enumerate() {
        lat += lat_degrees(*meters);
        samples.push(make_sample(lat, -122.0, i as i64 + 1));
    }
    samples
}

/// A saved-session fixture with the given route legs.
#[allow(dead_code)]
pub fn make_session(kind: Option<ActivityKind>, leg_meters: &[f64]) -> RecordingSession {
    let samples = straight_line_samples(leg_meters);
    let route: Vec<RoutePoint> = samples.iter().map(RoutePoint::from_sample).collect();
    RecordingSession {
        id: Uuid::new_v4(),
        title: "Morning Ride".to_string(),
        kind,
        started_at: base_time(),
        ended_at: Some(base_time() + Duration::seconds(samples.len() as i64)),
        distance_meters: leg_meters.iter().sum(),
        route,
        notes: vec![],
        photos: vec![],
    }
}
