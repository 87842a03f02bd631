// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sharing exports for saved sessions.
//!
//! Produces the data shapes sharing collaborators consume: an encoded
//! polyline of the route and a GeoJSON FeatureCollection carrying the
//! route line plus note/photo markers. Rendering is the consumer's job.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use geo::{Coord, LineString};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};
use serde_json::{json, Map};

use crate::models::session::RecordingSession;
use crate::time_utils::format_utc_rfc3339;

/// Errors from export operations.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Route has fewer than two points")]
    EmptyRoute,

    #[error("Failed to encode polyline: {0}")]
    PolylineError(String),
}

/// Encode the session's route as a Google polyline (precision 5).
pub fn route_polyline(session: &RecordingSession) -> Result<String, ExportError> {
    let line = route_line(session)?;
    polyline::encode_coordinates(line, 5).map_err(|e| ExportError::PolylineError(e.to_string()))
}

/// Build a GeoJSON FeatureCollection for the session: one LineString
/// feature for the route plus one Point feature per note and per photo.
pub fn route_geojson(session: &RecordingSession) -> Result<GeoJson, ExportError> {
    let line = route_line(session)?;

    let mut properties = Map::new();
    properties.insert("title".to_string(), json!(session.title));
    properties.insert(
        "kind".to_string(),
        json!(session.kind.map(|k| k.as_str())),
    );
    properties.insert(
        "distance_meters".to_string(),
        json!(session.distance_meters),
    );
    properties.insert(
        "started_at".to_string(),
        json!(format_utc_rfc3339(session.started_at)),
    );
    if let Some(ended_at) = session.ended_at {
        properties.insert("ended_at".to_string(), json!(format_utc_rfc3339(ended_at)));
    }

    let mut features = vec![Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::from(&line))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }];

    for note in &session.notes {
        let mut props = Map::new();
        props.insert("note".to_string(), json!(note.body));
        props.insert(
            "created_at".to_string(),
            json!(format_utc_rfc3339(note.created_at)),
        );
        features.push(point_feature(note.latitude, note.longitude, props));
    }

    for photo in &session.photos {
        let mut props = Map::new();
        props.insert("photo_base64".to_string(), json!(STANDARD.encode(&photo.image)));
        props.insert(
            "created_at".to_string(),
            json!(format_utc_rfc3339(photo.created_at)),
        );
        features.push(point_feature(photo.latitude, photo.longitude, props));
    }

    Ok(GeoJson::FeatureCollection(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }))
}

/// The route as a geo line string (x = longitude, y = latitude).
fn route_line(session: &RecordingSession) -> Result<LineString<f64>, ExportError> {
    if session.route.len() < 2 {
        return Err(ExportError::EmptyRoute);
    }
    Ok(session
        .route
        .iter()
        .map(|p| Coord {
            x: p.longitude,
            y: p.latitude,
        })
        .collect())
}

/// A point feature at the captured coordinate, or with null geometry when
/// no position was known at capture time.
fn point_feature(
    latitude: Option<f64>,
    longitude: Option<f64>,
    properties: Map<String, serde_json::Value>,
) -> Feature {
    let geometry = match (latitude, longitude) {
        (Some(lat), Some(lon)) => Some(Geometry::new(Value::Point(vec![lon, lat]))),
        _ => None,
    };
    Feature {
        bbox: None,
        geometry,
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}
