// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trail-Recorder demo
//!
//! Replays a scripted location stream through the tracker (with one
//! mid-ride source failure), attaches a note, then stops the session and
//! logs what was saved.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trail_recorder::{
    config::Config,
    models::{ActivityKind, LocationSample, NoteDraft},
    services::{
        export,
        location::{LocationEvent, ScriptedSource},
        tracker::Tracker,
    },
    store::{MemoryStore, SessionStore},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(
        staleness_secs = config.staleness_secs,
        max_accuracy_m = config.max_accuracy_m,
        "Starting trail-recorder demo"
    );

    let store = Arc::new(MemoryStore::new());
    let tracker = Arc::new(Tracker::new(config.sample_filter(), Arc::clone(&store)));

    let session_id = tracker.start(Some(ActivityKind::Ride)).await;
    tracing::info!(session_id = %session_id, "Recording started");

    // A short ride heading north out of Palo Alto, one fix per second,
    // with a transient GPS dropout reported halfway through.
    let start = Utc::now();
    let samples: Vec<LocationSample> = (0..20)
        .map(|i| LocationSample {
            timestamp: start + Duration::seconds(i),
            latitude: 37.4418 + 0.0005 * i as f64,
            longitude: -122.143,
            horizontal_accuracy_m: 5.0,
            speed_mps: 2.5,
        })
        .collect();
    let sample_count = samples.len();
    let mut events: Vec<LocationEvent> =
        samples.into_iter().map(LocationEvent::Update).collect();
    events.insert(10, LocationEvent::Failure("GPS signal lost".to_string()));

    let mut snapshots = tracker.subscribe();
    tracker.attach_source(ScriptedSource::new(events)).await?;

    // Wait for the scripted stream to drain into the trail
    while snapshots.borrow().trail_len < sample_count {
        if snapshots.changed().await.is_err() {
            break;
        }
    }
    tracker.detach_source().await?;

    tracker
        .add_note(NoteDraft {
            body: "Smooth ride, one GPS dropout near the bridge".to_string(),
        })
        .await?;

    let session = tracker.stop().await?;
    tracing::info!(
        session_id = %session.id,
        title = %session.title,
        distance_m = session.distance_meters,
        route_points = session.route.len(),
        "Session saved"
    );

    let encoded = export::route_polyline(&session)?;
    tracing::info!(polyline = %encoded, "Share polyline ready");

    let stats = store.history_stats().await?;
    tracing::info!(
        total_sessions = stats.total_sessions,
        total_distance_m = stats.total_distance_meters,
        "History updated"
    );

    Ok(())
}

fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("trail_recorder=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
