// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! End-to-end tests of the tracker shell: source attachment, event
//! ingest, snapshot publishing, and persistence handoff.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{self, BoxStream, StreamExt};
use tokio::sync::watch;
use trail_recorder::error::AppError;
use trail_recorder::models::stats::HistoryStats;
use trail_recorder::models::{
    ActivityKind, LocationSample, RecordingSession, RouteNote, RoutePhoto, SessionSummary,
};
use trail_recorder::services::filter::SampleFilter;
use trail_recorder::services::location::{LocationEvent, LocationSource, ScriptedSource};
use trail_recorder::services::recorder::RecorderState;
use trail_recorder::services::tracker::{RecorderSnapshot, Tracker};
use trail_recorder::store::{MemoryStore, SessionStore};
use uuid::Uuid;

mod common;
use common::{make_sample, straight_line_samples};

fn make_tracker() -> Arc<Tracker<MemoryStore>> {
    // Scripted fixtures use a fixed past date, so disable staleness
    Arc::new(Tracker::new(SampleFilter::new(None, None), MemoryStore::new()))
}

/// Wait until the published trail reaches `len` samples.
async fn wait_for_trail_len(rx: &mut watch::Receiver<RecorderSnapshot>, len: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while rx.borrow().trail_len < len {
            if rx.changed().await.is_err() {
                break;
            }
        }
    })
    .await
    .expect("trail never reached expected length");
}

/// Replays its events, then stays open like a platform source idling
/// between fixes.
struct HangingSource(Vec<LocationEvent>);

impl LocationSource for HangingSource {
    fn into_events(self) -> BoxStream<'static, LocationEvent> {
        stream::iter(self.0).chain(stream::pending()).boxed()
    }
}

/// Retry attaching until the previous source's finished ingest task
/// vacates the slot.
async fn attach_when_vacant(tracker: &Arc<Tracker<MemoryStore>>, samples: Vec<LocationSample>) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match tracker
                .attach_source(ScriptedSource::from_samples(samples.clone()))
                .await
            {
                Ok(()) => break,
                Err(AppError::SourceAttached) => tokio::task::yield_now().await,
                Err(err) => panic!("attach failed: {}", err),
            }
        }
    })
    .await
    .expect("source slot never became vacant");
}

#[tokio::test]
async fn test_scripted_source_feeds_the_trail() {
    let tracker = make_tracker();
    tracker.start(Some(ActivityKind::Ride)).await;

    let samples = straight_line_samples(&[100.0, 150.0]);
    let mut snapshots = tracker.subscribe();
    tracker
        .attach_source(ScriptedSource::from_samples(samples))
        .await
        .expect("attach");
    wait_for_trail_len(&mut snapshots, 3).await;
    tracker.detach_source().await.expect("detach");

    let snapshot = tracker.snapshot().await;
    assert_eq!(snapshot.state, RecorderState::Recording);
    assert_eq!(snapshot.trail_len, 3);
    assert!((snapshot.distance_meters - 250.0).abs() < 0.01);
}

#[tokio::test]
async fn test_source_failure_is_surfaced_not_fatal() {
    let tracker = make_tracker();
    tracker.start(Some(ActivityKind::Ride)).await;

    let samples = straight_line_samples(&[100.0]);
    let events = vec![
        LocationEvent::Update(samples[0]),
        LocationEvent::Failure("permission revoked".to_string()),
        LocationEvent::Update(samples[1]),
    ];

    let mut snapshots = tracker.subscribe();
    tracker
        .attach_source(ScriptedSource::new(events))
        .await
        .expect("attach");
    wait_for_trail_len(&mut snapshots, 2).await;
    tracker.detach_source().await.expect("detach");

    let snapshot = tracker.snapshot().await;
    // Recording survived the failure and kept accepting samples
    assert_eq!(snapshot.state, RecorderState::Recording);
    assert_eq!(snapshot.trail_len, 2);
    assert!((snapshot.distance_meters - 100.0).abs() < 0.01);
    assert_eq!(
        snapshot.last_source_error.as_deref(),
        Some("permission revoked")
    );
}

#[tokio::test]
async fn test_second_attach_is_rejected_while_source_runs() {
    let tracker = make_tracker();
    tracker
        .attach_source(HangingSource(vec![]))
        .await
        .expect("first attach");

    let err = tracker
        .attach_source(ScriptedSource::new(vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::SourceAttached));

    // Detaching frees the slot
    tracker.detach_source().await.expect("detach");
    tracker
        .attach_source(ScriptedSource::new(vec![]))
        .await
        .expect("attach after detach");
    tracker.detach_source().await.expect("detach");
}

#[tokio::test]
async fn test_finished_source_frees_the_slot() {
    let tracker = make_tracker();
    tracker.start(Some(ActivityKind::Ride)).await;
    let mut snapshots = tracker.subscribe();

    tracker
        .attach_source(ScriptedSource::from_samples(straight_line_samples(&[100.0])))
        .await
        .expect("first attach");
    wait_for_trail_len(&mut snapshots, 2).await;

    // No detach: once the drained stream's ingest task finishes, a new
    // source may take the slot
    attach_when_vacant(&tracker, vec![make_sample(37.01, -122.0, 10)]).await;
    wait_for_trail_len(&mut snapshots, 3).await;

    assert_eq!(tracker.snapshot().await.trail_len, 3);
    tracker.detach_source().await.expect("detach");
}

#[tokio::test]
async fn test_stop_result_matches_store_read() {
    let store = Arc::new(MemoryStore::new());
    let tracker = Arc::new(Tracker::new(
        SampleFilter::new(None, None),
        Arc::clone(&store),
    ));

    tracker.start(Some(ActivityKind::Hike)).await;
    for sample in straight_line_samples(&[100.0, 150.0]) {
        tracker.on_location_update(sample).await;
    }
    let stopped = tracker.stop().await.expect("stop");

    let loaded = store.get_session(stopped.id).await.expect("get");
    assert_eq!(loaded.id, stopped.id);
    assert_eq!(loaded.title, stopped.title);
    assert_eq!(loaded.distance_meters, stopped.distance_meters);
    assert_eq!(loaded.route.len(), stopped.route.len());

    let stats = store.history_stats().await.expect("stats");
    assert_eq!(stats.total_sessions, 1);
}

#[tokio::test]
async fn test_stop_without_session_is_an_error() {
    let tracker = make_tracker();
    let err = tracker.stop().await.unwrap_err();
    assert!(matches!(err, AppError::NoActiveSession));
}

#[tokio::test]
async fn test_note_requires_active_session() {
    let tracker = make_tracker();
    let err = tracker
        .add_note(trail_recorder::models::NoteDraft {
            body: "nobody home".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NoActiveSession));
}

#[tokio::test]
async fn test_invalid_note_is_rejected_before_state_checks() {
    let tracker = make_tracker();
    tracker.start(None).await;
    let err = tracker
        .add_note(trail_recorder::models::NoteDraft { body: String::new() })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_empty_photo_is_rejected() {
    let tracker = make_tracker();
    tracker.start(None).await;
    let err = tracker.add_photo(Vec::new()).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_set_kind_requires_active_session() {
    let tracker = make_tracker();
    let err = tracker.set_activity_kind(ActivityKind::Run).await.unwrap_err();
    assert!(matches!(err, AppError::NoActiveSession));
}

#[tokio::test]
async fn test_snapshots_published_on_changes() {
    let tracker = make_tracker();
    let mut snapshots = tracker.subscribe();
    assert_eq!(snapshots.borrow().state, RecorderState::Idle);

    tracker.start(Some(ActivityKind::Walk)).await;
    snapshots.changed().await.expect("start publishes");
    {
        let snapshot = snapshots.borrow_and_update();
        assert_eq!(snapshot.state, RecorderState::Recording);
        assert!(snapshot.session_id.is_some());
    }

    tracker.pause().await;
    snapshots.changed().await.expect("pause publishes");
    assert_eq!(snapshots.borrow_and_update().state, RecorderState::Paused);

    tracker.resume().await;
    snapshots.changed().await.expect("resume publishes");
    assert_eq!(snapshots.borrow_and_update().state, RecorderState::Recording);

    tracker.stop().await.expect("stop");
    snapshots.changed().await.expect("stop publishes");
    let final_snapshot = snapshots.borrow_and_update();
    assert_eq!(final_snapshot.state, RecorderState::Idle);
    assert_eq!(final_snapshot.session_id, None);
}

#[tokio::test]
async fn test_start_discards_unsaved_live_session() {
    let tracker = make_tracker();
    let first = tracker.start(Some(ActivityKind::Ride)).await;
    for sample in straight_line_samples(&[100.0]) {
        tracker.on_location_update(sample).await;
    }

    let second = tracker.start(Some(ActivityKind::Ride)).await;
    assert_ne!(first, second, "restart must mint a fresh session id");

    let snapshot = tracker.snapshot().await;
    assert_eq!(snapshot.session_id, Some(second));
    assert_eq!(snapshot.trail_len, 0);
    assert_eq!(snapshot.distance_meters, 0.0);
}

/// Store that refuses every write, for persistence-failure behavior.
struct FailingStore;

#[async_trait]
impl SessionStore for FailingStore {
    async fn save_session(&self, _session: &RecordingSession) -> Result<bool, AppError> {
        Err(AppError::Store("disk full".to_string()))
    }

    async fn get_session(&self, id: Uuid) -> Result<RecordingSession, AppError> {
        Err(AppError::NotFound(format!("session {}", id)))
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, AppError> {
        Ok(vec![])
    }

    async fn delete_session(&self, _id: Uuid) -> Result<(), AppError> {
        Err(AppError::Store("disk full".to_string()))
    }

    async fn append_note(&self, _id: Uuid, _note: RouteNote) -> Result<(), AppError> {
        Err(AppError::Store("disk full".to_string()))
    }

    async fn append_photo(&self, _id: Uuid, _photo: RoutePhoto) -> Result<(), AppError> {
        Err(AppError::Store("disk full".to_string()))
    }

    async fn history_stats(&self) -> Result<HistoryStats, AppError> {
        Ok(HistoryStats::default())
    }
}

#[tokio::test]
async fn test_store_failure_does_not_corrupt_recorder() {
    let tracker = Arc::new(Tracker::new(SampleFilter::new(None, None), FailingStore));
    tracker.start(Some(ActivityKind::Ride)).await;
    for sample in straight_line_samples(&[100.0]) {
        tracker.on_location_update(sample).await;
    }

    let err = tracker.stop().await.unwrap_err();
    assert!(matches!(err, AppError::Store(_)));

    // The recorder is Idle with its frozen values intact, and a fresh
    // session can start cleanly
    let snapshot = tracker.snapshot().await;
    assert_eq!(snapshot.state, RecorderState::Idle);
    assert!((snapshot.distance_meters - 100.0).abs() < 0.01);

    tracker.start(Some(ActivityKind::Ride)).await;
    let snapshot = tracker.snapshot().await;
    assert_eq!(snapshot.state, RecorderState::Recording);
    assert_eq!(snapshot.distance_meters, 0.0);
}

/// Store that fails a fixed number of saves, then behaves normally.
struct FlakyStore {
    inner: MemoryStore,
    failures_left: AtomicUsize,
}

impl FlakyStore {
    fn failing_once() -> Self {
        Self {
            inner: MemoryStore::new(),
            failures_left: AtomicUsize::new(1),
        }
    }
}

#[async_trait]
impl SessionStore for FlakyStore {
    async fn save_session(&self, session: &RecordingSession) -> Result<bool, AppError> {
        if self.failures_left.load(Ordering::SeqCst) > 0 {
            self.failures_left.fetch_sub(1, Ordering::SeqCst);
            return Err(AppError::Store("disk full".to_string()));
        }
        self.inner.save_session(session).await
    }

    async fn get_session(&self, id: Uuid) -> Result<RecordingSession, AppError> {
        self.inner.get_session(id).await
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, AppError> {
        self.inner.list_sessions().await
    }

    async fn delete_session(&self, id: Uuid) -> Result<(), AppError> {
        self.inner.delete_session(id).await
    }

    async fn append_note(&self, id: Uuid, note: RouteNote) -> Result<(), AppError> {
        self.inner.append_note(id, note).await
    }

    async fn append_photo(&self, id: Uuid, photo: RoutePhoto) -> Result<(), AppError> {
        self.inner.append_photo(id, photo).await
    }

    async fn history_stats(&self) -> Result<HistoryStats, AppError> {
        self.inner.history_stats().await
    }
}

#[tokio::test]
async fn test_failed_save_is_retried_by_next_stop() {
    let store = Arc::new(FlakyStore::failing_once());
    let tracker = Arc::new(Tracker::new(
        SampleFilter::new(None, None),
        Arc::clone(&store),
    ));

    let id = tracker.start(Some(ActivityKind::Hike)).await;
    for sample in straight_line_samples(&[100.0]) {
        tracker.on_location_update(sample).await;
    }
    let note_id = tracker
        .add_note(trail_recorder::models::NoteDraft {
            body: "bridge out, detoured".to_string(),
        })
        .await
        .expect("note");

    let err = tracker.stop().await.unwrap_err();
    assert!(matches!(err, AppError::Store(_)));

    // The parked session keeps its identity and attachments through the
    // retry
    let recovered = tracker.stop().await.expect("retry stop");
    assert_eq!(recovered.id, id);
    assert_eq!(recovered.notes.len(), 1);
    assert_eq!(recovered.notes[0].id, note_id);
    assert_eq!(recovered.route.len(), 2);
    store.get_session(id).await.expect("session persisted");

    // Nothing left to stop once the parked session is saved
    let err = tracker.stop().await.unwrap_err();
    assert!(matches!(err, AppError::NoActiveSession));
}

#[tokio::test]
async fn test_parked_session_survives_a_new_recording() {
    let store = Arc::new(FlakyStore::failing_once());
    let tracker = Arc::new(Tracker::new(
        SampleFilter::new(None, None),
        Arc::clone(&store),
    ));

    let first = tracker.start(Some(ActivityKind::Ride)).await;
    for sample in straight_line_samples(&[100.0]) {
        tracker.on_location_update(sample).await;
    }
    tracker.stop().await.unwrap_err();

    let second = tracker.start(Some(ActivityKind::Walk)).await;
    for sample in straight_line_samples(&[50.0]) {
        tracker.on_location_update(sample).await;
    }
    let saved = tracker.stop().await.expect("second stop");
    assert_eq!(saved.id, second);

    // The first session is still parked and saves on the next stop
    let recovered = tracker.stop().await.expect("retry stop");
    assert_eq!(recovered.id, first);
    store.get_session(first).await.expect("first persisted");
    store.get_session(second).await.expect("second persisted");
}

#[tokio::test]
async fn test_fix_after_stop_updates_position_only() {
    let tracker = make_tracker();
    tracker.start(Some(ActivityKind::Ride)).await;
    for sample in straight_line_samples(&[100.0]) {
        tracker.on_location_update(sample).await;
    }
    let stopped = tracker.stop().await.expect("stop");

    let late = make_sample(38.0, -121.0, 60);
    tracker.on_location_update(late).await;

    let snapshot = tracker.snapshot().await;
    assert_eq!(snapshot.state, RecorderState::Idle);
    assert_eq!(snapshot.latest_position, Some(late));
    // The saved session is untouched by the late fix
    assert_eq!(stopped.route.len(), 2);
}
