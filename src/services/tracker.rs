// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session tracking shell around the recorder.
//!
//! Serializes the two mutation sources (location events and user control
//! calls) onto one lock, owns the live session extras (identity, kind,
//! notes, photos), hands each stopped session to the store, and publishes
//! cheap snapshots for UI layers to observe.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::sample::LocationSample;
use crate::models::session::{
    derive_title, ActivityKind, NoteDraft, RecordingSession, RouteNote, RoutePhoto, RoutePoint,
};
use crate::services::filter::SampleFilter;
use crate::services::location::{LocationEvent, LocationSource};
use crate::services::recorder::{ActivityRecorder, RecorderState, SampleOutcome};
use crate::store::SessionStore;

/// Read-only view of the tracker, published after every observable change.
#[derive(Debug, Clone, Serialize)]
pub struct RecorderSnapshot {
    pub state: RecorderState,
    /// Id of the live session, if one is in progress
    pub session_id: Option<Uuid>,
    pub kind: Option<ActivityKind>,
    pub distance_meters: f64,
    pub trail_len: usize,
    pub latest_position: Option<LocationSample>,
    /// Most recent location-source failure, if any
    pub last_source_error: Option<String>,
}

/// Per-session fields owned by the shell rather than the recorder.
struct LiveSession {
    id: Uuid,
    kind: Option<ActivityKind>,
    started_at: DateTime<Utc>,
    notes: Vec<RouteNote>,
    photos: Vec<RoutePhoto>,
}

struct TrackerState {
    recorder: ActivityRecorder,
    live: Option<LiveSession>,
    /// A stopped session whose save failed, parked for retry.
    unsaved: Option<RecordingSession>,
    last_source_error: Option<String>,
}

impl TrackerState {
    fn snapshot(&self) -> RecorderSnapshot {
        RecorderSnapshot {
            state: self.recorder.state(),
            session_id: self.live.as_ref().map(|l| l.id),
            kind: self.live.as_ref().and_then(|l| l.kind),
            distance_meters: self.recorder.distance_meters(),
            trail_len: self.recorder.trail().len(),
            latest_position: self.recorder.latest_position(),
            last_source_error: self.last_source_error.clone(),
        }
    }
}

struct SourceHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Owns one [`ActivityRecorder`] and its live session, persisting
/// completed sessions to the store.
///
/// Concurrent sessions are not supported: one tracker, one recorder, one
/// live trail.
pub struct Tracker<S> {
    state: Mutex<TrackerState>,
    store: S,
    source: Mutex<Option<SourceHandle>>,
    snapshot_tx: watch::Sender<RecorderSnapshot>,
    snapshot_rx: watch::Receiver<RecorderSnapshot>,
}

impl<S: SessionStore + 'static> Tracker<S> {
    pub fn new(filter: SampleFilter, store: S) -> Self {
        let state = TrackerState {
            recorder: ActivityRecorder::new(filter),
            live: None,
            unsaved: None,
            last_source_error: None,
        };
        let (snapshot_tx, snapshot_rx) = watch::channel(state.snapshot());
        Self {
            state: Mutex::new(state),
            store,
            source: Mutex::new(None),
            snapshot_tx,
            snapshot_rx,
        }
    }

    /// Watch channel of tracker snapshots, for UI layers that react to
    /// state changes.
    pub fn subscribe(&self) -> watch::Receiver<RecorderSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Current snapshot of the tracker.
    pub async fn snapshot(&self) -> RecorderSnapshot {
        self.state.lock().await.snapshot()
    }

    /// Copy of the live trail.
    pub async fn trail_snapshot(&self) -> Vec<LocationSample> {
        self.state.lock().await.recorder.trail().to_vec()
    }

    fn publish(&self, state: &TrackerState) {
        self.snapshot_tx.send_replace(state.snapshot());
    }

    // ─── Session Control ─────────────────────────────────────────

    /// Begin a fresh session, resetting distance and trail whatever the
    /// prior state. Returns the new session's id.
    pub async fn start(&self, kind: Option<ActivityKind>) -> Uuid {
        let mut st = self.state.lock().await;
        if let Some(live) = &st.live {
            tracing::warn!(session_id = %live.id, "Discarding unsaved live session on start");
        }
        st.recorder.start();
        let id = Uuid::new_v4();
        st.live = Some(LiveSession {
            id,
            kind,
            started_at: Utc::now(),
            notes: Vec::new(),
            photos: Vec::new(),
        });
        tracing::info!(
            session_id = %id,
            kind = kind.map(|k| k.as_str()).unwrap_or("unspecified"),
            "Session started"
        );
        self.publish(&st);
        id
    }

    /// Choose or change the activity kind of the live session.
    pub async fn set_activity_kind(&self, kind: ActivityKind) -> Result<()> {
        let mut st = self.state.lock().await;
        let live = st.live.as_mut().ok_or(AppError::NoActiveSession)?;
        live.kind = Some(kind);
        tracing::debug!(session_id = %live.id, kind = kind.as_str(), "Activity kind set");
        self.publish(&st);
        Ok(())
    }

    /// Hold the trail and distance at their current values. No-op unless
    /// Recording.
    pub async fn pause(&self) {
        let mut st = self.state.lock().await;
        let before = st.recorder.state();
        st.recorder.pause();
        if st.recorder.state() != before {
            tracing::info!(distance_m = st.recorder.distance_meters(), "Session paused");
            self.publish(&st);
        }
    }

    /// Continue recording from where pause left off. No-op unless Paused.
    pub async fn resume(&self) {
        let mut st = self.state.lock().await;
        let before = st.recorder.state();
        st.recorder.resume();
        if st.recorder.state() != before {
            tracing::info!("Session resumed");
            self.publish(&st);
        }
    }

    /// End the live session, persist it, and return it.
    ///
    /// The freeze is synchronous: state is captured under the lock, so a
    /// location fix racing with stop lands on an Idle recorder and only
    /// updates the latest known position. The store write happens after
    /// the lock is released; on a store failure the error is returned,
    /// the recorder stays Idle with its in-memory values intact, and the
    /// built session is parked so the next `stop()` retries the save.
    pub async fn stop(&self) -> Result<RecordingSession> {
        let session = {
            let mut st = self.state.lock().await;
            match st.live.take() {
                Some(live) => {
                    let track = st.recorder.stop();
                    let session = RecordingSession {
                        id: live.id,
                        title: derive_title(live.kind, live.started_at),
                        kind: live.kind,
                        started_at: live.started_at,
                        ended_at: Some(Utc::now()),
                        distance_meters: track.distance_meters,
                        route: track.trail.iter().map(RoutePoint::from_sample).collect(),
                        notes: live.notes,
                        photos: live.photos,
                    };
                    self.publish(&st);
                    session
                }
                // No live session: retry a parked one whose save failed
                None => st.unsaved.take().ok_or(AppError::NoActiveSession)?,
            }
        };

        match self.store.save_session(&session).await {
            Ok(_) => {
                tracing::info!(
                    session_id = %session.id,
                    title = %session.title,
                    distance_m = session.distance_meters,
                    route_points = session.route.len(),
                    "Session stopped and saved"
                );
                Ok(session)
            }
            Err(err) => {
                tracing::error!(session_id = %session.id, error = %err, "Failed to save session");
                let mut st = self.state.lock().await;
                if let Some(older) = st.unsaved.replace(session) {
                    tracing::warn!(session_id = %older.id, "Discarding older unsaved session");
                }
                Err(err)
            }
        }
    }

    // ─── Attachments ─────────────────────────────────────────────

    /// Attach a note to the live session, stamped with the latest known
    /// position when one exists.
    pub async fn add_note(&self, draft: NoteDraft) -> Result<Uuid> {
        draft
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let mut st = self.state.lock().await;
        let position = st.recorder.latest_position();
        let live = st.live.as_mut().ok_or(AppError::NoActiveSession)?;
        let note = RouteNote {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            body: draft.body,
            latitude: position.map(|p| p.latitude),
            longitude: position.map(|p| p.longitude),
        };
        let note_id = note.id;
        live.notes.push(note);
        tracing::debug!(session_id = %live.id, note_id = %note_id, "Note attached");
        Ok(note_id)
    }

    /// Attach a photo to the live session, stamped with the latest known
    /// position when one exists.
    pub async fn add_photo(&self, image: Vec<u8>) -> Result<Uuid> {
        if image.is_empty() {
            return Err(AppError::Validation("photo payload is empty".to_string()));
        }

        let mut st = self.state.lock().await;
        let position = st.recorder.latest_position();
        let live = st.live.as_mut().ok_or(AppError::NoActiveSession)?;
        let photo = RoutePhoto {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            image,
            latitude: position.map(|p| p.latitude),
            longitude: position.map(|p| p.longitude),
        };
        let photo_id = photo.id;
        live.photos.push(photo);
        tracing::debug!(session_id = %live.id, photo_id = %photo_id, "Photo attached");
        Ok(photo_id)
    }

    // ─── Location Intake ─────────────────────────────────────────

    /// Apply one fix from the location source.
    pub async fn on_location_update(&self, sample: LocationSample) -> SampleOutcome {
        let mut st = self.state.lock().await;
        let outcome = st.recorder.observe(sample, Utc::now());
        match outcome {
            SampleOutcome::Rejected(reason) => {
                tracing::debug!(reason = reason.as_str(), "Sample rejected");
            }
            _ => self.publish(&st),
        }
        outcome
    }

    /// Record a non-fatal failure from the location source.
    ///
    /// Recording state is preserved; samples already accepted are not
    /// affected.
    pub async fn on_location_failure(&self, message: &str) {
        tracing::warn!(error = message, "Location source failure");
        let mut st = self.state.lock().await;
        st.last_source_error = Some(message.to_string());
        self.publish(&st);
    }

    // ─── Source Management ───────────────────────────────────────

    /// Attach a location source, spawning an ingest task that feeds its
    /// events into the tracker until the stream ends or the source is
    /// detached.
    ///
    /// Only one source may run at a time; a source whose stream has
    /// already ended vacates the slot for the next attach.
    pub async fn attach_source<L: LocationSource>(self: &Arc<Self>, source: L) -> Result<()> {
        let mut slot = self.source.lock().await;
        if slot.as_ref().is_some_and(|handle| !handle.task.is_finished()) {
            return Err(AppError::SourceAttached);
        }

        let cancel = CancellationToken::new();
        let ingest_cancel = cancel.clone();
        let tracker = Arc::clone(self);
        let mut events = source.into_events();

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = ingest_cancel.cancelled() => break,
                    event = events.next() => match event {
                        Some(LocationEvent::Update(sample)) => {
                            tracker.on_location_update(sample).await;
                        }
                        Some(LocationEvent::Failure(message)) => {
                            tracker.on_location_failure(&message).await;
                        }
                        None => break,
                    },
                }
            }
            tracing::debug!("Location ingest task finished");
        });

        *slot = Some(SourceHandle { cancel, task });
        tracing::info!("Location source attached");
        Ok(())
    }

    /// Detach the current location source, if any, waiting for its ingest
    /// task to finish.
    pub async fn detach_source(&self) -> Result<()> {
        let handle = self.source.lock().await.take();
        if let Some(SourceHandle { cancel, task }) = handle {
            cancel.cancel();
            task.await
                .map_err(|e| AppError::Internal(anyhow::anyhow!("ingest task failed: {}", e)))?;
            tracing::info!("Location source detached");
        }
        Ok(())
    }
}
