// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory session store for demos and tests.

use std::cmp::Reverse;
use std::sync::Mutex;

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::session::{RecordingSession, RouteNote, RoutePhoto, SessionSummary};
use crate::models::stats::HistoryStats;
use crate::store::SessionStore;
use crate::time_utils::format_utc_rfc3339;

/// Reference [`SessionStore`] backed by process memory.
///
/// The stats aggregate is maintained incrementally on save and recomputed
/// from the surviving sessions on delete.
#[derive(Default)]
pub struct MemoryStore {
    sessions: DashMap<Uuid, RecordingSession>,
    stats: Mutex<HistoryStats>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_stats(&self) -> Result<std::sync::MutexGuard<'_, HistoryStats>> {
        self.stats
            .lock()
            .map_err(|_| AppError::Store("stats lock poisoned".to_string()))
    }

    fn all_sessions(&self) -> Vec<RecordingSession> {
        self.sessions.iter().map(|e| e.value().clone()).collect()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn save_session(&self, session: &RecordingSession) -> Result<bool> {
        let now = format_utc_rfc3339(chrono::Utc::now());
        let mut stats = self.lock_stats()?;

        // The stats id set doubles as the idempotency record
        let was_new = stats.update_from_session(session, &now);
        if was_new {
            self.sessions.insert(session.id, session.clone());
            tracing::info!(
                session_id = %session.id,
                distance_m = session.distance_meters,
                "Session stored"
            );
        } else {
            tracing::debug!(session_id = %session.id, "Session already stored, skipping");
        }

        Ok(was_new)
    }

    async fn get_session(&self, id: Uuid) -> Result<RecordingSession> {
        self.sessions
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::NotFound(format!("session {}", id)))
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
        let mut sessions = self.all_sessions();
        sessions.sort_by_key(|s| Reverse(s.started_at));
        Ok(sessions.iter().map(SessionSummary::from).collect())
    }

    async fn delete_session(&self, id: Uuid) -> Result<()> {
        // The stats lock serializes every session-map mutation; a save
        // landing mid-recompute would otherwise be erased by the overwrite.
        let mut stats = self.lock_stats()?;

        // Removing the aggregate removes its route, notes, and photos
        if self.sessions.remove(&id).is_none() {
            return Err(AppError::NotFound(format!("session {}", id)));
        }

        let now = format_utc_rfc3339(chrono::Utc::now());
        *stats = HistoryStats::from_sessions(self.all_sessions().iter(), &now);

        tracing::info!(session_id = %id, "Session deleted");
        Ok(())
    }

    async fn append_note(&self, id: Uuid, note: RouteNote) -> Result<()> {
        let mut entry = self
            .sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("session {}", id)))?;
        entry.notes.push(note);
        Ok(())
    }

    async fn append_photo(&self, id: Uuid, photo: RoutePhoto) -> Result<()> {
        let mut entry = self
            .sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("session {}", id)))?;
        entry.photos.push(photo);
        Ok(())
    }

    async fn history_stats(&self) -> Result<HistoryStats> {
        Ok(self.lock_stats()?.clone())
    }
}
