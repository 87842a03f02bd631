// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persistence seam for completed sessions.
//!
//! The tracker hands each stopped session to a [`SessionStore`]; what sits
//! behind the trait (an embedded database, a sync service) is the shell's
//! choice. [`MemoryStore`] is the in-process reference implementation.

pub mod memory;

pub use memory::MemoryStore;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::session::{RecordingSession, RouteNote, RoutePhoto, SessionSummary};
use crate::models::stats::HistoryStats;

/// Storage backend for completed recording sessions.
///
/// A session aggregate owns its route points, notes, and photos:
/// deleting the session deletes them all.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a completed session. Idempotent by session id.
    ///
    /// Returns `true` if the session was new, `false` if it was already
    /// stored (in which case nothing is overwritten).
    async fn save_session(&self, session: &RecordingSession) -> Result<bool>;

    /// Fetch a full session by id.
    async fn get_session(&self, id: Uuid) -> Result<RecordingSession>;

    /// List summaries of all saved sessions, newest started first.
    async fn list_sessions(&self) -> Result<Vec<SessionSummary>>;

    /// Delete a session and everything it owns.
    async fn delete_session(&self, id: Uuid) -> Result<()>;

    /// Attach a note to an already saved session.
    async fn append_note(&self, id: Uuid, note: RouteNote) -> Result<()>;

    /// Attach a photo to an already saved session.
    async fn append_photo(&self, id: Uuid, photo: RoutePhoto) -> Result<()>;

    /// Aggregated statistics over all saved sessions.
    async fn history_stats(&self) -> Result<HistoryStats>;
}

#[async_trait]
impl<S: SessionStore + ?Sized> SessionStore for Arc<S> {
    async fn save_session(&self, session: &RecordingSession) -> Result<bool> {
        (**self).save_session(session).await
    }

    async fn get_session(&self, id: Uuid) -> Result<RecordingSession> {
        (**self).get_session(id).await
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
        (**self).list_sessions().await
    }

    async fn delete_session(&self, id: Uuid) -> Result<()> {
        (**self).delete_session(id).await
    }

    async fn append_note(&self, id: Uuid, note: RouteNote) -> Result<()> {
        (**self).append_note(id, note).await
    }

    async fn append_photo(&self, id: Uuid, photo: RoutePhoto) -> Result<()> {
        (**self).append_photo(id, photo).await
    }

    async fn history_stats(&self) -> Result<HistoryStats> {
        (**self).history_stats().await
    }
}
