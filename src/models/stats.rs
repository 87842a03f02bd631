//! History statistics aggregates for efficient dashboard queries.
//!
//! These aggregates are pre-computed when sessions are saved, so history
//! dashboards read O(1) instead of re-scanning every session.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;

use crate::models::session::RecordingSession;

/// Aggregate key for sessions recorded without a chosen kind.
const UNSPECIFIED_KIND: &str = "Unspecified";

/// Pre-computed statistics over all saved sessions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct HistoryStats {
    /// Total sessions recorded
    #[serde(default)]
    pub total_sessions: u32,
    /// Total distance across all sessions (meters)
    #[serde(default)]
    pub total_distance_meters: f64,

    // ─── By Activity Kind ────────────────────────────────────────
    /// Session count per activity kind (for pie charts)
    #[serde(default)]
    pub sessions_by_kind: HashMap<String, u32>,
    /// Total distance per activity kind (meters)
    #[serde(default)]
    pub distance_by_kind: HashMap<String, f64>,

    // ─── Time Series ─────────────────────────────────────────────
    /// Session count per month ("YYYY-MM" format)
    #[serde(default)]
    pub sessions_by_month: HashMap<String, u32>,

    // ─── Idempotency ─────────────────────────────────────────────
    /// Ids of sessions already folded in (duplicate detection)
    #[serde(default)]
    #[cfg_attr(feature = "binding-generation", ts(type = "Array<string>"))]
    pub recorded_session_ids: HashSet<Uuid>,

    // ─── Metadata ────────────────────────────────────────────────
    /// Last update timestamp (RFC3339)
    #[serde(default)]
    pub updated_at: String,
}

impl HistoryStats {
    /// Fold a saved session into the aggregates.
    ///
    /// Returns `true` if the session was counted (new).
    /// Returns `false` if the session id was already recorded (duplicate).
    pub fn update_from_session(&mut self, session: &RecordingSession, now: &str) -> bool {
        // Idempotency check: skip if already counted
        if self.recorded_session_ids.contains(&session.id) {
            return false;
        }

        self.recorded_session_ids.insert(session.id);
        self.updated_at = now.to_string();

        self.total_sessions += 1;
        self.total_distance_meters += session.distance_meters;

        let kind_key = session
            .kind
            .map(|k| k.as_str())
            .unwrap_or(UNSPECIFIED_KIND);
        *self
            .sessions_by_kind
            .entry(kind_key.to_string())
            .or_insert(0) += 1;
        *self
            .distance_by_kind
            .entry(kind_key.to_string())
            .or_insert(0.0) += session.distance_meters;

        let month_key = session.started_at.format("%Y-%m").to_string();
        *self.sessions_by_month.entry(month_key).or_insert(0) += 1;

        true
    }

    /// Rebuild the aggregates from scratch, e.g. after a deletion.
    pub fn from_sessions<'a, I>(sessions: I, now: &str) -> Self
    where
        I: IntoIterator<Item = &'a RecordingSession>,
    {
        let mut stats = Self::default();
        for session in sessions {
            stats.update_from_session(session, now);
        }
        stats
    }
}
