// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the recorder.

pub mod sample;
pub mod session;
pub mod stats;

pub use sample::LocationSample;
pub use session::{
    ActivityKind, NoteDraft, RecordingSession, RouteNote, RoutePhoto, RoutePoint, SessionSummary,
};
pub use stats::HistoryStats;
