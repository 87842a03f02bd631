// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Trail-Recorder: GPS activity recording engine
//!
//! Consumes a live location stream, filters out invalid and stale fixes,
//! accumulates geodesic distance along the trail, and exposes a session
//! state machine (idle → recording ⇄ paused → idle) with seams for
//! persistence and sharing.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod time_utils;

pub use error::{AppError, Result};
pub use models::LocationSample;
pub use services::tracker::Tracker;
