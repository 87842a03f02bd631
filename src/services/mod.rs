// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - the recording pipeline and its shell.

pub mod distance;
pub mod export;
pub mod filter;
pub mod location;
pub mod recorder;
pub mod tracker;

pub use distance::DistanceAccumulator;
pub use export::ExportError;
pub use filter::{FilterDecision, RejectReason, SampleFilter};
pub use location::{LocationEvent, LocationSource, ScriptedSource};
pub use recorder::{ActivityRecorder, FrozenTrack, RecorderState, SampleOutcome};
pub use tracker::{RecorderSnapshot, Tracker};
