// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! The activity-recording state machine.
//!
//! Owns the current state, the live point trail, and the distance total;
//! consumes raw samples through the filter and gates their effect on the
//! current state. A plain synchronous component with no clock, no I/O,
//! and no locking: the async shell in [`crate::services::tracker`]
//! serializes access and passes `now` in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::LocationSample;
use crate::services::distance::DistanceAccumulator;
use crate::services::filter::{FilterDecision, RejectReason, SampleFilter};

/// Recorder lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum RecorderState {
    /// No session in progress; sessions begin and end here
    Idle,
    /// Accepted samples grow the trail and the distance total
    Recording,
    /// Trail and distance are held; accepted samples update position only
    Paused,
}

impl RecorderState {
    /// Stable label for structured logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecorderState::Idle => "idle",
            RecorderState::Recording => "recording",
            RecorderState::Paused => "paused",
        }
    }
}

/// What happened to one incoming fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleOutcome {
    /// Appended to the live trail while Recording
    Appended {
        /// Distance added by this sample in meters
        delta_meters: f64,
    },
    /// Accepted while Idle or Paused: replaced the latest known position only
    PositionOnly,
    /// Dropped by the sample filter
    Rejected(RejectReason),
}

/// Final trail and distance handed to the persistence collaborator at stop.
#[derive(Debug, Clone)]
pub struct FrozenTrack {
    /// Accepted samples in arrival order
    pub trail: Vec<LocationSample>,
    /// Accumulated distance in meters
    pub distance_meters: f64,
}

/// The finite-state session recorder: Idle -> Recording <-> Paused -> Idle.
#[derive(Debug, Clone)]
pub struct ActivityRecorder {
    state: RecorderState,
    filter: SampleFilter,
    distance: DistanceAccumulator,
    trail: Vec<LocationSample>,
    latest_position: Option<LocationSample>,
}

impl Default for ActivityRecorder {
    fn default() -> Self {
        Self::new(SampleFilter::default())
    }
}

impl ActivityRecorder {
    pub fn new(filter: SampleFilter) -> Self {
        Self {
            state: RecorderState::Idle,
            filter,
            distance: DistanceAccumulator::new(),
            trail: Vec::new(),
            latest_position: None,
        }
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    /// Accumulated distance of the current (or just-ended) session.
    pub fn distance_meters(&self) -> f64 {
        self.distance.total_meters()
    }

    /// The live trail of the current (or just-ended) session.
    pub fn trail(&self) -> &[LocationSample] {
        &self.trail
    }

    /// The single latest accepted fix, tracked across all states for map
    /// centering. Distinct from the recording trail.
    pub fn latest_position(&self) -> Option<LocationSample> {
        self.latest_position
    }

    /// Begin a fresh session.
    ///
    /// Always zeroes the distance total, clears the trail, and forgets the
    /// accumulator's previous-sample anchor, whatever the prior state. Two
    /// trails can never merge.
    pub fn start(&mut self) {
        self.distance.reset();
        self.trail.clear();
        self.state = RecorderState::Recording;
    }

    /// Hold the trail and distance at their current values.
    ///
    /// No-op unless Recording.
    pub fn pause(&mut self) {
        if self.state == RecorderState::Recording {
            self.state = RecorderState::Paused;
        }
    }

    /// Continue recording from the trail and distance left at pause.
    ///
    /// No-op unless Paused.
    pub fn resume(&mut self) {
        if self.state == RecorderState::Paused {
            self.state = RecorderState::Recording;
        }
    }

    /// End the session, freezing the trail and distance as final values.
    ///
    /// The recorder returns to Idle and keeps tracking only the latest
    /// known position. The frozen values remain readable on the recorder
    /// until the next `start()`.
    pub fn stop(&mut self) -> FrozenTrack {
        self.state = RecorderState::Idle;
        FrozenTrack {
            trail: self.trail.clone(),
            distance_meters: self.distance.total_meters(),
        }
    }

    /// Apply one raw fix: filter first, then the state-gated effect.
    ///
    /// While Recording, an accepted sample joins the trail and extends the
    /// distance total. While Idle or Paused it only replaces the latest
    /// known position. Rejected samples have no effect at all.
    pub fn observe(&mut self, sample: LocationSample, now: DateTime<Utc>) -> SampleOutcome {
        match self.filter.evaluate(&sample, now) {
            FilterDecision::Reject(reason) => SampleOutcome::Rejected(reason),
            FilterDecision::Accept => {
                self.latest_position = Some(sample);
                match self.state {
                    RecorderState::Recording => {
                        let delta_meters = self.distance.accumulate(&sample);
                        self.trail.push(sample);
                        SampleOutcome::Appended { delta_meters }
                    }
                    RecorderState::Idle | RecorderState::Paused => SampleOutcome::PositionOnly,
                }
            }
        }
    }
}
