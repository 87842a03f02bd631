// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sample acceptance policy: accuracy and staleness checks.

use chrono::{DateTime, Duration, Utc};

use crate::models::LocationSample;

/// Default staleness window applied when none is configured explicitly.
pub const DEFAULT_STALENESS_SECS: u64 = 30;

/// Why a fix was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Sensor reported a negative accuracy radius (invalid fix)
    NegativeAccuracy,
    /// Accuracy radius exceeds the configured limit
    AccuracyAboveLimit,
    /// Fix is older than the staleness window
    StaleFix,
}

impl RejectReason {
    /// Stable label for structured logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::NegativeAccuracy => "negative_accuracy",
            RejectReason::AccuracyAboveLimit => "accuracy_above_limit",
            RejectReason::StaleFix => "stale_fix",
        }
    }
}

/// Outcome of evaluating one fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    Accept,
    Reject(RejectReason),
}

impl FilterDecision {
    pub fn is_accept(&self) -> bool {
        matches!(self, FilterDecision::Accept)
    }
}

/// Decides whether an incoming raw fix may enter the recording pipeline.
///
/// Pure decision component: no side effects and no clock access (callers
/// pass `now`, so it is testable with synthetic time). The first fix of a
/// session gets no special treatment.
#[derive(Debug, Clone)]
pub struct SampleFilter {
    max_accuracy_m: Option<f64>,
    staleness_window: Option<Duration>,
}

impl Default for SampleFilter {
    fn default() -> Self {
        Self {
            max_accuracy_m: None,
            staleness_window: Some(Duration::seconds(DEFAULT_STALENESS_SECS as i64)),
        }
    }
}

impl SampleFilter {
    /// Build a filter with explicit knobs.
    ///
    /// `max_accuracy_m: None` disables the upper accuracy limit (negative
    /// accuracy is always rejected); `staleness_window: None` disables the
    /// recency check.
    pub fn new(max_accuracy_m: Option<f64>, staleness_window: Option<Duration>) -> Self {
        Self {
            max_accuracy_m,
            staleness_window,
        }
    }

    /// Decide whether `sample` is a valid trail point as of `now`.
    pub fn evaluate(&self, sample: &LocationSample, now: DateTime<Utc>) -> FilterDecision {
        if sample.horizontal_accuracy_m < 0.0 {
            return FilterDecision::Reject(RejectReason::NegativeAccuracy);
        }

        if let Some(limit) = self.max_accuracy_m {
            if sample.horizontal_accuracy_m > limit {
                return FilterDecision::Reject(RejectReason::AccuracyAboveLimit);
            }
        }

        if let Some(window) = self.staleness_window {
            // Only age beyond the window is stale; future-dated fixes pass.
            if now.signed_duration_since(sample.timestamp) > window {
                return FilterDecision::Reject(RejectReason::StaleFix);
            }
        }

        FilterDecision::Accept
    }
}
