// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Location source capability.
//!
//! Platform location drivers sit behind [`LocationSource`], so the
//! recording pipeline can be exercised with synthetic sample sequences
//! and no real hardware. Whether the process is authorized to receive
//! fixes is the attaching collaborator's concern, never the recorder's.

use futures_util::stream::{self, BoxStream, StreamExt};

use crate::models::LocationSample;

/// One event from a location source.
#[derive(Debug, Clone)]
pub enum LocationEvent {
    /// A new fix is available
    Update(LocationSample),
    /// The source reported a non-fatal failure (permission revoked,
    /// hardware error). Recording state is unaffected.
    Failure(String),
}

/// A provider of location events.
///
/// Implementations wrap platform services; tests and demos use
/// [`ScriptedSource`]. The stream ends when the source has nothing more
/// to deliver.
pub trait LocationSource: Send + 'static {
    /// Consume the source, yielding its event stream.
    fn into_events(self) -> BoxStream<'static, LocationEvent>;
}

/// Replays a fixed script of events.
pub struct ScriptedSource {
    events: Vec<LocationEvent>,
}

impl ScriptedSource {
    pub fn new(events: Vec<LocationEvent>) -> Self {
        Self { events }
    }

    /// A script consisting purely of location updates.
    pub fn from_samples(samples: Vec<LocationSample>) -> Self {
        Self::new(samples.into_iter().map(LocationEvent::Update).collect())
    }
}

impl LocationSource for ScriptedSource {
    fn into_events(self) -> BoxStream<'static, LocationEvent> {
        stream::iter(self.events).boxed()
    }
}
