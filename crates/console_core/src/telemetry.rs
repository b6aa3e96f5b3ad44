//! Console telemetry: counters for stream and routing activity, plus
//! the notice queue drained by the caller.

use std::collections::VecDeque;

use bevy_ecs::prelude::Resource;

use crate::directions::DirectionsError;

/// Counters for one console session.
#[derive(Debug, Default, Clone, Resource)]
pub struct ConsoleTelemetry {
    pub positions_applied: u64,
    pub markers_created: u64,
    pub malformed_dropped: u64,
    pub degraded_signals: u64,
    pub routes_requested: u64,
    pub routes_applied: u64,
    pub routes_failed: u64,
    pub responses_discarded: u64,
}

/// A transient notice surfaced to the caller. Nothing here is fatal;
/// every condition is recoverable by retrying the user action.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleNotice {
    /// The live channel lost connectivity; existing markers are kept.
    ConnectivityDegraded,
    /// A directions request failed; prior route state is untouched.
    RouteFailed(DirectionsError),
}

/// FIFO queue of pending notices, drained by the hosting session.
#[derive(Debug, Default, Resource)]
pub struct Notices {
    queue: VecDeque<ConsoleNotice>,
}

impl Notices {
    pub fn push(&mut self, notice: ConsoleNotice) {
        self.queue.push_back(notice);
    }

    pub fn drain(&mut self) -> Vec<ConsoleNotice> {
        self.queue.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
