//! Console event queue: typed events delivered in arrival order.
//!
//! The surrounding view pushes events (feed inserts, map clicks,
//! directions completions) and the runner pops them one at a time,
//! inserting each as [`CurrentEvent`] before running the schedule.
//! Delivery order is strictly arrival order; no reordering or
//! coalescing is performed.

use std::collections::VecDeque;

use bevy_ecs::prelude::Resource;

use crate::channel::PositionRecord;
use crate::composer::Role;
use crate::directions::{DirectionsError, DirectionsRoute};
use crate::geo::GeoPoint;

/// One unit of work for the console. Payloads are carried inline so a
/// system sees exactly the data the external collaborator delivered.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleEvent {
    /// A row-insert from the live position channel, still unvalidated.
    PositionInsert(PositionRecord),
    /// The live channel reported degraded connectivity or closed.
    ChannelDegraded,
    /// The rendering surface signalled readiness; deferred work replays.
    MapReady,
    /// The operator activated waypoint selection for a role.
    RoleActivated(Role),
    /// The operator clicked the map at the given coordinate.
    MapClick(GeoPoint),
    /// A directions request completed; `token` identifies which one.
    DirectionsResolved {
        token: u64,
        outcome: Result<DirectionsRoute, DirectionsError>,
    },
}

/// FIFO queue of console events, in arrival order.
#[derive(Debug, Default, Resource)]
pub struct EventQueue {
    events: VecDeque<ConsoleEvent>,
}

impl EventQueue {
    pub fn push(&mut self, event: ConsoleEvent) {
        self.events.push_back(event);
    }

    pub fn pop_next(&mut self) -> Option<ConsoleEvent> {
        self.events.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

/// The event currently being processed by the schedule.
#[derive(Debug, Clone, Resource)]
pub struct CurrentEvent(pub ConsoleEvent);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_pops_events_in_arrival_order() {
        let mut queue = EventQueue::default();
        queue.push(ConsoleEvent::MapReady);
        queue.push(ConsoleEvent::ChannelDegraded);
        queue.push(ConsoleEvent::MapClick(GeoPoint::new(-39.81, -73.24)));

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop_next(), Some(ConsoleEvent::MapReady));
        assert_eq!(queue.pop_next(), Some(ConsoleEvent::ChannelDegraded));
        assert!(matches!(queue.pop_next(), Some(ConsoleEvent::MapClick(_))));
        assert!(queue.pop_next().is_none());
        assert!(queue.is_empty());
    }
}
