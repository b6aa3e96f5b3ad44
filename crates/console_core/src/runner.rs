//! Console runner: pops queued events and routes them into the
//! schedule. Each step pops the next event from [`EventQueue`],
//! inserts it as [`CurrentEvent`], then runs the schedule. Events are
//! processed strictly in arrival order, one at a time.

use bevy_ecs::prelude::{Res, Schedule, World};
use bevy_ecs::schedule::IntoSystemConfigs;

use crate::clock::{ConsoleEvent, CurrentEvent, EventQueue};
use crate::systems::{
    channel_status::channel_status_system, directions_resolved::directions_resolved_system,
    map_click::map_click_system, map_ready::map_ready_system,
    position_insert::position_insert_system, role_activated::role_activated_system,
};

// Condition functions for each event kind
fn is_position_insert(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| matches!(e.0, ConsoleEvent::PositionInsert(_)))
        .unwrap_or(false)
}

fn is_channel_degraded(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| matches!(e.0, ConsoleEvent::ChannelDegraded))
        .unwrap_or(false)
}

fn is_map_ready(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| matches!(e.0, ConsoleEvent::MapReady))
        .unwrap_or(false)
}

fn is_role_activated(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| matches!(e.0, ConsoleEvent::RoleActivated(_)))
        .unwrap_or(false)
}

fn is_map_click(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| matches!(e.0, ConsoleEvent::MapClick(_)))
        .unwrap_or(false)
}

fn is_directions_resolved(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| matches!(e.0, ConsoleEvent::DirectionsResolved { .. }))
        .unwrap_or(false)
}

/// Runs one console step: pops the next event, inserts it as
/// [`CurrentEvent`], then runs the schedule. Returns `true` if an
/// event was processed.
pub fn run_next_event(world: &mut World, schedule: &mut Schedule) -> bool {
    let event = match world.resource_mut::<EventQueue>().pop_next() {
        Some(event) => event,
        None => return false,
    };
    world.insert_resource(CurrentEvent(event));
    schedule.run(world);
    true
}

/// Runs console steps until the event queue is empty or `max_steps`
/// is reached. Returns the number of steps executed.
pub fn run_until_empty(world: &mut World, schedule: &mut Schedule, max_steps: usize) -> usize {
    let mut steps = 0;
    while steps < max_steps && run_next_event(world, schedule) {
        steps += 1;
    }
    steps
}

/// Schedule for the live-fleet dashboard: position inserts, channel
/// status, and surface readiness.
pub fn dashboard_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems((
        position_insert_system.run_if(is_position_insert),
        channel_status_system.run_if(is_channel_degraded),
        map_ready_system.run_if(is_map_ready),
    ));
    schedule
}

/// Schedule for the route editor: role activations, clicks,
/// directions completions, and surface readiness.
pub fn editor_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems((
        role_activated_system.run_if(is_role_activated),
        map_click_system.run_if(is_map_click),
        directions_resolved_system.run_if(is_directions_resolved),
        map_ready_system.run_if(is_map_ready),
    ));
    schedule
}
