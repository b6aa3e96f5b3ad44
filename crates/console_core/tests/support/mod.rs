#![allow(dead_code)]

use bevy_ecs::prelude::{Schedule, World};

use console_core::clock::{ConsoleEvent, EventQueue};
use console_core::composer::RouteComposer;
use console_core::directions::{DirectionsOutbox, DirectionsRequest};
use console_core::map::{MapResource, SurfaceState};
use console_core::registry::FleetRegistry;
use console_core::runner::{dashboard_schedule, editor_schedule, run_until_empty};
use console_core::telemetry::{ConsoleTelemetry, Notices};
use console_core::test_helpers::RecordingSurface;

const MAX_STEPS: usize = 10_000;

fn shared_resources(world: &mut World, surface: &RecordingSurface, ready: bool) {
    world.insert_resource(EventQueue::default());
    world.insert_resource(SurfaceState { ready });
    world.insert_resource(ConsoleTelemetry::default());
    world.insert_resource(Notices::default());
    world.insert_resource(MapResource(Box::new(surface.clone())));
}

/// World + schedule for reconciler system tests, surface ready.
pub fn dashboard_world(surface: &RecordingSurface) -> (World, Schedule) {
    dashboard_world_with_readiness(surface, true)
}

pub fn dashboard_world_with_readiness(
    surface: &RecordingSurface,
    ready: bool,
) -> (World, Schedule) {
    let mut world = World::new();
    shared_resources(&mut world, surface, ready);
    world.insert_resource(FleetRegistry::default());
    (world, dashboard_schedule())
}

/// World + schedule for composer system tests, surface ready.
pub fn editor_world(surface: &RecordingSurface) -> (World, Schedule) {
    editor_world_with_readiness(surface, true)
}

pub fn editor_world_with_readiness(surface: &RecordingSurface, ready: bool) -> (World, Schedule) {
    let mut world = World::new();
    shared_resources(&mut world, surface, ready);
    world.insert_resource(DirectionsOutbox::default());
    world.insert_resource(RouteComposer::default());
    (world, editor_schedule())
}

/// Queue one event and process everything pending.
pub fn dispatch(world: &mut World, schedule: &mut Schedule, event: ConsoleEvent) {
    world.resource_mut::<EventQueue>().push(event);
    run_until_empty(world, schedule, MAX_STEPS);
}

/// Drain the requests issued since the last call.
pub fn issued_requests(world: &mut World) -> Vec<DirectionsRequest> {
    world.resource_mut::<DirectionsOutbox>().drain()
}
