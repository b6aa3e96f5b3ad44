use bevy_ecs::prelude::{Res, ResMut};

use crate::clock::{ConsoleEvent, CurrentEvent};
use crate::composer::RouteComposer;
use crate::directions::DirectionsOutbox;
use crate::map::{MapResource, SurfaceState};
use crate::registry::FleetRegistry;
use crate::telemetry::ConsoleTelemetry;

/// Marks the surface ready and replays everything deferred while it
/// was not: position inserts (dashboard) and map clicks (editor). The
/// registry and composer resources are optional because the system
/// runs in both session schedules.
pub fn map_ready_system(
    event: Res<CurrentEvent>,
    mut surface: ResMut<SurfaceState>,
    mut map: ResMut<MapResource>,
    mut telemetry: ResMut<ConsoleTelemetry>,
    registry: Option<ResMut<FleetRegistry>>,
    composer: Option<ResMut<RouteComposer>>,
    outbox: Option<ResMut<DirectionsOutbox>>,
) {
    let ConsoleEvent::MapReady = &event.0 else {
        return;
    };
    surface.ready = true;

    if let Some(mut registry) = registry {
        let deferred = registry.deferred_count();
        if deferred > 0 {
            let created = registry.flush_deferred(map.0.as_mut());
            telemetry.positions_applied += deferred as u64;
            telemetry.markers_created += created as u64;
        }
    }

    if let (Some(mut composer), Some(mut outbox)) = (composer, outbox) {
        for request in composer.flush_deferred(map.0.as_mut()) {
            telemetry.routes_requested += 1;
            outbox.push(request);
        }
    }
}
