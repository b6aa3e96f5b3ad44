use bevy_ecs::prelude::{Res, ResMut};

use crate::clock::{ConsoleEvent, CurrentEvent};
use crate::composer::RouteComposer;
use crate::directions::DirectionsOutbox;
use crate::map::{MapResource, SurfaceState};
use crate::telemetry::ConsoleTelemetry;

/// Routes a map click into the composer. Clicks arriving before the
/// surface is ready are deferred; clicks that complete a waypoint pair
/// queue a directions request for the session to dispatch.
pub fn map_click_system(
    event: Res<CurrentEvent>,
    surface: Res<SurfaceState>,
    mut composer: ResMut<RouteComposer>,
    mut map: ResMut<MapResource>,
    mut outbox: ResMut<DirectionsOutbox>,
    mut telemetry: ResMut<ConsoleTelemetry>,
) {
    let ConsoleEvent::MapClick(point) = &event.0 else {
        return;
    };
    let point = *point;

    if !surface.ready {
        composer.defer_click(point);
        return;
    }

    if let Some(request) = composer.place_click(map.0.as_mut(), point) {
        telemetry.routes_requested += 1;
        outbox.push(request);
    }
}
