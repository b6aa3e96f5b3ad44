use bevy_ecs::prelude::{Res, ResMut};

use crate::clock::{ConsoleEvent, CurrentEvent};
use crate::composer::{RouteComposer, RouteOutcome};
use crate::map::MapResource;
use crate::telemetry::{ConsoleNotice, ConsoleTelemetry, Notices};

/// Delivers a directions completion to the composer. Only the
/// completion matching the current generation token mutates visible
/// state; superseded completions are counted and discarded.
pub fn directions_resolved_system(
    event: Res<CurrentEvent>,
    mut composer: ResMut<RouteComposer>,
    mut map: ResMut<MapResource>,
    mut telemetry: ResMut<ConsoleTelemetry>,
    mut notices: ResMut<Notices>,
) {
    let ConsoleEvent::DirectionsResolved { token, outcome } = &event.0 else {
        return;
    };

    match composer.apply_response(map.0.as_mut(), *token, outcome.clone()) {
        RouteOutcome::Applied => {
            telemetry.routes_applied += 1;
        }
        RouteOutcome::Superseded => {
            telemetry.responses_discarded += 1;
            tracing::debug!(token, "discarded superseded directions response");
        }
        RouteOutcome::Failed(err) => {
            telemetry.routes_failed += 1;
            tracing::warn!(error = %err, "directions request failed");
            notices.push(ConsoleNotice::RouteFailed(err));
        }
    }
}
