use bevy_ecs::prelude::{Res, ResMut};

use crate::clock::{ConsoleEvent, CurrentEvent};
use crate::composer::RouteComposer;

/// Begins waypoint selection for the activated role; the next click
/// places that role's waypoint.
pub fn role_activated_system(event: Res<CurrentEvent>, mut composer: ResMut<RouteComposer>) {
    let ConsoleEvent::RoleActivated(role) = &event.0 else {
        return;
    };
    composer.activate(*role);
}
