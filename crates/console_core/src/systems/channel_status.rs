use bevy_ecs::prelude::{Res, ResMut};

use crate::clock::{ConsoleEvent, CurrentEvent};
use crate::telemetry::{ConsoleNotice, ConsoleTelemetry, Notices};

/// Surfaces channel-level connection loss as a degraded-connectivity
/// notice. Existing markers are never discarded on connection loss.
pub fn channel_status_system(
    event: Res<CurrentEvent>,
    mut telemetry: ResMut<ConsoleTelemetry>,
    mut notices: ResMut<Notices>,
) {
    let ConsoleEvent::ChannelDegraded = &event.0 else {
        return;
    };
    telemetry.degraded_signals += 1;
    tracing::warn!("live channel degraded; keeping existing markers");
    notices.push(ConsoleNotice::ConnectivityDegraded);
}
