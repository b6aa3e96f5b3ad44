use bevy_ecs::prelude::{Res, ResMut};

use crate::channel::VehiclePosition;
use crate::clock::{ConsoleEvent, CurrentEvent};
use crate::map::{MapResource, SurfaceState};
use crate::registry::FleetRegistry;
use crate::telemetry::ConsoleTelemetry;

/// Folds one position insert into marker state. Malformed records are
/// dropped without touching any marker; records arriving before the
/// surface is ready are deferred, not lost.
pub fn position_insert_system(
    event: Res<CurrentEvent>,
    surface: Res<SurfaceState>,
    mut registry: ResMut<FleetRegistry>,
    mut map: ResMut<MapResource>,
    mut telemetry: ResMut<ConsoleTelemetry>,
) {
    let ConsoleEvent::PositionInsert(record) = &event.0 else {
        return;
    };

    let position = match VehiclePosition::try_from(record.clone()) {
        Ok(position) => position,
        Err(reason) => {
            telemetry.malformed_dropped += 1;
            tracing::debug!(?reason, "dropped malformed position record");
            return;
        }
    };

    if !surface.ready {
        registry.defer(position);
        return;
    }

    let created = registry.apply(map.0.as_mut(), position);
    telemetry.positions_applied += 1;
    if created {
        telemetry.markers_created += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::prelude::{Schedule, World};

    use crate::channel::PositionRecord;
    use crate::geo::GeoPoint;
    use crate::test_helpers::RecordingSurface;

    fn world_with_surface() -> (World, RecordingSurface) {
        let surface = RecordingSurface::new();
        let mut world = World::new();
        world.insert_resource(FleetRegistry::default());
        world.insert_resource(ConsoleTelemetry::default());
        world.insert_resource(MapResource(Box::new(surface.clone())));
        world.insert_resource(SurfaceState { ready: true });
        (world, surface)
    }

    fn run_insert(world: &mut World, record: PositionRecord) {
        world.insert_resource(CurrentEvent(ConsoleEvent::PositionInsert(record)));
        let mut schedule = Schedule::default();
        schedule.add_systems(position_insert_system);
        schedule.run(world);
    }

    #[test]
    fn first_sighting_creates_a_marker() {
        let (mut world, surface) = world_with_surface();
        run_insert(
            &mut world,
            PositionRecord {
                vehicle_id: Some("B1".to_string()),
                lat: -39.81,
                lng: -73.24,
            },
        );

        let registry = world.resource::<FleetRegistry>();
        assert_eq!(registry.marker_count(), 1);
        assert_eq!(
            registry.position_of("B1"),
            Some(GeoPoint::new(-39.81, -73.24))
        );
        assert_eq!(surface.marker_count(), 1);
    }

    #[test]
    fn malformed_record_changes_nothing() {
        let (mut world, surface) = world_with_surface();
        run_insert(
            &mut world,
            PositionRecord {
                vehicle_id: Some("B1".to_string()),
                lat: -39.81,
                lng: -73.24,
            },
        );
        run_insert(
            &mut world,
            PositionRecord {
                vehicle_id: None,
                lat: -39.80,
                lng: -73.23,
            },
        );
        run_insert(
            &mut world,
            PositionRecord {
                vehicle_id: Some("B1".to_string()),
                lat: f64::NAN,
                lng: -73.23,
            },
        );

        let registry = world.resource::<FleetRegistry>();
        assert_eq!(registry.marker_count(), 1);
        assert_eq!(
            registry.position_of("B1"),
            Some(GeoPoint::new(-39.81, -73.24)),
            "malformed events must not move existing markers"
        );
        assert_eq!(world.resource::<ConsoleTelemetry>().malformed_dropped, 2);
        assert_eq!(surface.marker_count(), 1);
    }

    #[test]
    fn record_before_ready_is_deferred() {
        let (mut world, surface) = world_with_surface();
        world.resource_mut::<SurfaceState>().ready = false;
        run_insert(
            &mut world,
            PositionRecord {
                vehicle_id: Some("B1".to_string()),
                lat: -39.81,
                lng: -73.24,
            },
        );

        let registry = world.resource::<FleetRegistry>();
        assert_eq!(registry.marker_count(), 0);
        assert_eq!(registry.deferred_count(), 1);
        assert_eq!(surface.marker_count(), 0);
    }
}
