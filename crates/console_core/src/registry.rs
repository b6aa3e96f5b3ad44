//! Fleet marker registry: projects the position event stream onto
//! persistent map markers with last-write-wins semantics per vehicle.

use std::collections::{HashMap, VecDeque};

use bevy_ecs::prelude::Resource;

use crate::channel::VehiclePosition;
use crate::geo::GeoPoint;
use crate::map::{MapSurface, MarkerHandle, MarkerStyle};

/// One tracked vehicle: its marker handle and last applied position.
/// The registry exclusively owns the handle; no other component may
/// mutate it.
#[derive(Debug, Clone)]
pub struct MarkerEntry {
    pub handle: MarkerHandle,
    pub last: GeoPoint,
}

/// Keyed store of vehicle markers, owned by a single dashboard session.
/// An entry exists for a vehicle id iff at least one event for that id
/// has been applied since the session started. Entries are never
/// removed mid-session; teardown removes them all.
#[derive(Debug, Default, Resource)]
pub struct FleetRegistry {
    markers: HashMap<String, MarkerEntry>,
    /// Positions that arrived before the surface was ready; replayed
    /// in arrival order on the ready signal.
    deferred: VecDeque<VehiclePosition>,
}

impl FleetRegistry {
    /// Fold one validated position into marker state: create a marker
    /// on first sighting, relocate it thereafter. The handle is never
    /// replaced, only moved.
    pub fn apply(&mut self, map: &mut dyn MapSurface, position: VehiclePosition) -> bool {
        match self.markers.get_mut(&position.vehicle_id) {
            Some(entry) => {
                map.move_marker(entry.handle, position.point);
                entry.last = position.point;
                false
            }
            None => {
                let handle = map.add_marker(
                    position.point,
                    MarkerStyle::Vehicle,
                    &position.vehicle_id,
                );
                self.markers.insert(
                    position.vehicle_id,
                    MarkerEntry {
                        handle,
                        last: position.point,
                    },
                );
                true
            }
        }
    }

    /// Queue a position that arrived before the surface was ready.
    pub fn defer(&mut self, position: VehiclePosition) {
        self.deferred.push_back(position);
    }

    /// Replay deferred positions in arrival order once the surface is
    /// ready. Returns how many markers were newly created.
    pub fn flush_deferred(&mut self, map: &mut dyn MapSurface) -> usize {
        let mut created = 0;
        while let Some(position) = self.deferred.pop_front() {
            if self.apply(map, position) {
                created += 1;
            }
        }
        created
    }

    /// Remove every marker from the surface and clear the registry.
    /// Only teardown does this; there is no per-vehicle removal.
    pub fn teardown(&mut self, map: &mut dyn MapSurface) {
        for entry in self.markers.values() {
            map.remove_marker(entry.handle);
        }
        self.markers.clear();
        self.deferred.clear();
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn deferred_count(&self) -> usize {
        self.deferred.len()
    }

    pub fn position_of(&self, vehicle_id: &str) -> Option<GeoPoint> {
        self.markers.get(vehicle_id).map(|entry| entry.last)
    }

    pub fn handle_of(&self, vehicle_id: &str) -> Option<MarkerHandle> {
        self.markers.get(vehicle_id).map(|entry| entry.handle)
    }

    pub fn vehicle_ids(&self) -> impl Iterator<Item = &str> {
        self.markers.keys().map(String::as_str)
    }
}
