//! Rendering-surface capability: the small interface the console needs
//! from a map engine, abstracted behind a trait so the reconciler and
//! composer run against a recording fake in tests.

use bevy_ecs::prelude::Resource;

use crate::geo::{BoundingBox, GeoPoint};

/// Opaque handle to a marker placed on the surface. Handles stay valid
/// for the lifetime of the surface; moving a marker never replaces the
/// handle, so attached popups and icons persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerHandle(pub u64);

/// Visual role of a marker. Colors follow the console palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerStyle {
    /// A tracked fleet vehicle, labelled with its vehicle id.
    Vehicle,
    /// The fixed depot marker placed when a dashboard opens.
    Depot,
    /// Route origin waypoint (green).
    Origin,
    /// Route destination waypoint (red).
    Destination,
}

impl MarkerStyle {
    pub fn color(&self) -> &'static str {
        match self {
            MarkerStyle::Vehicle => "#3b82f6",
            MarkerStyle::Depot => "#ef4444",
            MarkerStyle::Origin => "#22c55e",
            MarkerStyle::Destination => "#ef4444",
        }
    }
}

/// Capability interface over the map engine. Implementations must be
/// `Send + Sync` so the surface can be stored as a boxed resource.
pub trait MapSurface: Send + Sync {
    /// Place a marker and return its handle.
    fn add_marker(&mut self, point: GeoPoint, style: MarkerStyle, label: &str) -> MarkerHandle;

    /// Relocate an existing marker. The handle itself is never replaced.
    fn move_marker(&mut self, handle: MarkerHandle, point: GeoPoint);

    /// Remove a marker from the surface.
    fn remove_marker(&mut self, handle: MarkerHandle);

    /// Replace the route overlay wholesale with a single full polyline.
    /// The surface must never show a partial intermediate state.
    fn set_route_overlay(&mut self, geometry: &[GeoPoint]);

    /// Remove the route overlay if present.
    fn clear_route_overlay(&mut self);

    /// Animate the camera to fit `bounds` with the given padding (px).
    fn fit_bounds(&mut self, bounds: BoundingBox, padding: f64);
}

/// Resource wrapping the boxed surface handed over by the hosting view.
#[derive(Resource)]
pub struct MapResource(pub Box<dyn MapSurface>);

/// Readiness latch for the rendering surface. The surface is not ready
/// for marker placement or camera moves until its ready signal fires;
/// systems defer surface work until then.
#[derive(Debug, Default, Resource)]
pub struct SurfaceState {
    pub ready: bool,
}
