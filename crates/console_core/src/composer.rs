//! Route composer: the two-point route-selection interaction.
//!
//! The composer owns exactly one in-flight interaction: the operator
//! activates a role (origin or destination), clicks the map to place
//! that waypoint, and once both waypoints are set a directions request
//! is issued. Requests are single-flight — each carries a generation
//! token, and only a completion matching the current token may mutate
//! visible state. Superseded completions are discarded.

use std::collections::VecDeque;

use bevy_ecs::prelude::Resource;

use crate::directions::{DirectionsError, DirectionsRequest, DirectionsRoute, TravelProfile};
use crate::geo::{BoundingBox, GeoPoint};
use crate::map::{MapSurface, MarkerHandle, MarkerStyle};

/// Which endpoint the operator is currently placing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Origin,
    Destination,
}

impl Role {
    fn style(self) -> MarkerStyle {
        match self {
            Role::Origin => MarkerStyle::Origin,
            Role::Destination => MarkerStyle::Destination,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Role::Origin => "Origin",
            Role::Destination => "Destination",
        }
    }
}

/// Interaction state. `Requesting` covers the full interval between
/// issuing a directions request and its success or failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerState {
    Idle,
    AwaitingClick(Role),
    Requesting,
    Ready,
}

/// Distance/duration derived from the latest applied route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteMetrics {
    pub distance_km: f64,
    pub duration_min: f64,
}

/// What `confirm()` hands back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSelection {
    /// Fixed-precision `"lat, lng"` string for the confirmed role.
    pub coordinates: String,
    pub distance_km: f64,
    pub duration_min: f64,
    /// False when the metrics were not recomputed for the current
    /// waypoint pair (partial confirmation, or a failed refresh).
    pub metrics_recomputed: bool,
}

/// Confirmation rejections, surfaced to the operator as prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeError {
    NoPointSelected,
    RequestInFlight,
}

impl std::fmt::Display for ComposeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComposeError::NoPointSelected => write!(f, "select a point on the map first"),
            ComposeError::RequestInFlight => write!(f, "route request still in progress"),
        }
    }
}

impl std::error::Error for ComposeError {}

/// Outcome of delivering a directions completion to the composer.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    /// The completion matched the current token and was applied.
    Applied,
    /// A newer request superseded this completion; it was discarded.
    Superseded,
    /// The current request failed; prior geometry/metrics kept.
    Failed(DirectionsError),
}

/// State for one route-selection interaction.
#[derive(Debug, Resource)]
pub struct RouteComposer {
    state: ComposerState,
    active_role: Option<Role>,
    origin: Option<GeoPoint>,
    destination: Option<GeoPoint>,
    origin_marker: Option<MarkerHandle>,
    destination_marker: Option<MarkerHandle>,
    metrics: Option<RouteMetrics>,
    /// True only while `metrics` corresponds to the current waypoint pair.
    metrics_fresh: bool,
    busy: bool,
    /// Last issued generation token; completions must match it.
    current_token: u64,
    profile: TravelProfile,
    fit_padding: f64,
    /// Clicks that arrived before the surface was ready, with the role
    /// that was awaiting each at click time.
    deferred_clicks: VecDeque<(Role, GeoPoint)>,
}

impl Default for RouteComposer {
    fn default() -> Self {
        Self::new(TravelProfile::Driving, 80.0)
    }
}

impl RouteComposer {
    pub fn new(profile: TravelProfile, fit_padding: f64) -> Self {
        Self {
            state: ComposerState::Idle,
            active_role: None,
            origin: None,
            destination: None,
            origin_marker: None,
            destination_marker: None,
            metrics: None,
            metrics_fresh: false,
            busy: false,
            current_token: 0,
            profile,
            fit_padding,
            deferred_clicks: VecDeque::new(),
        }
    }

    /// Begin waypoint selection for `role`. The next map click places
    /// that role's waypoint.
    pub fn activate(&mut self, role: Role) {
        self.active_role = Some(role);
        // Activation while Requesting is allowed: the superseding
        // click bumps the token when it lands.
        self.state = ComposerState::AwaitingClick(role);
    }

    /// Handle a map click. While a role is awaiting a click, places or
    /// replaces that role's waypoint marker; once both waypoints are
    /// set, issues a directions request and returns it for dispatch.
    /// Clicks with no role active are ignored.
    pub fn place_click(
        &mut self,
        map: &mut dyn MapSurface,
        point: GeoPoint,
    ) -> Option<DirectionsRequest> {
        let ComposerState::AwaitingClick(role) = self.state else {
            return None;
        };
        self.state = ComposerState::Idle;
        self.place_waypoint(map, role, point)
    }

    /// Queue a click that arrived before the surface was ready. The
    /// awaiting role is captured now, so replay is unaffected by later
    /// activations. Clicks with no role active are dropped, same as
    /// live clicks.
    pub fn defer_click(&mut self, point: GeoPoint) {
        if let ComposerState::AwaitingClick(role) = self.state {
            self.state = ComposerState::Idle;
            self.deferred_clicks.push_back((role, point));
        }
    }

    /// Replay deferred clicks once the surface is ready. Returns any
    /// directions requests they triggered, in order.
    pub fn flush_deferred(&mut self, map: &mut dyn MapSurface) -> Vec<DirectionsRequest> {
        let mut requests = Vec::new();
        while let Some((role, point)) = self.deferred_clicks.pop_front() {
            if let Some(request) = self.place_waypoint(map, role, point) {
                requests.push(request);
            }
        }
        requests
    }

    /// Place or replace one role's waypoint marker, then try to issue.
    /// Replacing removes the previous marker for that role first.
    fn place_waypoint(
        &mut self,
        map: &mut dyn MapSurface,
        role: Role,
        point: GeoPoint,
    ) -> Option<DirectionsRequest> {
        let (slot, marker_slot) = match role {
            Role::Origin => (&mut self.origin, &mut self.origin_marker),
            Role::Destination => (&mut self.destination, &mut self.destination_marker),
        };
        if let Some(old) = marker_slot.take() {
            map.remove_marker(old);
        }
        *marker_slot = Some(map.add_marker(point, role.style(), role.label()));
        *slot = Some(point);
        self.metrics_fresh = false;

        self.refresh_route()
    }

    /// Guard + issue: fires only with a complete origin/destination
    /// pair. A new request supersedes any outstanding one by bumping
    /// the generation token.
    fn refresh_route(&mut self) -> Option<DirectionsRequest> {
        let (Some(origin), Some(destination)) = (self.origin, self.destination) else {
            return None;
        };
        self.current_token += 1;
        self.busy = true;
        self.state = ComposerState::Requesting;
        Some(DirectionsRequest {
            token: self.current_token,
            origin,
            destination,
            profile: self.profile,
        })
    }

    /// Deliver a directions completion. Completions whose token does
    /// not match the current one are discarded without touching state.
    pub fn apply_response(
        &mut self,
        map: &mut dyn MapSurface,
        token: u64,
        outcome: Result<DirectionsRoute, DirectionsError>,
    ) -> RouteOutcome {
        if token != self.current_token {
            return RouteOutcome::Superseded;
        }

        match outcome {
            Ok(route) => {
                self.metrics = Some(RouteMetrics {
                    distance_km: route.distance_m / 1000.0,
                    duration_min: route.duration_s / 60.0,
                });
                self.metrics_fresh = true;
                self.busy = false;
                self.state = ComposerState::Ready;

                map.set_route_overlay(&route.geometry);
                if let Some(bounds) = BoundingBox::from_points(route.geometry.iter()) {
                    map.fit_bounds(bounds, self.fit_padding);
                }
                RouteOutcome::Applied
            }
            Err(err) => {
                // Prior geometry and metrics stay untouched.
                self.busy = false;
                self.state = ComposerState::Idle;
                RouteOutcome::Failed(err)
            }
        }
    }

    /// Confirm the active role's waypoint: returns its coordinate
    /// string with the latest metrics. Rejected while a request is in
    /// flight or when no point is placed for the active role. Partial
    /// confirmation (the other waypoint unset) is allowed, with
    /// `metrics_recomputed` flagged false.
    pub fn confirm(&self) -> Result<RouteSelection, ComposeError> {
        if self.busy {
            return Err(ComposeError::RequestInFlight);
        }
        let role = self.active_role.ok_or(ComposeError::NoPointSelected)?;
        let point = self
            .waypoint(role)
            .ok_or(ComposeError::NoPointSelected)?;

        let metrics = self.metrics.unwrap_or(RouteMetrics {
            distance_km: 0.0,
            duration_min: 0.0,
        });
        Ok(RouteSelection {
            coordinates: point.coordinate_string(),
            distance_km: metrics.distance_km,
            duration_min: metrics.duration_min,
            metrics_recomputed: self.metrics_fresh,
        })
    }

    /// Close the interaction: remove waypoint markers and the overlay,
    /// clear selections, and bump the token so any in-flight response
    /// is discarded on arrival.
    pub fn close(&mut self, map: &mut dyn MapSurface) {
        if let Some(handle) = self.origin_marker.take() {
            map.remove_marker(handle);
        }
        if let Some(handle) = self.destination_marker.take() {
            map.remove_marker(handle);
        }
        map.clear_route_overlay();

        self.origin = None;
        self.destination = None;
        self.metrics = None;
        self.metrics_fresh = false;
        self.busy = false;
        self.active_role = None;
        self.state = ComposerState::Idle;
        self.deferred_clicks.clear();
        self.current_token += 1;
    }

    pub fn state(&self) -> ComposerState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn metrics(&self) -> Option<RouteMetrics> {
        self.metrics
    }

    pub fn waypoint(&self, role: Role) -> Option<GeoPoint> {
        match role {
            Role::Origin => self.origin,
            Role::Destination => self.destination,
        }
    }

    pub fn current_token(&self) -> u64 {
        self.current_token
    }

    pub fn fit_padding(&self) -> f64 {
        self.fit_padding
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_without_any_selection_is_rejected() {
        let composer = RouteComposer::default();
        assert_eq!(composer.confirm(), Err(ComposeError::NoPointSelected));
    }

    #[test]
    fn confirm_after_activation_without_click_is_rejected() {
        let mut composer = RouteComposer::default();
        composer.activate(Role::Origin);
        assert_eq!(composer.confirm(), Err(ComposeError::NoPointSelected));
    }

    #[test]
    fn activation_moves_to_awaiting_click() {
        let mut composer = RouteComposer::default();
        composer.activate(Role::Destination);
        assert_eq!(
            composer.state(),
            ComposerState::AwaitingClick(Role::Destination)
        );
    }
}
