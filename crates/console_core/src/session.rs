//! Caller-facing sessions: thin wrappers owning a `World + Schedule`
//! pair, one per hosting view. The dashboard hosts the fleet
//! reconciler; the route editor hosts the composer. They are fully
//! independent and share only the rendering surface each is handed.

use bevy_ecs::prelude::{Schedule, World};

use crate::channel::{FeedError, FeedPoll, FeedSubscription, PositionFeed};
use crate::clock::{ConsoleEvent, EventQueue};
use crate::composer::{ComposeError, ComposerState, Role, RouteComposer, RouteMetrics, RouteSelection};
use crate::config::ConsoleConfig;
use crate::directions::{DirectionsOracle, DirectionsOutbox};
use crate::geo::GeoPoint;
use crate::map::{MapResource, MapSurface, MarkerHandle, MarkerStyle, SurfaceState};
use crate::registry::FleetRegistry;
use crate::runner::{dashboard_schedule, editor_schedule, run_until_empty};
use crate::telemetry::{ConsoleNotice, ConsoleTelemetry, Notices};

/// Upper bound on events processed per pump; the queue never feeds
/// itself, so this is never reached in practice.
const MAX_STEPS_PER_PUMP: usize = 100_000;

fn install_shared_resources(world: &mut World, map: Box<dyn MapSurface>) {
    world.insert_resource(EventQueue::default());
    world.insert_resource(SurfaceState::default());
    world.insert_resource(ConsoleTelemetry::default());
    world.insert_resource(Notices::default());
    world.insert_resource(MapResource(map));
}

// ---------------------------------------------------------------------------
// Fleet dashboard (reconciler host)
// ---------------------------------------------------------------------------

/// Live-fleet dashboard session: subscribes to the position channel on
/// open and keeps map markers consistent with the stream. The
/// subscription is released on `stop()` and again from `Drop`, so it
/// is released on every exit path.
pub struct FleetDashboard {
    world: World,
    schedule: Schedule,
    subscription: Option<Box<dyn FeedSubscription>>,
    depot_marker: Option<MarkerHandle>,
    config: ConsoleConfig,
}

impl FleetDashboard {
    /// Open a dashboard: install resources, subscribe to the
    /// configured channel. Fails without side effects if the
    /// subscription is rejected.
    pub fn open(
        config: ConsoleConfig,
        map: Box<dyn MapSurface>,
        feed: &mut dyn PositionFeed,
    ) -> Result<Self, FeedError> {
        let subscription = feed.subscribe(&config.channel)?;

        let mut world = World::new();
        install_shared_resources(&mut world, map);
        world.insert_resource(FleetRegistry::default());

        Ok(Self {
            world,
            schedule: dashboard_schedule(),
            subscription: Some(subscription),
            depot_marker: None,
            config,
        })
    }

    /// The surface signalled readiness: place the depot marker, then
    /// replay any deferred position events.
    pub fn surface_ready(&mut self) {
        if self.depot_marker.is_none() {
            let mut map = self.world.resource_mut::<MapResource>();
            self.depot_marker = Some(map.0.add_marker(
                self.config.initial_center,
                MarkerStyle::Depot,
                &self.config.depot_label,
            ));
        }
        self.push_and_run(ConsoleEvent::MapReady);
    }

    /// Drain the subscription and fold every delivery into marker
    /// state, in arrival order. Returns the notices raised since the
    /// last pump.
    pub fn pump(&mut self) -> Vec<ConsoleNotice> {
        if let Some(subscription) = self.subscription.as_mut() {
            loop {
                match subscription.poll() {
                    FeedPoll::Insert(record) => self
                        .world
                        .resource_mut::<EventQueue>()
                        .push(ConsoleEvent::PositionInsert(record)),
                    FeedPoll::Degraded => self
                        .world
                        .resource_mut::<EventQueue>()
                        .push(ConsoleEvent::ChannelDegraded),
                    FeedPoll::Closed => {
                        self.world
                            .resource_mut::<EventQueue>()
                            .push(ConsoleEvent::ChannelDegraded);
                        if let Some(mut closed) = self.subscription.take() {
                            closed.close();
                        }
                        break;
                    }
                    FeedPoll::Empty => break,
                }
            }
        }
        run_until_empty(&mut self.world, &mut self.schedule, MAX_STEPS_PER_PUMP);
        self.drain_notices()
    }

    /// Tear the session down: release the subscription and remove
    /// every marker this session owns.
    pub fn stop(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.close();
        }
        let depot = self.depot_marker.take();
        self.world
            .resource_scope::<MapResource, _>(|world, mut map| {
                world
                    .resource_mut::<FleetRegistry>()
                    .teardown(map.0.as_mut());
                if let Some(handle) = depot {
                    map.0.remove_marker(handle);
                }
            });
    }

    pub fn marker_count(&self) -> usize {
        self.world.resource::<FleetRegistry>().marker_count()
    }

    pub fn vehicle_position(&self, vehicle_id: &str) -> Option<GeoPoint> {
        self.world
            .resource::<FleetRegistry>()
            .position_of(vehicle_id)
    }

    pub fn telemetry(&self) -> ConsoleTelemetry {
        self.world.resource::<ConsoleTelemetry>().clone()
    }

    fn push_and_run(&mut self, event: ConsoleEvent) {
        self.world.resource_mut::<EventQueue>().push(event);
        run_until_empty(&mut self.world, &mut self.schedule, MAX_STEPS_PER_PUMP);
    }

    fn drain_notices(&mut self) -> Vec<ConsoleNotice> {
        self.world.resource_mut::<Notices>().drain()
    }
}

impl Drop for FleetDashboard {
    fn drop(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.close();
        }
    }
}

// ---------------------------------------------------------------------------
// Route editor (composer host)
// ---------------------------------------------------------------------------

/// Route-editor session: hosts the two-point route composer and
/// dispatches its directions requests to the oracle.
pub struct RouteEditor {
    world: World,
    schedule: Schedule,
    oracle: Box<dyn DirectionsOracle>,
}

impl RouteEditor {
    pub fn open(
        config: &ConsoleConfig,
        map: Box<dyn MapSurface>,
        oracle: Box<dyn DirectionsOracle>,
    ) -> Self {
        let mut world = World::new();
        install_shared_resources(&mut world, map);
        world.insert_resource(DirectionsOutbox::default());
        world.insert_resource(RouteComposer::new(config.profile, config.fit_padding));

        Self {
            world,
            schedule: editor_schedule(),
            oracle,
        }
    }

    /// The surface signalled readiness: replay deferred clicks and
    /// dispatch any requests they triggered.
    pub fn surface_ready(&mut self) -> Vec<ConsoleNotice> {
        self.push_and_run(ConsoleEvent::MapReady);
        self.dispatch_pending();
        self.drain_notices()
    }

    /// Begin waypoint selection for `role`.
    pub fn activate(&mut self, role: Role) {
        self.push_and_run(ConsoleEvent::RoleActivated(role));
    }

    /// Deliver a map click. If the click completes a waypoint pair,
    /// the directions request is dispatched before returning.
    pub fn handle_click(&mut self, point: GeoPoint) -> Vec<ConsoleNotice> {
        self.push_and_run(ConsoleEvent::MapClick(point));
        self.dispatch_pending();
        self.drain_notices()
    }

    /// Confirm the active role's waypoint and close the interaction.
    pub fn confirm(&mut self) -> Result<RouteSelection, ComposeError> {
        let selection = self.world.resource::<RouteComposer>().confirm()?;
        self.close();
        Ok(selection)
    }

    /// Cancel the interaction: waypoint markers and overlay removed,
    /// selections cleared, any in-flight response discarded on arrival.
    pub fn close(&mut self) {
        self.world
            .resource_scope::<MapResource, _>(|world, mut map| {
                world.resource_mut::<RouteComposer>().close(map.0.as_mut());
            });
    }

    pub fn state(&self) -> ComposerState {
        self.world.resource::<RouteComposer>().state()
    }

    pub fn is_busy(&self) -> bool {
        self.world.resource::<RouteComposer>().is_busy()
    }

    pub fn metrics(&self) -> Option<RouteMetrics> {
        self.world.resource::<RouteComposer>().metrics()
    }

    pub fn waypoint(&self, role: Role) -> Option<GeoPoint> {
        self.world.resource::<RouteComposer>().waypoint(role)
    }

    pub fn telemetry(&self) -> ConsoleTelemetry {
        self.world.resource::<ConsoleTelemetry>().clone()
    }

    /// Drain issued requests, resolve each against the oracle, and
    /// feed completions back through the event queue. With a blocking
    /// oracle this resolves in issue order; out-of-order completions
    /// are exercised at the system level.
    fn dispatch_pending(&mut self) {
        let requests = self.world.resource_mut::<DirectionsOutbox>().drain();
        for request in requests {
            let outcome = self.oracle.fetch(&request);
            self.world
                .resource_mut::<EventQueue>()
                .push(ConsoleEvent::DirectionsResolved {
                    token: request.token,
                    outcome,
                });
        }
        run_until_empty(&mut self.world, &mut self.schedule, MAX_STEPS_PER_PUMP);
    }

    fn push_and_run(&mut self, event: ConsoleEvent) {
        self.world.resource_mut::<EventQueue>().push(event);
        run_until_empty(&mut self.world, &mut self.schedule, MAX_STEPS_PER_PUMP);
    }

    fn drain_notices(&mut self) -> Vec<ConsoleNotice> {
        self.world.resource_mut::<Notices>().drain()
    }
}
