use console_core::composer::{ComposeError, ComposerState, Role};
use console_core::config::ConsoleConfig;
use console_core::directions::DirectionsError;
use console_core::geo::GeoPoint;
use console_core::map::MarkerStyle;
use console_core::session::RouteEditor;
use console_core::telemetry::ConsoleNotice;
use console_core::test_helpers::{
    route_destination, route_origin, RecordingSurface, StubOracle,
};

fn open_editor(surface: &RecordingSurface, oracle: &StubOracle) -> RouteEditor {
    let mut editor = RouteEditor::open(
        &ConsoleConfig::default(),
        Box::new(surface.clone()),
        Box::new(oracle.clone()),
    );
    editor.surface_ready();
    editor
}

#[test]
fn full_selection_flow_confirms_the_destination() {
    let surface = RecordingSurface::new();
    let oracle = StubOracle::new();
    oracle.enqueue_route(
        vec![route_origin(), GeoPoint::new(-39.807, -73.238), route_destination()],
        4200.0,
        480.0,
    );
    let mut editor = open_editor(&surface, &oracle);

    editor.activate(Role::Origin);
    assert_eq!(editor.state(), ComposerState::AwaitingClick(Role::Origin));
    editor.handle_click(route_origin());
    let origin = surface.marker_labeled("Origin").expect("origin marker");
    assert_eq!(origin.style, MarkerStyle::Origin);
    assert_eq!(oracle.request_count(), 0, "one waypoint is not enough");

    editor.activate(Role::Destination);
    editor.handle_click(route_destination());

    // The stub oracle answers synchronously, so the response has
    // already been applied by the time handle_click returns.
    assert_eq!(oracle.request_count(), 1);
    assert_eq!(editor.state(), ComposerState::Ready);
    let metrics = editor.metrics().expect("metrics");
    assert!((metrics.distance_km - 4.2).abs() < 1e-9);
    assert!((metrics.duration_min - 8.0).abs() < 1e-9);
    assert!(surface.overlay().is_some());
    assert_eq!(surface.fits().len(), 1);

    let selection = editor.confirm().expect("confirm");
    assert_eq!(selection.coordinates, "-39.80000, -73.23000");
    assert!((selection.distance_km - 4.2).abs() < 1e-9);
    assert!((selection.duration_min - 8.0).abs() < 1e-9);
    assert!(selection.metrics_recomputed);

    // Confirming closes the interaction.
    assert_eq!(surface.overlay(), None);
    assert_eq!(surface.marker_count(), 0);
    assert_eq!(editor.state(), ComposerState::Idle);
}

#[test]
fn confirm_before_any_click_is_rejected() {
    let surface = RecordingSurface::new();
    let oracle = StubOracle::new();
    let mut editor = open_editor(&surface, &oracle);

    assert_eq!(editor.confirm(), Err(ComposeError::NoPointSelected));

    editor.activate(Role::Origin);
    assert_eq!(editor.confirm(), Err(ComposeError::NoPointSelected));
}

#[test]
fn partial_confirmation_reports_stale_metrics() {
    let surface = RecordingSurface::new();
    let oracle = StubOracle::new();
    let mut editor = open_editor(&surface, &oracle);

    editor.activate(Role::Origin);
    editor.handle_click(route_origin());

    let selection = editor.confirm().expect("confirm");
    assert_eq!(selection.coordinates, "-39.81400, -73.24500");
    assert_eq!(selection.distance_km, 0.0);
    assert_eq!(selection.duration_min, 0.0);
    assert!(!selection.metrics_recomputed);
    assert_eq!(oracle.request_count(), 0);
}

#[test]
fn oracle_failure_raises_a_notice_and_allows_retry() {
    let surface = RecordingSurface::new();
    let oracle = StubOracle::new();
    oracle.enqueue(Err(DirectionsError::Http("gateway timeout".to_string())));
    let mut editor = open_editor(&surface, &oracle);

    editor.activate(Role::Origin);
    editor.handle_click(route_origin());
    editor.activate(Role::Destination);
    let notices = editor.handle_click(route_destination());

    assert!(matches!(notices[0], ConsoleNotice::RouteFailed(_)));
    assert!(!editor.is_busy());
    assert_eq!(editor.metrics(), None);
    assert_eq!(surface.overlay(), None);
    assert_eq!(
        editor.waypoint(Role::Destination),
        Some(route_destination()),
        "waypoints survive the failure"
    );

    // Re-placing the destination retries with the default route.
    editor.activate(Role::Destination);
    let notices = editor.handle_click(route_destination());
    assert!(notices.is_empty());
    assert_eq!(editor.state(), ComposerState::Ready);
    assert!(editor.metrics().is_some());
}

#[test]
fn close_removes_markers_and_overlay() {
    let surface = RecordingSurface::new();
    let oracle = StubOracle::new();
    let mut editor = open_editor(&surface, &oracle);

    editor.activate(Role::Origin);
    editor.handle_click(route_origin());
    editor.activate(Role::Destination);
    editor.handle_click(route_destination());
    assert_eq!(surface.marker_count(), 2);
    assert!(surface.overlay().is_some());

    editor.close();
    assert_eq!(surface.marker_count(), 0);
    assert_eq!(surface.overlay(), None);
    assert_eq!(editor.state(), ComposerState::Idle);
    assert_eq!(editor.waypoint(Role::Origin), None);
    assert_eq!(editor.metrics(), None);
}

#[test]
fn clicks_before_surface_ready_replay_on_ready() {
    let surface = RecordingSurface::new();
    let oracle = StubOracle::new();
    let mut editor = RouteEditor::open(
        &ConsoleConfig::default(),
        Box::new(surface.clone()),
        Box::new(oracle.clone()),
    );

    editor.activate(Role::Origin);
    editor.handle_click(route_origin());
    editor.activate(Role::Destination);
    editor.handle_click(route_destination());
    assert_eq!(surface.marker_count(), 0);
    assert_eq!(oracle.request_count(), 0);

    editor.surface_ready();
    assert_eq!(surface.marker_count(), 2);
    assert_eq!(oracle.request_count(), 1);
    assert_eq!(editor.state(), ComposerState::Ready);
}

#[test]
fn request_carries_the_configured_profile() {
    let surface = RecordingSurface::new();
    let oracle = StubOracle::new();
    let mut editor = open_editor(&surface, &oracle);

    editor.activate(Role::Origin);
    editor.handle_click(route_origin());
    editor.activate(Role::Destination);
    editor.handle_click(route_destination());

    let requests = oracle.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].origin, route_origin());
    assert_eq!(requests[0].destination, route_destination());
    assert_eq!(
        requests[0].profile,
        ConsoleConfig::default().profile
    );
}
