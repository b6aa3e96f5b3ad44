//! Drive both console sessions against scripted collaborators and
//! print the resulting telemetry.
//!
//! Run with: cargo run -p console_core --example console_run

use console_core::composer::Role;
use console_core::config::ConsoleConfig;
use console_core::geo::GeoPoint;
use console_core::session::{FleetDashboard, RouteEditor};
use console_core::test_helpers::{RecordingSurface, ScriptedFeed, StubOracle};

fn main() {
    const NUM_VEHICLES: usize = 20;
    const NUM_UPDATES: usize = 500;

    // --- Fleet dashboard: fold a scripted position stream ---
    let surface = RecordingSurface::new();
    let mut feed = ScriptedFeed::new();
    let mut dashboard = match FleetDashboard::open(
        ConsoleConfig::default().with_channel("bus-positions"),
        Box::new(surface.clone()),
        &mut feed,
    ) {
        Ok(dashboard) => dashboard,
        Err(err) => {
            eprintln!("failed to open dashboard: {}", err);
            return;
        }
    };
    dashboard.surface_ready();

    for i in 0..NUM_UPDATES {
        let vehicle = format!("B{}", i % NUM_VEHICLES);
        let lat = -39.81 + (i % 50) as f64 * 2e-4;
        let lng = -73.24 - (i % 50) as f64 * 2e-4;
        feed.push_insert(&vehicle, lat, lng);
    }
    let notices = dashboard.pump();

    let telemetry = dashboard.telemetry();
    println!(
        "--- Dashboard ({} vehicles, {} updates) ---",
        NUM_VEHICLES, NUM_UPDATES
    );
    println!("Markers on map:    {}", dashboard.marker_count());
    println!("Positions applied: {}", telemetry.positions_applied);
    println!("Markers created:   {}", telemetry.markers_created);
    println!("Malformed dropped: {}", telemetry.malformed_dropped);
    println!("Notices raised:    {}", notices.len());
    dashboard.stop();

    // --- Route editor: select a pair and confirm ---
    let surface = RecordingSurface::new();
    let oracle = StubOracle::new();
    oracle.enqueue_route(
        vec![
            GeoPoint::new(-39.814, -73.245),
            GeoPoint::new(-39.807, -73.238),
            GeoPoint::new(-39.8, -73.23),
        ],
        4200.0,
        480.0,
    );
    let mut editor = RouteEditor::open(
        &ConsoleConfig::default(),
        Box::new(surface.clone()),
        Box::new(oracle),
    );
    editor.surface_ready();

    editor.activate(Role::Origin);
    editor.handle_click(GeoPoint::new(-39.814, -73.245));
    editor.activate(Role::Destination);
    editor.handle_click(GeoPoint::new(-39.8, -73.23));

    println!("\n--- Route editor ---");
    match editor.confirm() {
        Ok(selection) => {
            println!("Confirmed point:   {}", selection.coordinates);
            println!("Distance:          {:.1} km", selection.distance_km);
            println!("Duration:          {:.0} min", selection.duration_min);
            println!("Metrics fresh:     {}", selection.metrics_recomputed);
        }
        Err(err) => println!("Confirmation rejected: {}", err),
    }
}
