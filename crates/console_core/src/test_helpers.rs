//! Test helpers: recording fakes for the capability interfaces and
//! canonical coordinates, shared across test files.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::channel::{FeedError, FeedPoll, FeedSubscription, PositionFeed, PositionRecord};
use crate::directions::{
    DirectionsError, DirectionsOracle, DirectionsRequest, DirectionsRoute,
};
use crate::geo::{BoundingBox, GeoPoint};
use crate::map::{MapSurface, MarkerHandle, MarkerStyle};

/// Canonical map center used across test files (Valdivia).
pub fn valdivia() -> GeoPoint {
    GeoPoint::new(-39.81289, -73.24402)
}

/// Canonical route origin used across test files.
pub fn route_origin() -> GeoPoint {
    GeoPoint::new(-39.814, -73.245)
}

/// Canonical route destination used across test files.
pub fn route_destination() -> GeoPoint {
    GeoPoint::new(-39.8, -73.23)
}

/// A valid position record for the given vehicle.
pub fn position_record(vehicle_id: &str, lat: f64, lng: f64) -> PositionRecord {
    PositionRecord {
        vehicle_id: Some(vehicle_id.to_string()),
        lat,
        lng,
    }
}

// ---------------------------------------------------------------------------
// Recording map surface
// ---------------------------------------------------------------------------

/// One marker as last seen by the recording surface.
#[derive(Debug, Clone)]
pub struct RecordedMarker {
    pub point: GeoPoint,
    pub style: MarkerStyle,
    pub label: String,
}

#[derive(Debug, Default)]
struct SurfaceLog {
    next_handle: u64,
    markers: HashMap<u64, RecordedMarker>,
    overlay: Option<Vec<GeoPoint>>,
    overlay_replacements: u64,
    fits: Vec<(BoundingBox, f64)>,
    removed: Vec<u64>,
}

/// Map surface fake that records every call. Clones share the same
/// log, so tests keep a handle to inspect after handing a clone to a
/// session.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    log: Arc<Mutex<SurfaceLog>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn marker_count(&self) -> usize {
        self.log.lock().expect("surface log").markers.len()
    }

    pub fn marker(&self, handle: MarkerHandle) -> Option<RecordedMarker> {
        self.log
            .lock()
            .expect("surface log")
            .markers
            .get(&handle.0)
            .cloned()
    }

    /// The marker with the given label, if exactly one exists.
    pub fn marker_labeled(&self, label: &str) -> Option<RecordedMarker> {
        let log = self.log.lock().expect("surface log");
        let mut found: Option<RecordedMarker> = None;
        for marker in log.markers.values() {
            if marker.label == label {
                if found.is_some() {
                    return None;
                }
                found = Some(marker.clone());
            }
        }
        found
    }

    pub fn overlay(&self) -> Option<Vec<GeoPoint>> {
        self.log.lock().expect("surface log").overlay.clone()
    }

    pub fn overlay_replacements(&self) -> u64 {
        self.log.lock().expect("surface log").overlay_replacements
    }

    pub fn fits(&self) -> Vec<(BoundingBox, f64)> {
        self.log.lock().expect("surface log").fits.clone()
    }

    pub fn removed_count(&self) -> usize {
        self.log.lock().expect("surface log").removed.len()
    }
}

impl MapSurface for RecordingSurface {
    fn add_marker(&mut self, point: GeoPoint, style: MarkerStyle, label: &str) -> MarkerHandle {
        let mut log = self.log.lock().expect("surface log");
        log.next_handle += 1;
        let handle = log.next_handle;
        log.markers.insert(
            handle,
            RecordedMarker {
                point,
                style,
                label: label.to_string(),
            },
        );
        MarkerHandle(handle)
    }

    fn move_marker(&mut self, handle: MarkerHandle, point: GeoPoint) {
        let mut log = self.log.lock().expect("surface log");
        if let Some(marker) = log.markers.get_mut(&handle.0) {
            marker.point = point;
        }
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        let mut log = self.log.lock().expect("surface log");
        log.markers.remove(&handle.0);
        log.removed.push(handle.0);
    }

    fn set_route_overlay(&mut self, geometry: &[GeoPoint]) {
        let mut log = self.log.lock().expect("surface log");
        log.overlay = Some(geometry.to_vec());
        log.overlay_replacements += 1;
    }

    fn clear_route_overlay(&mut self) {
        self.log.lock().expect("surface log").overlay = None;
    }

    fn fit_bounds(&mut self, bounds: BoundingBox, padding: f64) {
        self.log
            .lock()
            .expect("surface log")
            .fits
            .push((bounds, padding));
    }
}

// ---------------------------------------------------------------------------
// Scripted position feed
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct FeedState {
    queue: VecDeque<FeedPoll>,
    subscribed_channel: Option<String>,
    subscribe_count: u32,
    closed: bool,
}

/// Position feed fake driven by a script of polls. Clones share state,
/// so tests can keep pushing deliveries after the dashboard opens.
#[derive(Debug, Clone, Default)]
pub struct ScriptedFeed {
    state: Arc<Mutex<FeedState>>,
}

impl ScriptedFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, poll: FeedPoll) {
        self.state.lock().expect("feed state").queue.push_back(poll);
    }

    pub fn push_insert(&self, vehicle_id: &str, lat: f64, lng: f64) {
        self.push(FeedPoll::Insert(position_record(vehicle_id, lat, lng)));
    }

    pub fn subscribed_channel(&self) -> Option<String> {
        self.state
            .lock()
            .expect("feed state")
            .subscribed_channel
            .clone()
    }

    pub fn subscribe_count(&self) -> u32 {
        self.state.lock().expect("feed state").subscribe_count
    }

    /// True once the subscription has been released.
    pub fn is_closed(&self) -> bool {
        self.state.lock().expect("feed state").closed
    }
}

impl PositionFeed for ScriptedFeed {
    fn subscribe(&mut self, channel: &str) -> Result<Box<dyn FeedSubscription>, FeedError> {
        let mut state = self.state.lock().expect("feed state");
        state.subscribed_channel = Some(channel.to_string());
        state.subscribe_count += 1;
        state.closed = false;
        Ok(Box::new(ScriptedSubscription {
            state: Arc::clone(&self.state),
        }))
    }
}

struct ScriptedSubscription {
    state: Arc<Mutex<FeedState>>,
}

impl FeedSubscription for ScriptedSubscription {
    fn poll(&mut self) -> FeedPoll {
        let mut state = self.state.lock().expect("feed state");
        if state.closed {
            return FeedPoll::Closed;
        }
        state.queue.pop_front().unwrap_or(FeedPoll::Empty)
    }

    fn close(&mut self) {
        self.state.lock().expect("feed state").closed = true;
    }
}

// ---------------------------------------------------------------------------
// Stub directions oracle
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct OracleState {
    responses: VecDeque<Result<DirectionsRoute, DirectionsError>>,
    requests: Vec<DirectionsRequest>,
}

/// Directions oracle fake: records every request and replays scripted
/// outcomes. With no outcome queued it answers with a straight
/// two-point route (1000 m, 60 s).
#[derive(Debug, Clone, Default)]
pub struct StubOracle {
    state: Arc<Mutex<OracleState>>,
}

impl StubOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, outcome: Result<DirectionsRoute, DirectionsError>) {
        self.state
            .lock()
            .expect("oracle state")
            .responses
            .push_back(outcome);
    }

    pub fn enqueue_route(&self, geometry: Vec<GeoPoint>, distance_m: f64, duration_s: f64) {
        self.enqueue(Ok(DirectionsRoute {
            geometry,
            distance_m,
            duration_s,
        }));
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().expect("oracle state").requests.len()
    }

    pub fn requests(&self) -> Vec<DirectionsRequest> {
        self.state.lock().expect("oracle state").requests.clone()
    }
}

impl DirectionsOracle for StubOracle {
    fn fetch(&self, request: &DirectionsRequest) -> Result<DirectionsRoute, DirectionsError> {
        let mut state = self.state.lock().expect("oracle state");
        state.requests.push(*request);
        state.responses.pop_front().unwrap_or_else(|| {
            Ok(DirectionsRoute {
                geometry: vec![request.origin, request.destination],
                distance_m: 1000.0,
                duration_s: 60.0,
            })
        })
    }
}
