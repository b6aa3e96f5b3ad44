//! Directions oracle: trait abstraction for the external service that
//! turns an ordered point pair into road geometry plus travel metrics.
//!
//! Two implementations ship with the crate:
//!
//! - **[`mapbox::MapboxDirections`]** (feature `mapbox`): calls the
//!   Mapbox Directions HTTP API with the driving profile.
//! - **[`CachedDirections`]**: LRU wrapper around any oracle, keyed by
//!   the quantized waypoint pair.
//!
//! Requests carry a monotonically increasing generation token assigned
//! by the composer; a completion is applied only if its token matches
//! the composer's current token, which is how superseded in-flight
//! requests are discarded.

use std::fmt;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// Travel profile requested from the oracle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TravelProfile {
    #[default]
    Driving,
    Walking,
    Cycling,
}

impl TravelProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelProfile::Driving => "driving",
            TravelProfile::Walking => "walking",
            TravelProfile::Cycling => "cycling",
        }
    }
}

/// One directions request for an ordered origin→destination pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionsRequest {
    /// Generation token; higher tokens supersede lower ones.
    pub token: u64,
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    pub profile: TravelProfile,
}

/// The first route candidate returned by the oracle.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsRoute {
    /// Full step geometry, ordered origin→destination.
    pub geometry: Vec<GeoPoint>,
    /// Road distance in metres.
    pub distance_m: f64,
    /// Travel time in seconds.
    pub duration_s: f64,
}

/// Errors from a directions request. Variants carry strings rather
/// than transport errors so completions stay `Clone` through the event
/// queue.
#[derive(Debug, Clone, PartialEq)]
pub enum DirectionsError {
    Http(String),
    Decode(String),
    Api(String),
    NoRoute,
}

impl fmt::Display for DirectionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectionsError::Http(reason) => write!(f, "directions request failed: {}", reason),
            DirectionsError::Decode(reason) => {
                write!(f, "directions response malformed: {}", reason)
            }
            DirectionsError::Api(code) => write!(f, "directions API error: {}", code),
            DirectionsError::NoRoute => write!(f, "no route between the selected points"),
        }
    }
}

impl std::error::Error for DirectionsError {}

/// Trait for directions backends. Implementations must be `Send + Sync`
/// so the oracle can be shared with the hosting session.
pub trait DirectionsOracle: Send + Sync {
    /// Fetch a route for the request's point pair and profile.
    fn fetch(&self, request: &DirectionsRequest) -> Result<DirectionsRoute, DirectionsError>;
}

/// Outbound queue of issued requests, drained by the hosting session.
/// The composer pushes at most one request per waypoint change; the
/// session dispatches each to the oracle and feeds the completion back
/// as a `DirectionsResolved` event.
#[derive(Debug, Default, Resource)]
pub struct DirectionsOutbox {
    pending: Vec<DirectionsRequest>,
}

impl DirectionsOutbox {
    pub fn push(&mut self, request: DirectionsRequest) {
        self.pending.push(request);
    }

    pub fn drain(&mut self) -> Vec<DirectionsRequest> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Caching wrapper
// ---------------------------------------------------------------------------

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

/// Coordinates quantized to ~0.1 m so float noise doesn't defeat the cache.
fn quantize(point: GeoPoint) -> (i64, i64) {
    ((point.lat * 1e6).round() as i64, (point.lng * 1e6).round() as i64)
}

type CacheKey = ((i64, i64), (i64, i64), TravelProfile);

/// LRU-cached wrapper around any [`DirectionsOracle`].
///
/// The pair key is directional. Errors are not cached, so a transient
/// failure does not poison a waypoint pair.
pub struct CachedDirections {
    inner: Box<dyn DirectionsOracle>,
    cache: Mutex<LruCache<CacheKey, DirectionsRoute>>,
}

impl CachedDirections {
    pub fn new(inner: Box<dyn DirectionsOracle>, capacity: usize) -> Self {
        Self {
            inner,
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity.max(1)).expect("cache capacity must be > 0"),
            )),
        }
    }
}

impl DirectionsOracle for CachedDirections {
    fn fetch(&self, request: &DirectionsRequest) -> Result<DirectionsRoute, DirectionsError> {
        let key = (
            quantize(request.origin),
            quantize(request.destination),
            request.profile,
        );

        if let Ok(mut cache) = self.cache.lock() {
            if let Some(cached) = cache.get(&key) {
                return Ok(cached.clone());
            }
        }

        let route = self.inner.fetch(request)?;

        if let Ok(mut cache) = self.cache.lock() {
            cache.put(key, route.clone());
        }
        Ok(route)
    }
}

// ---------------------------------------------------------------------------
// Mapbox Directions client (behind `mapbox` feature)
// ---------------------------------------------------------------------------

#[cfg(feature = "mapbox")]
pub mod mapbox {
    use super::*;
    use reqwest::blocking::Client;
    use std::time::Duration;

    /// Bounds a hung directions call; a timeout surfaces as
    /// [`DirectionsError::Http`] so the composer's busy flag clears.
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

    /// Routes via the Mapbox Directions HTTP API.
    pub struct MapboxDirections {
        client: Client,
        endpoint: String,
        access_token: String,
    }

    impl MapboxDirections {
        /// Create a client for the given endpoint (e.g. `https://api.mapbox.com`).
        pub fn new(endpoint: &str, access_token: &str) -> Self {
            let client = Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("failed to build directions client");
            Self {
                client,
                endpoint: endpoint.trim_end_matches('/').to_string(),
                access_token: access_token.to_string(),
            }
        }
    }

    /// Minimal Mapbox Directions JSON response structures.
    #[derive(Deserialize)]
    pub(super) struct DirectionsResponse {
        pub(super) code: String,
        pub(super) routes: Option<Vec<RouteBody>>,
    }

    #[derive(Deserialize)]
    pub(super) struct RouteBody {
        pub(super) distance: f64, // metres
        pub(super) duration: f64, // seconds
        pub(super) geometry: RouteGeometry,
    }

    #[derive(Deserialize)]
    pub(super) struct RouteGeometry {
        pub(super) coordinates: Vec<[f64; 2]>, // [lng, lat]
    }

    /// Extract the first route candidate from a decoded response.
    pub(super) fn parse_directions_response(
        resp: DirectionsResponse,
    ) -> Result<DirectionsRoute, DirectionsError> {
        if resp.code != "Ok" {
            return Err(DirectionsError::Api(resp.code));
        }

        let route = resp
            .routes
            .and_then(|routes| routes.into_iter().next())
            .ok_or(DirectionsError::NoRoute)?;

        let geometry: Vec<GeoPoint> = route
            .geometry
            .coordinates
            .iter()
            .map(|c| GeoPoint::new(c[1], c[0])) // API returns [lng, lat]
            .collect();

        Ok(DirectionsRoute {
            geometry,
            distance_m: route.distance,
            duration_s: route.duration,
        })
    }

    impl DirectionsOracle for MapboxDirections {
        fn fetch(&self, request: &DirectionsRequest) -> Result<DirectionsRoute, DirectionsError> {
            let url = format!(
                "{}/directions/v5/mapbox/{}/{},{};{},{}?steps=true&geometries=geojson&access_token={}",
                self.endpoint,
                request.profile.as_str(),
                request.origin.lng,
                request.origin.lat,
                request.destination.lng,
                request.destination.lat,
                self.access_token,
            );

            let response = self
                .client
                .get(&url)
                .send()
                .map_err(|err| DirectionsError::Http(err.to_string()))?;

            let parsed: DirectionsResponse = response
                .json()
                .map_err(|err| DirectionsError::Decode(err.to_string()))?;

            let route = parse_directions_response(parsed)?;
            tracing::debug!(
                token = request.token,
                distance_m = route.distance_m,
                duration_s = route.duration_s,
                "directions resolved"
            );
            Ok(route)
        }
    }

}
