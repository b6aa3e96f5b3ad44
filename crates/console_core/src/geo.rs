//! Geographic primitives shared by the reconciler and the composer.

use serde::{Deserialize, Serialize};

/// A WGS84 coordinate. Latitude/longitude in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Both components are finite numbers (rejects NaN and ±inf).
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Fixed-precision `"lat, lng"` string with 5 decimal digits, the
    /// format handed back by route confirmation.
    pub fn coordinate_string(&self) -> String {
        format!("{:.5}, {:.5}", self.lat, self.lng)
    }
}

/// Axis-aligned bounding box over a set of coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// Tight bounding box around `points`. Returns `None` for an empty set.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a GeoPoint>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = Self {
            min_lat: first.lat,
            max_lat: first.lat,
            min_lng: first.lng,
            max_lng: first.lng,
        };
        for point in iter {
            bbox.min_lat = bbox.min_lat.min(point.lat);
            bbox.max_lat = bbox.max_lat.max(point.lat);
            bbox.min_lng = bbox.min_lng.min(point.lng);
            bbox.max_lng = bbox.max_lng.max(point.lng);
        }
        Some(bbox)
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lat >= self.min_lat
            && point.lat <= self.max_lat
            && point.lng >= self.min_lng
            && point.lng <= self.max_lng
    }
}
