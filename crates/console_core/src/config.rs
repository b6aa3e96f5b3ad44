//! Console configuration: initial viewport, channel naming, and the
//! route-composition knobs shared with the hosting view.

use serde::{Deserialize, Serialize};

use crate::directions::TravelProfile;
use crate::geo::GeoPoint;

/// Default viewport: Valdivia, Chile.
const DEFAULT_CENTER_LAT: f64 = -39.81289;
const DEFAULT_CENTER_LNG: f64 = -73.24402;
const DEFAULT_ZOOM: f64 = 12.0;

/// Camera padding (px) when fitting a route's bounding box.
const DEFAULT_FIT_PADDING: f64 = 80.0;

/// Settings for one console session. The hosting view reads the
/// viewport fields when creating the map; the sessions read the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Initial map center handed to the rendering surface.
    pub initial_center: GeoPoint,
    /// Initial zoom level handed to the rendering surface.
    pub initial_zoom: f64,
    /// Named channel the dashboard subscribes to for position inserts.
    pub channel: String,
    /// Label for the fixed depot marker placed at the center.
    pub depot_label: String,
    /// Camera padding when fitting route geometry.
    pub fit_padding: f64,
    /// Travel profile for directions requests.
    pub profile: TravelProfile,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            initial_center: GeoPoint::new(DEFAULT_CENTER_LAT, DEFAULT_CENTER_LNG),
            initial_zoom: DEFAULT_ZOOM,
            channel: "fleet-dashboard".to_string(),
            depot_label: "Depot".to_string(),
            fit_padding: DEFAULT_FIT_PADDING,
            profile: TravelProfile::Driving,
        }
    }
}

impl ConsoleConfig {
    pub fn with_channel(mut self, channel: &str) -> Self {
        self.channel = channel.to_string();
        self
    }

    pub fn with_center(mut self, center: GeoPoint, zoom: f64) -> Self {
        self.initial_center = center;
        self.initial_zoom = zoom;
        self
    }

    pub fn with_fit_padding(mut self, padding: f64) -> Self {
        self.fit_padding = padding;
        self
    }
}
