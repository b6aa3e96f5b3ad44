//! Live position channel: wire payloads, validation, and the
//! subscription capability consumed by the dashboard.
//!
//! The transport itself is an external collaborator; the console only
//! sees a named channel delivering row-insert payloads, fire-and-forget
//! and at-most-once. Subscriptions are released via [`FeedSubscription::close`],
//! which the session also invokes from `Drop` so release happens on
//! every exit path.

use std::fmt;

use serde::Deserialize;

use crate::geo::GeoPoint;

/// Raw row-insert payload as delivered by the channel. `vehicle_id` is
/// optional at the wire level; validation happens in [`VehiclePosition`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PositionRecord {
    #[serde(rename = "vehicleId")]
    pub vehicle_id: Option<String>,
    pub lat: f64,
    #[serde(rename = "lon")]
    pub lng: f64,
}

impl PositionRecord {
    /// Decode a JSON row-insert payload.
    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}

/// A validated vehicle position: non-empty id, finite coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct VehiclePosition {
    pub vehicle_id: String,
    pub point: GeoPoint,
}

/// Why a raw record was rejected. Malformed records are dropped
/// silently from the marker's perspective; only a telemetry counter
/// moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedPosition {
    MissingId,
    NonFiniteCoordinate,
}

impl TryFrom<PositionRecord> for VehiclePosition {
    type Error = MalformedPosition;

    fn try_from(record: PositionRecord) -> Result<Self, Self::Error> {
        let vehicle_id = match record.vehicle_id {
            Some(id) if !id.trim().is_empty() => id,
            _ => return Err(MalformedPosition::MissingId),
        };
        let point = GeoPoint::new(record.lat, record.lng);
        if !point.is_finite() {
            return Err(MalformedPosition::NonFiniteCoordinate);
        }
        Ok(Self { vehicle_id, point })
    }
}

/// One poll of a live subscription.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedPoll {
    /// A row was inserted on the subscribed channel.
    Insert(PositionRecord),
    /// Connectivity degraded; existing markers are kept.
    Degraded,
    /// Nothing pending right now.
    Empty,
    /// The channel closed; no further events will arrive.
    Closed,
}

/// Errors raised while establishing a subscription.
#[derive(Debug)]
pub enum FeedError {
    Connect(String),
    ChannelRejected(String),
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedError::Connect(reason) => write!(f, "feed connection failed: {}", reason),
            FeedError::ChannelRejected(channel) => {
                write!(f, "channel subscription rejected: {}", channel)
            }
        }
    }
}

impl std::error::Error for FeedError {}

/// Publish/subscribe source of position inserts.
pub trait PositionFeed {
    /// Subscribe to one named channel for the dashboard session.
    fn subscribe(&mut self, channel: &str) -> Result<Box<dyn FeedSubscription>, FeedError>;
}

/// A live subscription scoped to one dashboard session.
pub trait FeedSubscription: Send {
    /// Pull the next pending delivery, if any.
    fn poll(&mut self) -> FeedPoll;

    /// Release the subscription. Must be idempotent.
    fn close(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_row_insert_payload() {
        let record =
            PositionRecord::from_json(r#"{"vehicleId":"B1","lat":-39.81,"lon":-73.24}"#).unwrap();
        assert_eq!(record.vehicle_id.as_deref(), Some("B1"));
        assert_eq!(record.lat, -39.81);
        assert_eq!(record.lng, -73.24);
    }

    #[test]
    fn missing_id_is_malformed() {
        let record = PositionRecord {
            vehicle_id: None,
            lat: -39.81,
            lng: -73.24,
        };
        assert_eq!(
            VehiclePosition::try_from(record),
            Err(MalformedPosition::MissingId)
        );

        let blank = PositionRecord {
            vehicle_id: Some("  ".to_string()),
            lat: -39.81,
            lng: -73.24,
        };
        assert_eq!(
            VehiclePosition::try_from(blank),
            Err(MalformedPosition::MissingId)
        );
    }

    #[test]
    fn non_finite_coordinate_is_malformed() {
        let record = PositionRecord {
            vehicle_id: Some("B1".to_string()),
            lat: f64::NAN,
            lng: -73.24,
        };
        assert_eq!(
            VehiclePosition::try_from(record),
            Err(MalformedPosition::NonFiniteCoordinate)
        );
    }

    #[test]
    fn valid_record_converts() {
        let record = PositionRecord {
            vehicle_id: Some("B1".to_string()),
            lat: -39.81,
            lng: -73.24,
        };
        let position = VehiclePosition::try_from(record).unwrap();
        assert_eq!(position.vehicle_id, "B1");
        assert_eq!(position.point, GeoPoint::new(-39.81, -73.24));
    }
}
