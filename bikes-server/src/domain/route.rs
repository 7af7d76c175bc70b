//! Walking route estimates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::StationId;

/// A walking-time estimate from the user's location to one station.
///
/// At most one estimate exists per station; a newer successful estimate
/// replaces the old one outright.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEstimate {
    pub station_id: StationId,
    pub travel_time_minutes: u32,
    pub computed_at: DateTime<Utc>,
}

impl RouteEstimate {
    pub fn new(station_id: StationId, travel_time_minutes: u32, computed_at: DateTime<Utc>) -> Self {
        Self {
            station_id,
            travel_time_minutes,
            computed_at,
        }
    }
}
