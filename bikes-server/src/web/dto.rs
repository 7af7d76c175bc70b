//! Data transfer objects for web requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{BatteryLevel, Bike, Coordinate, InvalidCoordinate};
use crate::location::{LocationErrorKind, LocationUpdate};
use crate::orchestrator::{AppState, Phase, StationEntry};

/// Default number of bikes listed per station.
pub const DEFAULT_MAX_BIKES: usize = 5;

/// Query parameters for the state endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct StateQuery {
    /// How many bikes to list per station (defaults to 5)
    pub max_bikes: Option<usize>,
}

/// Everything the app screen shows.
#[derive(Debug, Serialize)]
pub struct StateResponse {
    /// "idle", "fetching", "ready" or "error"
    pub phase: &'static str,

    /// Whether location is denied or unavailable
    pub location_failed: bool,

    /// Message from the last failed station fetch
    pub fetch_error: Option<String>,

    /// e.g. "Updated 12s ago"
    pub last_updated: Option<String>,

    /// Stations in directory order
    pub stations: Vec<StationResult>,
}

/// A station in the state response.
#[derive(Debug, Serialize)]
pub struct StationResult {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,

    /// Total bikes docked
    pub bike_count: usize,

    /// The first few docked bikes
    pub bikes: Vec<BikeResult>,

    /// Walking time, absent while unknown or unavailable
    pub walk_minutes: Option<u32>,
}

/// A bike in the state response.
#[derive(Debug, Serialize)]
pub struct BikeResult {
    pub battery: BatteryLevel,
    pub range: String,
}

/// A location report from the device.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LocationReport {
    Fix { latitude: f64, longitude: f64 },
    Failure { error: LocationFailure },
}

/// Why the device has no location.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationFailure {
    Denied,
    Unavailable,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

// Conversion implementations

impl StateResponse {
    /// Build the response for `state` as of `now`.
    pub fn from_state(state: &AppState, now: DateTime<Utc>, max_bikes: usize) -> Self {
        Self {
            phase: phase_name(state.phase),
            location_failed: state.location_failed,
            fetch_error: state.fetch_error().map(str::to_string),
            last_updated: state.last_updated_label(now),
            stations: state
                .entries()
                .map(|entry| StationResult::from_entry(entry, max_bikes))
                .collect(),
        }
    }
}

fn phase_name(phase: Phase) -> &'static str {
    match phase {
        Phase::Idle => "idle",
        Phase::Fetching => "fetching",
        Phase::Ready => "ready",
        Phase::Error => "error",
    }
}

impl StationResult {
    fn from_entry(entry: StationEntry<'_>, max_bikes: usize) -> Self {
        let station = entry.station;
        Self {
            id: station.id.to_string(),
            name: station.name.clone(),
            latitude: station.coordinate.latitude(),
            longitude: station.coordinate.longitude(),
            bike_count: station.bike_count(),
            bikes: station
                .leading_bikes(max_bikes)
                .iter()
                .map(BikeResult::from)
                .collect(),
            walk_minutes: entry.route.map(|r| r.travel_time_minutes),
        }
    }
}

impl From<&Bike> for BikeResult {
    fn from(bike: &Bike) -> Self {
        Self {
            battery: bike.battery_level,
            range: bike.range_description.clone(),
        }
    }
}

impl LocationReport {
    /// Convert to a location feed event.
    pub fn into_update(self) -> Result<LocationUpdate, InvalidCoordinate> {
        match self {
            LocationReport::Fix {
                latitude,
                longitude,
            } => Ok(Ok(Coordinate::new(latitude, longitude)?)),
            LocationReport::Failure {
                error: LocationFailure::Denied,
            } => Ok(Err(LocationErrorKind::Denied)),
            LocationReport::Failure {
                error: LocationFailure::Unavailable,
            } => Ok(Err(LocationErrorKind::TransientError)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::StationSnapshot;
    use crate::domain::{RouteEstimate, Station, StationId};
    use chrono::TimeZone;

    #[test]
    fn location_report_fix() {
        let report: LocationReport =
            serde_json::from_str(r#"{"latitude": 40.72, "longitude": -73.95}"#).unwrap();
        assert_eq!(
            report.into_update().unwrap(),
            Ok(Coordinate::new(40.72, -73.95).unwrap())
        );
    }

    #[test]
    fn location_report_failures() {
        let denied: LocationReport = serde_json::from_str(r#"{"error": "denied"}"#).unwrap();
        assert_eq!(
            denied.into_update().unwrap(),
            Err(LocationErrorKind::Denied)
        );

        let unavailable: LocationReport =
            serde_json::from_str(r#"{"error": "unavailable"}"#).unwrap();
        assert_eq!(
            unavailable.into_update().unwrap(),
            Err(LocationErrorKind::TransientError)
        );
    }

    #[test]
    fn location_report_out_of_range() {
        let report: LocationReport =
            serde_json::from_str(r#"{"latitude": 95.0, "longitude": 0.0}"#).unwrap();
        assert!(report.into_update().is_err());
    }

    #[test]
    fn state_response_joins_routes_and_caps_bikes() {
        let fetched_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut station = Station::new(
            StationId::parse("a").unwrap(),
            "Bedford Ave & N 7 St",
            Coordinate::new(40.72, -73.95).unwrap(),
        );
        for i in 0..7 {
            station = station.with_bike(BatteryLevel::Full, format!("{} mi", 30 + i));
        }
        let other = Station::new(
            StationId::parse("b").unwrap(),
            "Wythe Ave",
            Coordinate::new(40.71, -73.96).unwrap(),
        );

        let mut state = AppState::default();
        state.apply_snapshot(
            StationSnapshot {
                stations: vec![station, other],
                fetched_at,
            },
            true,
        );
        state.upsert_route(RouteEstimate::new(
            StationId::parse("a").unwrap(),
            6,
            fetched_at,
        ));
        state.phase = Phase::Ready;

        let now = fetched_at + chrono::Duration::seconds(90);
        let response = StateResponse::from_state(&state, now, DEFAULT_MAX_BIKES);

        assert_eq!(response.phase, "ready");
        assert_eq!(response.last_updated.as_deref(), Some("Updated 1m ago"));
        assert_eq!(response.stations.len(), 2);
        assert_eq!(response.stations[0].bike_count, 7);
        assert_eq!(response.stations[0].bikes.len(), 5);
        assert_eq!(response.stations[0].bikes[0].range, "30 mi");
        assert_eq!(response.stations[0].walk_minutes, Some(6));
        assert_eq!(response.stations[1].walk_minutes, None);
    }
}
