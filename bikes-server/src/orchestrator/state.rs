//! Observable application state.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::directory::StationSnapshot;
use crate::domain::{Coordinate, RouteEstimate, Station, StationId};

use super::label::last_updated_label;

/// Where the orchestrator is in its refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No location has been acquired yet.
    #[default]
    Idle,
    /// A station fetch is in flight.
    Fetching,
    /// Stations are loaded; estimates may still be arriving.
    Ready,
    /// The last station fetch failed. Earlier data is kept.
    Error,
}

/// Outcome of the most recent station fetches.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RefreshState {
    pub last_fetched_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// One station joined with its walking estimate, if any.
#[derive(Debug, Clone, Copy)]
pub struct StationEntry<'a> {
    pub station: &'a Station,
    pub route: Option<&'a RouteEstimate>,
}

/// Everything presentation needs, as one consistent snapshot.
///
/// Snapshots are immutable once published; the orchestrator builds the next
/// one and swaps it in whole.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub phase: Phase,

    /// Most recent device location, cleared by reset.
    pub location: Option<Coordinate>,

    /// Whether the location feed is in a user-visible failure state.
    pub location_failed: bool,

    /// Stations from the last successful fetch, in directory order.
    pub stations: Vec<Station>,

    /// Walking estimates keyed by station.
    pub routes: HashMap<StationId, RouteEstimate>,

    pub refresh: RefreshState,

    /// Counter bumped each time a station fetch starts.
    pub generation: u64,

    /// Generation of the fetch that produced `stations`. Estimates are
    /// matched against this, so a refresh that is still in flight or has
    /// failed does not invalidate estimates for the list on screen.
    pub list_generation: u64,
}

impl AppState {
    /// Message from the last failed fetch, cleared by the next success.
    pub fn fetch_error(&self) -> Option<&str> {
        self.refresh.last_error.as_deref()
    }

    /// Walking estimate for a station.
    pub fn route_for(&self, id: &StationId) -> Option<&RouteEstimate> {
        self.routes.get(id)
    }

    /// Whether `id` is in the current station list.
    pub fn has_station(&self, id: &StationId) -> bool {
        self.stations.iter().any(|s| &s.id == id)
    }

    /// Stations in directory order with their estimates.
    pub fn entries(&self) -> impl Iterator<Item = StationEntry<'_>> {
        self.stations.iter().map(|station| StationEntry {
            station,
            route: self.routes.get(&station.id),
        })
    }

    /// "Updated 12s ago"-style text, or `None` before the first fetch.
    pub fn last_updated_label(&self, now: DateTime<Utc>) -> Option<String> {
        self.refresh
            .last_fetched_at
            .map(|fetched_at| last_updated_label(fetched_at, now))
    }

    /// Replace the station list with a fresh snapshot.
    pub(crate) fn apply_snapshot(&mut self, snapshot: StationSnapshot, purge_stale_routes: bool) {
        self.stations = snapshot.stations;
        self.refresh.last_fetched_at = Some(snapshot.fetched_at);
        self.refresh.last_error = None;

        if purge_stale_routes {
            let current: HashSet<&StationId> = self.stations.iter().map(|s| &s.id).collect();
            self.routes.retain(|id, _| current.contains(id));
        }
    }

    /// Insert or replace the estimate for a station.
    pub(crate) fn upsert_route(&mut self, estimate: RouteEstimate) {
        self.routes.insert(estimate.station_id.clone(), estimate);
    }
}
