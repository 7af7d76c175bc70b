//! Mock station directory for running without a backend.
//!
//! Loads a station snapshot from a JSON file (same shape as the
//! `/stations` response) and serves it for every coordinate.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::Utc;

use crate::domain::{Coordinate, Station};

use super::client::StationsResponse;
use super::error::StationFetchError;
use super::{StationDirectory, StationSnapshot};

/// Mock directory that serves a fixed list of stations.
///
/// The snapshot is re-stamped with the current time on each fetch so the
/// "last updated" display behaves as it would against live data.
#[derive(Clone)]
pub struct MockStationDirectory {
    stations: Arc<Vec<Station>>,
    calls: Arc<AtomicUsize>,
}

impl MockStationDirectory {
    /// Create a mock serving `stations`.
    pub fn new(stations: Vec<Station>) -> Self {
        Self {
            stations: Arc::new(stations),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Load stations from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StationFetchError> {
        Ok(Self::new(read_stations(path.as_ref())?))
    }

    /// Number of fetches served so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

fn read_stations(path: &Path) -> Result<Vec<Station>, StationFetchError> {
    let json = std::fs::read_to_string(path).map_err(|e| {
        StationFetchError::UnknownError(format!("failed to read {}: {}", path.display(), e))
    })?;

    let parsed: StationsResponse =
        serde_json::from_str(&json).map_err(|e| StationFetchError::Decode {
            message: format!("{}: {}", path.display(), e),
        })?;

    Ok(parsed.stations)
}

impl StationDirectory for MockStationDirectory {
    async fn fetch(&self, _near: Coordinate) -> Result<StationSnapshot, StationFetchError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let stations = Vec::clone(&self.stations);

        Ok(StationSnapshot {
            stations,
            fetched_at: Utc::now(),
        })
    }
}
