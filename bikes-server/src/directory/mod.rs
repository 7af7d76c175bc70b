//! Station directory: the remote source of nearby stations.
//!
//! The orchestrator talks to any [`StationDirectory`]. Three are provided:
//! an HTTP client for the real backend, a file-backed mock for development
//! without the backend, and a caching wrapper around either.

mod cache;
mod client;
mod error;
mod mock;

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::domain::{Coordinate, Station};

pub use cache::{CachedStationDirectory, DirectoryCacheConfig};
pub use client::{HttpStationDirectory, StationDirectoryConfig, StationsResponse};
pub use error::{GENERIC_FETCH_ERROR, StationFetchError};
pub use mock::MockStationDirectory;

/// Stations near a coordinate, as of `fetched_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct StationSnapshot {
    pub stations: Vec<Station>,
    pub fetched_at: DateTime<Utc>,
}

/// A source of station snapshots.
pub trait StationDirectory: Send + Sync + 'static {
    /// Fetch the stations near `near`.
    fn fetch(
        &self,
        near: Coordinate,
    ) -> impl Future<Output = Result<StationSnapshot, StationFetchError>> + Send;

    /// Forget anything remembered from earlier fetches, so the next fetch
    /// goes to the source. Called when the user explicitly asks to refresh.
    fn invalidate(&self) {}
}
