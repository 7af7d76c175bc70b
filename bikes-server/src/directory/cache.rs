//! Caching layer for station directory responses.
//!
//! Nearby-station lookups from the same few hundred metres return the same
//! stations, so snapshots are cached per grid cell. Grid bucketing bounds
//! cache cardinality while a short TTL keeps bike counts fresh.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::domain::Coordinate;

use super::error::StationFetchError;
use super::{StationDirectory, StationSnapshot};

/// Cache key: (latitude cell, longitude cell).
type CellKey = (i64, i64);

/// Configuration for the directory cache.
#[derive(Debug, Clone)]
pub struct DirectoryCacheConfig {
    /// TTL for cached snapshots.
    pub ttl: Duration,

    /// Maximum number of cached snapshots.
    pub max_capacity: u64,

    /// Grid cell size in degrees. 0.0025° is roughly 250 m of latitude.
    pub cell_degrees: f64,
}

impl Default for DirectoryCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_capacity: 1000,
            cell_degrees: 0.0025,
        }
    }
}

/// Station directory with caching.
///
/// Only successful snapshots are cached; a failure is passed straight
/// through and the next fetch tries the backend again.
pub struct CachedStationDirectory<D> {
    inner: D,
    snapshots: MokaCache<CellKey, Arc<StationSnapshot>>,
    cell_degrees: f64,
}

impl<D: StationDirectory> CachedStationDirectory<D> {
    /// Wrap `inner` with a cache.
    pub fn new(inner: D, config: &DirectoryCacheConfig) -> Self {
        let snapshots = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            inner,
            snapshots,
            cell_degrees: config.cell_degrees,
        }
    }

    /// Grid cell containing `c`.
    fn cell(&self, c: &Coordinate) -> CellKey {
        (
            (c.latitude() / self.cell_degrees).floor() as i64,
            (c.longitude() / self.cell_degrees).floor() as i64,
        )
    }

    /// Access the wrapped directory.
    pub fn inner(&self) -> &D {
        &self.inner
    }

}

impl<D: StationDirectory> StationDirectory for CachedStationDirectory<D> {
    async fn fetch(&self, near: Coordinate) -> Result<StationSnapshot, StationFetchError> {
        let key = self.cell(&near);

        if let Some(cached) = self.snapshots.get(&key).await {
            debug!(%near, "station snapshot cache hit");
            return Ok(StationSnapshot::clone(&cached));
        }

        let snapshot = self.inner.fetch(near).await?;
        self.snapshots
            .insert(key, Arc::new(snapshot.clone()))
            .await;

        Ok(snapshot)
    }

    fn invalidate(&self) {
        debug!("station snapshot cache invalidated");
        self.snapshots.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::MockStationDirectory;
    use crate::domain::{Station, StationId};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    fn cached_mock() -> CachedStationDirectory<MockStationDirectory> {
        let station = Station::new(StationId::parse("a").unwrap(), "A", coord(40.72, -73.95));
        CachedStationDirectory::new(
            MockStationDirectory::new(vec![station]),
            &DirectoryCacheConfig::default(),
        )
    }

    #[test]
    fn default_config() {
        let config = DirectoryCacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(60));
        assert_eq!(config.max_capacity, 1000);
        assert_eq!(config.cell_degrees, 0.0025);
    }

    #[test]
    fn cell_calculation() {
        let cache = cached_mock();

        // 40.7201 / 0.0025 = 16288.04, -73.9501 / 0.0025 = -29580.04
        assert_eq!(cache.cell(&coord(40.7201, -73.9501)), (16288, -29581));

        // A few metres away lands in the same cell
        assert_eq!(
            cache.cell(&coord(40.7202, -73.9502)),
            cache.cell(&coord(40.7201, -73.9501))
        );

        // Half a kilometre north does not
        assert_ne!(
            cache.cell(&coord(40.7250, -73.9501)),
            cache.cell(&coord(40.7201, -73.9501))
        );
    }

    #[tokio::test]
    async fn second_fetch_in_same_cell_is_cached() {
        let cache = cached_mock();

        let first = cache.fetch(coord(40.7201, -73.9501)).await.unwrap();
        let second = cache.fetch(coord(40.7202, -73.9502)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(cache.inner().call_count(), 1);
    }

    #[tokio::test]
    async fn different_cell_hits_backend() {
        let cache = cached_mock();

        cache.fetch(coord(40.7201, -73.9501)).await.unwrap();
        cache.fetch(coord(40.7401, -73.9501)).await.unwrap();

        assert_eq!(cache.inner().call_count(), 2);
    }

    /// Fails its first fetch, then serves an empty list.
    struct FlakyDirectory {
        calls: AtomicUsize,
    }

    impl StationDirectory for FlakyDirectory {
        async fn fetch(&self, _near: Coordinate) -> Result<StationSnapshot, StationFetchError> {
            if self.calls.fetch_add(1, Ordering::Relaxed) == 0 {
                return Err(StationFetchError::ServerError("rate limited".into()));
            }
            Ok(StationSnapshot {
                stations: Vec::new(),
                fetched_at: chrono::Utc::now(),
            })
        }
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cache = CachedStationDirectory::new(
            FlakyDirectory {
                calls: AtomicUsize::new(0),
            },
            &DirectoryCacheConfig::default(),
        );

        assert!(cache.fetch(coord(40.7201, -73.9501)).await.is_err());
        assert!(cache.fetch(coord(40.7201, -73.9501)).await.is_ok());
        assert!(cache.fetch(coord(40.7201, -73.9501)).await.is_ok());
        assert_eq!(cache.inner().calls.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let cache = cached_mock();

        cache.fetch(coord(40.7201, -73.9501)).await.unwrap();
        cache.invalidate();
        cache.fetch(coord(40.7201, -73.9501)).await.unwrap();

        assert_eq!(cache.inner().call_count(), 2);
    }
}
