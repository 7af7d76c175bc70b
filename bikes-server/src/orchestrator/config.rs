//! Orchestrator configuration.

use std::time::Duration;

use crate::travel::TravelMode;

/// Tuning for the station orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// How long to wait for the station directory (seconds).
    /// A fetch that takes longer is reported as failed.
    pub fetch_timeout_secs: u64,

    /// How long to wait for each travel-time estimate (seconds).
    pub estimate_timeout_secs: u64,

    /// Mode passed to the travel-time estimator.
    pub travel_mode: TravelMode,

    /// Drop route estimates for stations missing from a new snapshot.
    pub purge_stale_routes: bool,

    /// Ignore estimates that belong to an earlier refresh generation.
    /// When off, a late estimate is still merged if its station is present.
    pub discard_stale_estimates: bool,
}

impl OrchestratorConfig {
    /// Set the station fetch timeout.
    pub fn with_fetch_timeout(mut self, secs: u64) -> Self {
        self.fetch_timeout_secs = secs;
        self
    }

    /// Set the per-estimate timeout.
    pub fn with_estimate_timeout(mut self, secs: u64) -> Self {
        self.estimate_timeout_secs = secs;
        self
    }

    /// Choose whether late estimates from a superseded refresh are merged.
    pub fn with_discard_stale_estimates(mut self, discard: bool) -> Self {
        self.discard_stale_estimates = discard;
        self
    }

    /// Returns the fetch timeout as a Duration.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Returns the estimate timeout as a Duration.
    pub fn estimate_timeout(&self) -> Duration {
        Duration::from_secs(self.estimate_timeout_secs)
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: 10,
            estimate_timeout_secs: 10,
            travel_mode: TravelMode::Walking,
            purge_stale_routes: true,
            discard_stale_estimates: true,
        }
    }
}
