//! Travel-time estimation from the user to a station.

mod walking;

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::domain::Coordinate;

pub use walking::{WalkingConfig, WalkingEstimator};

/// How the user intends to get to the station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Walking,
    Cycling,
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TravelMode::Walking => f.write_str("walking"),
            TravelMode::Cycling => f.write_str("cycling"),
        }
    }
}

/// A successful travel-time estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TravelTime {
    pub minutes: u32,
}

/// Why an estimate could not be produced. Never shown to the user.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TravelEstimateError {
    /// No sensible route exists (e.g. too far to walk)
    #[error("no route found ({distance_m:.0} m)")]
    NoRoute { distance_m: f64 },

    /// The estimator does not handle this mode
    #[error("travel mode {0} not supported")]
    Unsupported(TravelMode),

    /// The estimator did not answer in time
    #[error("travel time estimate timed out")]
    Timeout,

    /// Calculation failed for another reason
    #[error("travel time calculation failed: {0}")]
    Failed(String),
}

/// A source of travel-time estimates.
pub trait TravelTimeEstimator: Send + Sync + 'static {
    /// Estimate travel time from `origin` to `destination`.
    fn estimate(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TravelMode,
    ) -> impl Future<Output = Result<TravelTime, TravelEstimateError>> + Send;
}
