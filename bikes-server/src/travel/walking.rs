//! Walking-time estimates from straight-line distance.
//!
//! Street networks add a roughly constant overhead to the great-circle
//! distance in a gridded city, so a detour factor over the haversine
//! distance gives estimates within a minute or two for station-sized hops.

use tracing::trace;

use crate::domain::Coordinate;

use super::{TravelEstimateError, TravelMode, TravelTime, TravelTimeEstimator};

/// Parameters for the walking model.
#[derive(Debug, Clone)]
pub struct WalkingConfig {
    /// Walking pace in metres per minute.
    pub metres_per_minute: f64,

    /// Multiplier from straight-line to on-street distance.
    pub detour_factor: f64,

    /// Straight-line distance beyond which no walk is suggested.
    pub max_distance_m: f64,
}

impl WalkingConfig {
    /// Set walking pace.
    pub fn with_pace(mut self, metres_per_minute: f64) -> Self {
        self.metres_per_minute = metres_per_minute;
        self
    }

    /// Set the maximum straight-line distance.
    pub fn with_max_distance(mut self, metres: f64) -> Self {
        self.max_distance_m = metres;
        self
    }
}

impl Default for WalkingConfig {
    fn default() -> Self {
        Self {
            metres_per_minute: 80.0, // 4.8 km/h
            detour_factor: 1.3,
            max_distance_m: 5_000.0,
        }
    }
}

/// Estimates walking time without any remote routing service.
#[derive(Debug, Clone, Default)]
pub struct WalkingEstimator {
    config: WalkingConfig,
}

impl WalkingEstimator {
    pub fn new(config: WalkingConfig) -> Self {
        Self { config }
    }

    /// Minutes to walk between two points, rounded up, at least 1.
    pub fn walk_minutes(
        &self,
        origin: &Coordinate,
        destination: &Coordinate,
    ) -> Result<u32, TravelEstimateError> {
        let distance_m = origin.distance_m(destination);
        if distance_m > self.config.max_distance_m {
            return Err(TravelEstimateError::NoRoute { distance_m });
        }

        let street_m = distance_m * self.config.detour_factor;
        let minutes = (street_m / self.config.metres_per_minute).ceil().max(1.0);
        Ok(minutes as u32)
    }
}

impl TravelTimeEstimator for WalkingEstimator {
    async fn estimate(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TravelMode,
    ) -> Result<TravelTime, TravelEstimateError> {
        if mode != TravelMode::Walking {
            return Err(TravelEstimateError::Unsupported(mode));
        }

        let minutes = self.walk_minutes(&origin, &destination)?;
        trace!(%origin, %destination, minutes, "walking estimate");
        Ok(TravelTime { minutes })
    }
}
