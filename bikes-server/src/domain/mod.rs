//! Domain types for the bikeshare station finder.
//!
//! These are validated value types; code that receives them can trust
//! their invariants without re-checking.

mod coordinate;
mod route;
mod station;

pub use coordinate::{Coordinate, InvalidCoordinate};
pub use route::RouteEstimate;
pub use station::{BatteryLevel, Bike, InvalidStationId, Station, StationId};
