//! Device location feed.
//!
//! The orchestrator consumes location as a stream of
//! `Result<Coordinate, LocationErrorKind>` values. The concrete source used
//! by the server is fed by the device over HTTP, since the platform
//! permission prompt and GPS acquisition happen on the phone.

mod manual;
mod source;

pub use manual::ManualLocationSource;
pub use source::{LocationErrorKind, LocationSource, LocationState, LocationUpdate, LocationUpdates};
