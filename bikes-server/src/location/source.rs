//! Location source contract.

use futures::stream::BoxStream;

use crate::domain::Coordinate;

/// Why no usable location is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum LocationErrorKind {
    /// No fix has been acquired yet. Not a failure from the user's point of view.
    #[error("location not yet acquired")]
    Initial,

    /// The user refused location permission. Terminal until they change it.
    #[error("location permission denied")]
    Denied,

    /// Acquisition failed temporarily; the last known location is still valid.
    #[error("location temporarily unavailable")]
    TransientError,
}

/// One event on the location feed.
pub type LocationUpdate = Result<Coordinate, LocationErrorKind>;

/// Lazy, infinite stream of location events. Ends only when the source is dropped.
pub type LocationUpdates = BoxStream<'static, LocationUpdate>;

/// Location as seen by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationState {
    Unknown,
    Available(Coordinate),
    Denied,
    TransientError,
}

impl From<&LocationUpdate> for LocationState {
    fn from(update: &LocationUpdate) -> Self {
        match update {
            Ok(coordinate) => LocationState::Available(*coordinate),
            Err(LocationErrorKind::Initial) => LocationState::Unknown,
            Err(LocationErrorKind::Denied) => LocationState::Denied,
            Err(LocationErrorKind::TransientError) => LocationState::TransientError,
        }
    }
}

/// A provider of device location.
///
/// Every call to [`subscribe`](LocationSource::subscribe) starts a fresh
/// stream that yields the current value first, then every later event in
/// publish order.
pub trait LocationSource: Send + Sync + 'static {
    /// Ask the platform to show its permission prompt.
    fn request_authorization(&self);

    /// Ask the platform to acquire a location fix.
    fn request_location(&self);

    /// The most recent location event.
    fn current(&self) -> LocationUpdate;

    /// Subscribe to location events.
    fn subscribe(&self) -> LocationUpdates;
}
