//! Shared state for the web layer.

use std::sync::Arc;

use crate::location::ManualLocationSource;
use crate::orchestrator::OrchestratorHandle;

/// Shared web state.
///
/// Contains the handles needed to serve requests.
#[derive(Clone)]
pub struct WebState {
    /// Handle to the running orchestrator
    pub orchestrator: OrchestratorHandle,

    /// Location feed that device reports are published into
    pub location: Arc<ManualLocationSource>,
}

impl WebState {
    /// Create a new web state.
    pub fn new(orchestrator: OrchestratorHandle, location: Arc<ManualLocationSource>) -> Self {
        Self {
            orchestrator,
            location,
        }
    }
}
