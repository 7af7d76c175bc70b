//! Station orchestration: the core of the application.
//!
//! Turns a location feed into a station list with walking estimates:
//!
//! 1. The first location fix triggers a station fetch. Later fixes only
//!    update the stored location.
//! 2. A successful fetch replaces the station list and launches one
//!    travel-time estimate per station, all running concurrently.
//! 3. Estimates are merged as they complete, in whatever order that is.
//!
//! Failures degrade the state instead of aborting anything: a failed fetch
//! keeps the previous stations and reports a message, a failed estimate
//! just leaves that station without a walking time.

mod actor;
mod config;
mod label;
mod state;


pub use actor::{OrchestratorHandle, StationOrchestrator};
pub use config::OrchestratorConfig;
pub use label::last_updated_label;
pub use state::{AppState, Phase, RefreshState, StationEntry};
