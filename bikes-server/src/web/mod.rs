//! Web layer for the station finder.
//!
//! A thin JSON surface: the device reports its location here and reads
//! back the merged station state.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::create_router;
pub use state::WebState;
