//! Nearby bikeshare station finder.
//!
//! A service that answers: "Which stations near me have bikes, and how
//! long is the walk?" Device location drives a station fetch, and each
//! station gets a walking-time estimate as soon as one is available.

pub mod config;
pub mod directory;
pub mod domain;
pub mod location;
pub mod orchestrator;
pub mod travel;
pub mod web;
