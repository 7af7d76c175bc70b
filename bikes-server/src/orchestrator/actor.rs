//! The station orchestrator actor.
//!
//! One task owns [`AppState`] and is the only writer. Location events,
//! commands from handles, and results from the station fetch and the
//! per-station estimate tasks all arrive on channels and are applied one at
//! a time. After each message the state is published as a fresh
//! `Arc<AppState>` on a watch channel.
//!
//! Each station fetch bumps the refresh generation, and a fetch result is
//! only applied if no later fetch has started. Applying a result records its
//! generation as the list generation. Estimates carry the list generation
//! they were launched for, so an estimate outlives a refresh that fails but
//! not one that replaces the list.

use std::sync::Arc;

use chrono::Utc;
use futures::StreamExt;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::directory::{StationDirectory, StationFetchError, StationSnapshot};
use crate::domain::{Coordinate, RouteEstimate, StationId};
use crate::location::{LocationSource, LocationState, LocationUpdate, LocationUpdates};
use crate::travel::{TravelEstimateError, TravelTime, TravelTimeEstimator};

use super::config::OrchestratorConfig;
use super::state::{AppState, Phase};

/// Requests from handles.
#[derive(Debug)]
enum Command {
    Reset,
    Refresh,
}

/// Results from spawned work.
#[derive(Debug)]
enum Event {
    Fetched {
        generation: u64,
        result: Result<StationSnapshot, StationFetchError>,
    },
    Estimated {
        generation: u64,
        station: StationId,
        result: Result<TravelTime, TravelEstimateError>,
    },
}

/// Cloneable handle to a running orchestrator.
///
/// Dropping every handle stops the orchestrator.
#[derive(Clone)]
pub struct OrchestratorHandle {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<Arc<AppState>>,
    location: Arc<dyn LocationSource>,
}

impl OrchestratorHandle {
    /// The latest published state.
    pub fn snapshot(&self) -> Arc<AppState> {
        Arc::clone(&self.state.borrow())
    }

    /// Receiver that is notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<Arc<AppState>> {
        self.state.clone()
    }

    /// Forget the stored location. Stations and estimates stay visible;
    /// the next location fix triggers a fresh fetch.
    pub fn reset(&self) {
        self.send(Command::Reset);
    }

    /// Fetch stations again for the stored location, if there is one.
    pub fn refresh(&self) {
        self.send(Command::Refresh);
    }

    /// Forward a permission prompt request to the location source.
    pub fn request_authorization(&self) {
        self.location.request_authorization();
    }

    /// Forward a location fix request to the location source.
    pub fn request_location(&self) {
        self.location.request_location();
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            warn!("orchestrator has stopped; command dropped");
        }
    }
}

/// Owner of the application state.
pub struct StationOrchestrator<D, E> {
    directory: Arc<D>,
    estimator: Arc<E>,
    config: OrchestratorConfig,
    state: AppState,
    publisher: watch::Sender<Arc<AppState>>,
    events: mpsc::UnboundedSender<Event>,
}

impl<D: StationDirectory, E: TravelTimeEstimator> StationOrchestrator<D, E> {
    /// Start an orchestrator on the current tokio runtime.
    pub fn spawn<L: LocationSource>(
        directory: Arc<D>,
        estimator: Arc<E>,
        location: Arc<L>,
        config: OrchestratorConfig,
    ) -> OrchestratorHandle {
        let updates = location.subscribe();
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (publisher, state_rx) = watch::channel(Arc::new(AppState::default()));

        let orchestrator = Self {
            directory,
            estimator,
            config,
            state: AppState::default(),
            publisher,
            events: event_tx,
        };
        tokio::spawn(orchestrator.run(updates, command_rx, event_rx));

        OrchestratorHandle {
            commands: command_tx,
            state: state_rx,
            location,
        }
    }

    async fn run(
        mut self,
        mut updates: LocationUpdates,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut events: mpsc::UnboundedReceiver<Event>,
    ) {
        let mut location_open = true;

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(event) = events.recv() => self.handle_event(event),
                update = updates.next(), if location_open => match update {
                    Some(update) => self.handle_location(update),
                    None => {
                        info!("location feed closed");
                        location_open = false;
                    }
                },
            }

            self.publisher.send_replace(Arc::new(self.state.clone()));
        }

        debug!("all handles dropped, orchestrator stopping");
    }

    fn handle_location(&mut self, update: LocationUpdate) {
        match LocationState::from(&update) {
            LocationState::Available(coordinate) if self.state.location.is_none() => {
                info!(%coordinate, "location acquired");
                self.state.location = Some(coordinate);
                self.state.location_failed = false;
                self.start_fetch(coordinate);
            }
            LocationState::Available(coordinate) => {
                // Stations are fetched once per acquisition, not per tick
                self.state.location = Some(coordinate);
            }
            LocationState::Unknown => {
                self.state.location_failed = false;
            }
            failure @ (LocationState::Denied | LocationState::TransientError) => {
                warn!(location = ?failure, "location unavailable");
                self.state.location_failed = true;
            }
        }
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Reset => {
                debug!("reset: clearing stored location");
                self.state.location = None;
            }
            Command::Refresh => match self.state.location {
                Some(coordinate) => {
                    self.directory.invalidate();
                    self.start_fetch(coordinate);
                }
                None => debug!("refresh requested without a location, ignoring"),
            },
        }
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Fetched { generation, result } => self.finish_fetch(generation, result),
            Event::Estimated {
                generation,
                station,
                result,
            } => self.merge_estimate(generation, station, result),
        }
    }

    /// Begin a new refresh generation and fetch stations near `near`.
    fn start_fetch(&mut self, near: Coordinate) {
        self.state.generation += 1;
        self.state.phase = Phase::Fetching;

        let generation = self.state.generation;
        let directory = Arc::clone(&self.directory);
        let events = self.events.clone();
        let timeout = self.config.fetch_timeout();
        debug!(%near, generation, "starting station fetch");

        tokio::spawn(async move {
            let result = match tokio::time::timeout(timeout, directory.fetch(near)).await {
                Ok(result) => result,
                Err(_) => Err(StationFetchError::timed_out(timeout.as_secs())),
            };
            // Send fails only if the orchestrator has stopped
            let _ = events.send(Event::Fetched { generation, result });
        });
    }

    fn finish_fetch(
        &mut self,
        generation: u64,
        result: Result<StationSnapshot, StationFetchError>,
    ) {
        if generation != self.state.generation {
            debug!(
                generation,
                current = self.state.generation,
                "discarding superseded station fetch"
            );
            return;
        }

        match result {
            Ok(snapshot) => {
                info!(stations = snapshot.stations.len(), generation, "stations refreshed");
                self.state
                    .apply_snapshot(snapshot, self.config.purge_stale_routes);
                self.state.list_generation = generation;
                self.state.phase = Phase::Ready;
                self.fan_out(generation);
            }
            Err(e) => {
                warn!(error = %e, generation, "station fetch failed");
                self.state.refresh.last_error = Some(e.user_message());
                self.state.phase = Phase::Error;
            }
        }
    }

    /// Launch one independent estimate task per station.
    ///
    /// Tasks are never cancelled; a task outliving its station list reports
    /// back and is filtered in [`merge_estimate`](Self::merge_estimate).
    fn fan_out(&self, generation: u64) {
        let Some(origin) = self.state.location else {
            debug!(generation, "location was reset before stations arrived, no estimates");
            return;
        };

        let timeout = self.config.estimate_timeout();
        let mode = self.config.travel_mode;

        for station in &self.state.stations {
            let estimator = Arc::clone(&self.estimator);
            let events = self.events.clone();
            let id = station.id.clone();
            let destination = station.coordinate;

            tokio::spawn(async move {
                let result =
                    match tokio::time::timeout(timeout, estimator.estimate(origin, destination, mode))
                        .await
                    {
                        Ok(result) => result,
                        Err(_) => Err(TravelEstimateError::Timeout),
                    };
                let _ = events.send(Event::Estimated {
                    generation,
                    station: id,
                    result,
                });
            });
        }

        debug!(
            generation,
            tasks = self.state.stations.len(),
            "travel time estimates launched"
        );
    }

    fn merge_estimate(
        &mut self,
        generation: u64,
        station: StationId,
        result: Result<TravelTime, TravelEstimateError>,
    ) {
        if self.config.discard_stale_estimates && generation != self.state.list_generation {
            debug!(
                %station,
                generation,
                current = self.state.list_generation,
                "discarding estimate for a replaced station list"
            );
            return;
        }

        match result {
            Ok(travel) => {
                if !self.state.has_station(&station) {
                    debug!(%station, "estimate for station no longer listed, ignoring");
                    return;
                }
                self.state.upsert_route(RouteEstimate::new(
                    station,
                    travel.minutes,
                    Utc::now(),
                ));
            }
            Err(e) => {
                debug!(%station, error = %e, "travel time unavailable");
            }
        }
    }
}
