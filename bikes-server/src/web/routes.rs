//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::domain::InvalidCoordinate;

use super::dto::*;
use super::state::WebState;

/// Create the application router.
pub fn create_router(state: WebState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/state", get(current_state))
        .route("/api/location", post(report_location))
        .route("/api/location/authorize", post(request_authorization))
        .route("/api/location/request", post(request_location))
        .route("/api/refresh", post(refresh))
        .route("/api/reset", post(reset))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Current merged station state.
async fn current_state(
    State(state): State<WebState>,
    Query(query): Query<StateQuery>,
) -> Json<StateResponse> {
    let snapshot = state.orchestrator.snapshot();
    let max_bikes = query.max_bikes.unwrap_or(DEFAULT_MAX_BIKES);
    Json(StateResponse::from_state(&snapshot, Utc::now(), max_bikes))
}

/// Accept a location fix or failure from the device.
async fn report_location(
    State(state): State<WebState>,
    Json(report): Json<LocationReport>,
) -> Result<StatusCode, AppError> {
    let update = report.into_update()?;
    state.location.publish(update);
    Ok(StatusCode::ACCEPTED)
}

async fn request_authorization(State(state): State<WebState>) -> StatusCode {
    state.orchestrator.request_authorization();
    StatusCode::ACCEPTED
}

async fn request_location(State(state): State<WebState>) -> StatusCode {
    state.orchestrator.request_location();
    StatusCode::ACCEPTED
}

async fn refresh(State(state): State<WebState>) -> StatusCode {
    state.orchestrator.refresh();
    StatusCode::ACCEPTED
}

async fn reset(State(state): State<WebState>) -> StatusCode {
    state.orchestrator.reset();
    StatusCode::ACCEPTED
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
}

impl From<InvalidCoordinate> for AppError {
    fn from(e: InvalidCoordinate) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
        };

        warn!(%status, %message, "request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
