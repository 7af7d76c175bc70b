//! HTTP client for the station directory backend.

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Coordinate, Station};

use super::error::StationFetchError;
use super::{StationDirectory, StationSnapshot};

/// Default base URL for the station directory.
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";

/// Body of a successful `/stations` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationsResponse {
    pub stations: Vec<Station>,

    /// When the backend last refreshed its data. Missing means "now".
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl StationsResponse {
    /// Convert to a snapshot, stamping with `now` if the backend gave no time.
    pub fn into_snapshot(self, now: DateTime<Utc>) -> StationSnapshot {
        StationSnapshot {
            stations: self.stations,
            fetched_at: self.last_updated.unwrap_or(now),
        }
    }
}

/// Body of an error response.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Configuration for the station directory client.
#[derive(Debug, Clone)]
pub struct StationDirectoryConfig {
    /// Optional API key sent as `x-apikey`
    pub api_key: Option<String>,
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl StationDirectoryConfig {
    /// Create a config pointing at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            api_key: None,
            base_url: base_url.into(),
            timeout_secs: 10,
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for StationDirectoryConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Client for the station directory HTTP API.
#[derive(Debug, Clone)]
pub struct HttpStationDirectory {
    http: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl HttpStationDirectory {
    /// Create a new client.
    pub fn new(config: StationDirectoryConfig) -> Result<Self, StationFetchError> {
        let mut headers = HeaderMap::new();

        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(key).map_err(|_| {
                StationFetchError::UnknownError("invalid API key format".to_string())
            })?;
            headers.insert(HeaderName::from_static("x-apikey"), value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout_secs: config.timeout_secs,
        })
    }

    /// The URL stations are fetched from.
    pub fn stations_url(&self) -> String {
        format!("{}/stations", self.base_url)
    }

    /// Map a transport failure, reporting timeouts the same way whichever
    /// side gave up first.
    fn transport_error(&self, e: reqwest::Error) -> StationFetchError {
        if e.is_timeout() {
            StationFetchError::timed_out(self.timeout_secs)
        } else {
            StationFetchError::Http(e)
        }
    }
}

impl StationDirectory for HttpStationDirectory {
    async fn fetch(&self, near: Coordinate) -> Result<StationSnapshot, StationFetchError> {
        debug!(%near, "fetching stations");

        let response = self
            .http
            .get(self.stations_url())
            .query(&[
                ("lat", near.latitude().to_string()),
                ("lon", near.longitude().to_string()),
            ])
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &body));
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;
        let parsed: StationsResponse =
            serde_json::from_str(&body).map_err(|e| StationFetchError::Decode {
                message: e.to_string(),
            })?;

        Ok(parsed.into_snapshot(Utc::now()))
    }
}

/// Classify a non-2xx response.
///
/// A JSON `{"error": ...}` body is the backend speaking; anything else is
/// reported by status alone.
fn classify_failure(status: reqwest::StatusCode, body: &str) -> StationFetchError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody { error }) => StationFetchError::ServerError(error),
        Err(_) => StationFetchError::UnknownError(format!("HTTP {}", status.as_u16())),
    }
}
