//! Station directory error types.

/// Message shown when a fetch fails for a reason the backend did not explain.
pub const GENERIC_FETCH_ERROR: &str =
    "Couldn't load nearby stations. Check your connection and try again.";

/// Errors from fetching a station snapshot.
#[derive(Debug, thiserror::Error)]
pub enum StationFetchError {
    /// The backend answered with an error message of its own
    #[error("{0}")]
    ServerError(String),

    /// The request failed for a described but unclassified reason
    #[error("{0}")]
    UnknownError(String),

    /// HTTP request failed (network error, connection refused, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be decoded
    #[error("could not decode station data: {message}")]
    Decode { message: String },
}

impl StationFetchError {
    /// The directory gave no answer within `secs` seconds.
    pub fn timed_out(secs: u64) -> Self {
        StationFetchError::UnknownError(format!(
            "Station directory did not respond within {secs}s"
        ))
    }

    /// Text to put in front of the user.
    ///
    /// Server and unknown errors carry their own message verbatim; anything
    /// else gets a generic description.
    pub fn user_message(&self) -> String {
        match self {
            StationFetchError::ServerError(message) => message.clone(),
            StationFetchError::UnknownError(message) => message.clone(),
            _ => GENERIC_FETCH_ERROR.to_string(),
        }
    }
}
