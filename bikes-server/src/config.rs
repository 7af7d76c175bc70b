//! Server configuration from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::directory::StationDirectoryConfig;
use crate::orchestrator::OrchestratorConfig;

/// Default listen address.
const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";

/// Errors from reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Neither a directory URL nor mock data was configured
    #[error("set BIKES_DIRECTORY_URL, or BIKES_MOCK_STATIONS to run against a local file")]
    NoDirectory,

    /// A variable was set to something unusable
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Where station data comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum DirectorySource {
    /// The HTTP station directory
    Http {
        base_url: String,
        api_key: Option<String>,
    },
    /// A JSON file served by the mock directory
    Mock(PathBuf),
}

/// Configuration for the server binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub directory: DirectorySource,
    pub orchestrator: OrchestratorConfig,
}

impl ServerConfig {
    /// Read configuration from the process environment.
    ///
    /// - `BIKES_LISTEN_ADDR` (default `127.0.0.1:3000`)
    /// - `BIKES_MOCK_STATIONS`: path to a stations JSON file; takes precedence
    /// - `BIKES_DIRECTORY_URL` / `BIKES_DIRECTORY_API_KEY`
    /// - `BIKES_FETCH_TIMEOUT_SECS`, `BIKES_ESTIMATE_TIMEOUT_SECS` (default 10)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup` (for testing).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let listen_raw = get("BIKES_LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.into());
        let listen_addr = listen_raw.parse().map_err(|_| ConfigError::Invalid {
            name: "BIKES_LISTEN_ADDR",
            value: listen_raw.clone(),
        })?;

        let directory = match (get("BIKES_MOCK_STATIONS"), get("BIKES_DIRECTORY_URL")) {
            (Some(path), _) => DirectorySource::Mock(PathBuf::from(path)),
            (None, Some(base_url)) => DirectorySource::Http {
                base_url,
                api_key: get("BIKES_DIRECTORY_API_KEY"),
            },
            (None, None) => return Err(ConfigError::NoDirectory),
        };

        let mut orchestrator = OrchestratorConfig::default();
        if let Some(secs) = get("BIKES_FETCH_TIMEOUT_SECS") {
            orchestrator = orchestrator.with_fetch_timeout(parse_secs("BIKES_FETCH_TIMEOUT_SECS", secs)?);
        }
        if let Some(secs) = get("BIKES_ESTIMATE_TIMEOUT_SECS") {
            orchestrator =
                orchestrator.with_estimate_timeout(parse_secs("BIKES_ESTIMATE_TIMEOUT_SECS", secs)?);
        }

        Ok(Self {
            listen_addr,
            directory,
            orchestrator,
        })
    }

    /// HTTP client config for the station directory, if one is configured.
    pub fn directory_client_config(&self) -> Option<StationDirectoryConfig> {
        match &self.directory {
            DirectorySource::Http { base_url, api_key } => {
                let mut config = StationDirectoryConfig::new(base_url.clone())
                    .with_timeout(self.orchestrator.fetch_timeout_secs);
                if let Some(key) = api_key {
                    config = config.with_api_key(key.clone());
                }
                Some(config)
            }
            DirectorySource::Mock(_) => None,
        }
    }
}

fn parse_secs(name: &'static str, value: String) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ConfigError::Invalid { name, value }),
    }
}
