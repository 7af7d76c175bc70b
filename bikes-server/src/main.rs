use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use bikes_server::config::{ConfigError, DirectorySource, ServerConfig};
use bikes_server::directory::{
    CachedStationDirectory, DirectoryCacheConfig, HttpStationDirectory, MockStationDirectory,
    StationDirectory, StationFetchError,
};
use bikes_server::location::ManualLocationSource;
use bikes_server::orchestrator::StationOrchestrator;
use bikes_server::travel::WalkingEstimator;
use bikes_server::web::{WebState, create_router};

/// Errors that stop the server from starting.
#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("station directory: {0}")]
    Directory(#[from] StationFetchError),

    #[error("server: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bikes_server=info,tower_http=info")),
        )
        .init();

    if let Err(e) = run().await {
        error!(error = %e, "startup failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    let config = ServerConfig::from_env()?;

    match &config.directory {
        DirectorySource::Mock(path) => {
            let directory = MockStationDirectory::from_file(path)?;
            info!(path = %path.display(), "using mock station directory");
            serve(directory, &config).await
        }
        DirectorySource::Http { base_url, .. } => {
            let client_config = config
                .directory_client_config()
                .ok_or(ConfigError::NoDirectory)?;
            let client = HttpStationDirectory::new(client_config)?;
            let directory = CachedStationDirectory::new(client, &DirectoryCacheConfig::default());
            info!(%base_url, "using station directory");
            serve(directory, &config).await
        }
    }
}

async fn serve<D: StationDirectory>(directory: D, config: &ServerConfig) -> Result<(), StartupError> {
    let location = Arc::new(ManualLocationSource::new());
    let orchestrator = StationOrchestrator::spawn(
        Arc::new(directory),
        Arc::new(WalkingEstimator::default()),
        Arc::clone(&location),
        config.orchestrator.clone(),
    );

    let app = create_router(WebState::new(orchestrator, location));

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(addr = %config.listen_addr, "bike station finder listening");
    info!("  GET  /api/state          - Stations, bikes and walk times");
    info!("  POST /api/location       - Report a location fix or failure");
    info!("  POST /api/reset          - Forget the stored location");

    axum::serve(listener, app).await?;
    Ok(())
}
