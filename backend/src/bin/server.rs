//! CampusFlow HTTP Server Binary
//!
//! Loads configuration, seeds the repository and serves the REST API.
//!
//! # Usage
//!
//! ```bash
//! # In-memory repository seeded from ./data
//! CAMPUSFLOW_DATA_DIR=./data cargo run --bin campusflow-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0, or `[server].host`)
//! - `PORT`: Server port (default: 8080, or `[server].port`)
//! - `REPOSITORY_TYPE`: Store backend (default: local)
//! - `CAMPUSFLOW_DATA_DIR`: Directory with JSON seed files
//! - `CAMPUSFLOW_WINDOW_MINUTES`, `CAMPUSFLOW_COUNT_THRESHOLD`: trend overrides
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;

use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use campusflow::config::{ConfigError, EngineConfig};
use campusflow::db::RepositoryFactory;
use campusflow::http::{create_router, AppState};

fn load_config() -> anyhow::Result<EngineConfig> {
    let config = match EngineConfig::from_default_location() {
        Ok(config) => config,
        Err(ConfigError::NotFound(searched)) => {
            warn!("No configuration file found ({}), using defaults", searched);
            EngineConfig::default()
        }
        Err(e) => return Err(e.into()),
    };
    Ok(config.with_env_overrides()?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting CampusFlow HTTP Server");

    let config = load_config()?;
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    let repository = RepositoryFactory::from_env()?;
    info!("Repository initialized successfully");

    let state = AppState::new(repository, config)?;
    let app = create_router(state);

    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
