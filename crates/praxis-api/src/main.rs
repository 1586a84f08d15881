//! Rewards API server entry point.
//!
//! Initializes logging, loads configuration from environment variables,
//! connects to `PostgreSQL`, runs migrations, wires the engine service
//! over the Postgres-backed store and catalog, and serves the REST API
//! until the process is terminated.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use praxis_api::config::ApiConfig;
use praxis_api::server::{ServerConfig, start_server};
use praxis_api::state::AppState;
use praxis_db::postgres::{PostgresConfig, PostgresPool};
use praxis_db::{PgCatalog, PgRewardsStore};
use praxis_engine::store::{Catalog, RewardsStore};
use praxis_engine::{Clock, RewardsService, SystemClock};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("praxis-api starting");

    // Load configuration from environment
    let config = ApiConfig::from_env()?;
    info!(
        host = config.host,
        port = config.port,
        db_max_connections = config.db_max_connections,
        "configuration loaded"
    );

    // Connect to PostgreSQL and run migrations
    let pg_config = PostgresConfig::new(&config.database_url)
        .with_max_connections(config.db_max_connections);
    let pool = PostgresPool::connect(&pg_config).await?;
    pool.run_migrations().await?;

    // Wire the engine over the Postgres store and catalog
    let store: Arc<dyn RewardsStore> = Arc::new(PgRewardsStore::new(&pool));
    let catalog: Arc<dyn Catalog> = Arc::new(PgCatalog::new(&pool));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let service = RewardsService::new(store, catalog, Arc::clone(&clock));
    let state = Arc::new(AppState::new(service, clock));

    // Serve
    let server_config = ServerConfig {
        host: config.host.clone(),
        port: config.port,
    };
    start_server(&server_config, state).await?;

    Ok(())
}
