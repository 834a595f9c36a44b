//! EngHub Server: engineer registry over a pluggable store.
//!
//! Main entry point that wires all crates together and starts the server.

use tracing_subscriber::{EnvFilter, fmt};

use enghub_core::config::AppConfig;
use enghub_core::error::AppError;
use enghub_database::Database;

#[tokio::main]
async fn main() {
    let env = std::env::var("ENGHUB_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting EngHub v{}", env!("CARGO_PKG_VERSION"));

    let database = Database::connect(&config.database).await?;
    tracing::info!(provider = database.provider_name(), "Store ready");

    let result = enghub_api::run_server(config, database.clone()).await;

    database.close().await;
    tracing::info!("EngHub server shut down");
    result
}
