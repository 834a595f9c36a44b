//! Application builder: wires router, middleware and state into an Axum
//! app and runs it until a shutdown signal arrives.

use std::time::Duration;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use enghub_core::config::AppConfig;
use enghub_core::error::{AppError, ErrorKind};
use enghub_core::result::AppResult;
use enghub_database::Database;

use crate::middleware::compression::build_compression_layer;
use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);
    build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .layer(build_compression_layer()),
    )
}

/// Serves the API over `database` until Ctrl-C or SIGTERM.
///
/// After the signal, in-flight requests get `shutdown_grace_seconds` to
/// finish; then their store operations are cancelled.
pub async fn run_server(config: AppConfig, database: Database) -> AppResult<()> {
    let state = AppState::new(config, database);
    let addr = state.config.server.bind_address();
    let grace = Duration::from_secs(state.config.server.shutdown_grace_seconds);
    let shutdown = state.shutdown.clone();

    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        AppError::with_source(ErrorKind::Internal, format!("Failed to bind {addr}: {e}"), e)
    })?;
    info!(address = %addr, "EngHub server listening");

    let drain = shutdown.clone();
    axum::serve(listener, build_app(state))
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            info!(grace_seconds = grace.as_secs(), "Shutdown signal received; draining requests");
            tokio::spawn(async move {
                tokio::time::sleep(grace).await;
                warn!("Grace period elapsed; cancelling in-flight requests");
                drain.cancel();
            });
        })
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Internal, format!("Server error: {e}"), e))?;

    shutdown.cancel();
    info!("EngHub server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
