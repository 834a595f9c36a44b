//! Route definitions for the EngHub HTTP API.
//!
//! All routes are mounted under `/api`. The router receives `AppState` and
//! passes it to all handlers via Axum's `State` extractor.

use axum::{Router, middleware as axum_middleware, routing::get};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the API router with request logging.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(engineer_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Engineer CRUD, paging and lookup.
fn engineer_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/engineers",
            get(handlers::engineer::list_engineers).post(handlers::engineer::create_engineer),
        )
        .route(
            "/engineers/paged",
            get(handlers::engineer::list_engineers_paged),
        )
        .route(
            "/engineers/lookup",
            get(handlers::engineer::engineer_lookup),
        )
        .route(
            "/engineers/{id}",
            get(handlers::engineer::get_engineer)
                .put(handlers::engineer::update_engineer)
                .delete(handlers::engineer::delete_engineer),
        )
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
