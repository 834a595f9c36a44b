//! # enghub-api
//!
//! HTTP API layer for EngHub built on Axum.
//!
//! Provides the engineer REST endpoints, health check, middleware (CORS,
//! compression, request logging), extractors and the mapping from
//! [`enghub_core::AppError`] to HTTP responses.

pub mod app;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use state::AppState;
