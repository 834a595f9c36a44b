//! Maps domain `AppError` to HTTP responses.

#[cfg(test)]
use axum::http::StatusCode;
#[cfg(test)]
use axum::response::{IntoResponse, Response};

#[cfg(test)]
use enghub_core::error::AppError;

pub use enghub_core::error::{GENERIC_FAILURE_MESSAGE, VALIDATION_FAILED_MESSAGE};
