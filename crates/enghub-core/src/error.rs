//! Unified application error types for EngHub.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator.

use std::fmt;

use thiserror::Error;

use crate::types::envelope::not_found_message;
use crate::types::validation::FieldErrors;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested resource was not found.
    NotFound,
    /// Input validation failed.
    Validation,
    /// A required argument was missing or malformed.
    InvalidArgument,
    /// A conflict occurred (duplicate key, stale row, etc.).
    Conflict,
    /// A database error occurred.
    Database,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// A configuration error occurred.
    Configuration,
    /// The operation was cancelled before it completed.
    Cancelled,
    /// An internal server error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::InvalidArgument => write!(f, "INVALID_ARGUMENT"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Database => write!(f, "DATABASE"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout EngHub.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls. Validation failures additionally carry
/// the per-field messages in [`AppError::field_errors`].
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Field name to messages, populated for validation failures.
    pub field_errors: FieldErrors,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            field_errors: FieldErrors::new(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            field_errors: FieldErrors::new(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a not-found error for the entity `name` with key `key`.
    pub fn entity_not_found(name: &str, key: impl fmt::Display) -> Self {
        Self::not_found(not_found_message(name, key))
    }

    /// Create a validation error without field details.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a validation error from a set of failed field rules.
    ///
    /// The message lists every field and its messages, e.g.
    /// `Name: Name cannot be empty.; NameAR: NameAR cannot be empty.`
    pub fn validation_failed(errors: FieldErrors) -> Self {
        let message = errors
            .iter()
            .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
            .collect::<Vec<_>>()
            .join("; ");
        Self {
            kind: ErrorKind::Validation,
            message,
            field_errors: errors,
            source: None,
        }
    }

    /// Create a precondition-violation error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create a cancellation error.
    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cancelled, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            field_errors: self.field_errors.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

// `IntoResponse` must be implemented in the crate that defines `AppError`
// (orphan rule); the mapping is re-exported through `enghub_api::error`.
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::types::Envelope;

/// Message for validation failures; the details are in the error map.
pub const VALIDATION_FAILED_MESSAGE: &str = "Validation failed.";

/// Message for every unclassified failure.
pub const GENERIC_FAILURE_MESSAGE: &str = "An error occurred while processing the request.";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self.kind {
            ErrorKind::Validation => {
                tracing::warn!(errors = %self.message, "Validation failed");
                (
                    StatusCode::BAD_REQUEST,
                    Envelope::<()>::fail_with_errors(self.field_errors, VALIDATION_FAILED_MESSAGE),
                )
            }
            ErrorKind::InvalidArgument => {
                (StatusCode::BAD_REQUEST, Envelope::fail(self.message))
            }
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, Envelope::fail(self.message)),
            ErrorKind::Conflict => (StatusCode::CONFLICT, Envelope::fail(self.message)),
            ErrorKind::Cancelled => {
                (StatusCode::SERVICE_UNAVAILABLE, Envelope::fail(self.message))
            }
            _ => {
                tracing::error!(kind = %self.kind, error = %self.message, "Unhandled error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Envelope::fail(GENERIC_FAILURE_MESSAGE),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_failed_formats_every_field() {
        let mut errors = FieldErrors::new();
        errors.insert("Name".to_string(), vec!["Name cannot be empty.".to_string()]);
        errors.insert(
            "NameAR".to_string(),
            vec![
                "NameAR cannot be empty.".to_string(),
                "Max length for NameAR is 100 characters.".to_string(),
            ],
        );

        let err = AppError::validation_failed(errors);
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(
            err.message,
            "Name: Name cannot be empty.; NameAR: NameAR cannot be empty., Max length for NameAR is 100 characters."
        );
        assert_eq!(err.field_errors.len(), 2);
    }

    #[test]
    fn test_clone_keeps_field_errors() {
        let mut errors = FieldErrors::new();
        errors.insert("Id".to_string(), vec!["Id cannot be empty.".to_string()]);
        let err = AppError::validation_failed(errors);
        let cloned = err.clone();
        assert_eq!(cloned.field_errors, err.field_errors);
        assert!(cloned.source.is_none());
    }
}
