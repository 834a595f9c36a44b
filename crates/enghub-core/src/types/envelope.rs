//! Outcome envelope returned across the service/HTTP boundary.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::validation::FieldErrors;

/// Key used for errors that do not belong to a single field.
pub const GENERAL_ERROR_KEY: &str = "General";

/// Default message for successful responses carrying data.
pub const SUCCESS_MESSAGE: &str = "Completed Successfully";

/// Message used when an entity lookup by key finds nothing.
pub fn not_found_message(name: &str, key: impl fmt::Display) -> String {
    format!("Entity \"{name}\" ({key}) was not found.")
}

/// A coded error description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomError {
    /// Machine-readable code.
    pub code: String,
    /// Human-readable description.
    pub description: String,
}

impl CustomError {
    /// Create a new coded error.
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
        }
    }
}

/// A tagged operation outcome: success flag, message, optional payload and
/// per-field error messages. Built once and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    /// Whether the operation succeeded.
    pub is_success: bool,
    /// Human-readable message (may be empty).
    pub message: String,
    /// Payload, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Field name to error messages.
    #[serde(default, skip_serializing_if = "FieldErrors::is_empty")]
    pub errors: FieldErrors,
}

impl<T> Envelope<T> {
    fn build(is_success: bool, message: impl Into<String>, data: Option<T>, errors: FieldErrors) -> Self {
        Self {
            is_success,
            message: message.into(),
            data,
            errors,
        }
    }

    /// Successful outcome without payload.
    pub fn success() -> Self {
        Self::build(true, "", None, FieldErrors::new())
    }

    /// Successful outcome with a message.
    pub fn success_message(message: impl Into<String>) -> Self {
        Self::build(true, message, None, FieldErrors::new())
    }

    /// Successful outcome carrying `data`.
    pub fn success_with(data: T) -> Self {
        Self::build(true, SUCCESS_MESSAGE, Some(data), FieldErrors::new())
    }

    /// Successful outcome carrying `data` and a custom message.
    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self::build(true, message, Some(data), FieldErrors::new())
    }

    /// Failed outcome with a message.
    pub fn fail(message: impl Into<String>) -> Self {
        Self::build(false, message, None, FieldErrors::new())
    }

    /// Failed outcome with per-field errors.
    pub fn fail_with_errors(errors: FieldErrors, message: impl Into<String>) -> Self {
        Self::build(false, message, None, errors)
    }

    /// Failed outcome with messages filed under [`GENERAL_ERROR_KEY`].
    pub fn fail_general<I, S>(message: impl Into<String>, failures: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut errors = FieldErrors::new();
        errors.insert(
            GENERAL_ERROR_KEY.to_string(),
            failures.into_iter().map(Into::into).collect(),
        );
        Self::build(false, message, None, errors)
    }

    /// Failed outcome listing the descriptions of coded errors.
    pub fn from_custom_errors(errors: &[CustomError]) -> Self {
        Self::fail_general("Error", errors.iter().map(|e| e.description.clone()))
    }

    /// Failed outcome for a missing entity.
    pub fn not_found(name: &str, key: impl fmt::Display) -> Self {
        Self::fail(not_found_message(name, key))
    }
}

/// A minimal `{ id, name }` pair for drop-downs and pickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupDto<Id> {
    /// Identifier.
    pub id: Id,
    /// Display name.
    pub name: String,
}
