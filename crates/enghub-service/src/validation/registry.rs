//! Validators keyed by model type, registered once at startup.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;

use tracing::debug;
use validator::Validate;

use enghub_core::error::AppError;
use enghub_core::result::AppResult;
use enghub_core::types::FieldErrors;

/// Checks a model of type `T` and reports failures per property.
pub trait ModelValidator<T>: Send + Sync {
    /// Property name to messages; empty when the model is valid.
    fn validate(&self, model: &T) -> FieldErrors;
}

/// Runs the `validator::Validate` rules of a model and renames fields to
/// their public property names.
#[derive(Debug, Clone, Copy)]
pub struct DeriveValidator {
    properties: &'static [(&'static str, &'static str)],
}

impl DeriveValidator {
    /// Create a validator with a `(field, property)` rename table. Fields
    /// missing from the table keep their own name.
    pub const fn new(properties: &'static [(&'static str, &'static str)]) -> Self {
        Self { properties }
    }

    fn property_name(&self, field: &str) -> String {
        self.properties
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, property)| (*property).to_string())
            .unwrap_or_else(|| field.to_string())
    }
}

impl<T: Validate> ModelValidator<T> for DeriveValidator {
    fn validate(&self, model: &T) -> FieldErrors {
        let mut result = FieldErrors::new();
        let Err(errors) = model.validate() else {
            return result;
        };

        for (field, failures) in errors.field_errors() {
            let messages = result.entry(self.property_name(&field)).or_default();
            for failure in failures {
                let message = failure
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| failure.code.to_string());
                if !messages.contains(&message) {
                    messages.push(message);
                }
            }
        }
        result
    }
}

/// Maps a model type to its validator.
///
/// Filled at process start; lookups never fail. A model type without a
/// registered validator is accepted as valid.
#[derive(Default)]
pub struct ValidatorRegistry {
    validators: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl ValidatorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the validator for `T`, replacing any earlier one.
    pub fn register<T: 'static>(&mut self, validator: impl ModelValidator<T> + 'static) -> &mut Self {
        let boxed: Box<dyn ModelValidator<T>> = Box::new(validator);
        self.validators.insert(TypeId::of::<T>(), Box::new(boxed));
        self
    }

    /// Whether a validator is registered for `T`.
    pub fn is_registered<T: 'static>(&self) -> bool {
        self.validators.contains_key(&TypeId::of::<T>())
    }

    /// Validate `model`, failing with the per-property messages.
    pub fn validate<T: 'static>(&self, model: &T) -> AppResult<()> {
        let validator = self
            .validators
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref::<Box<dyn ModelValidator<T>>>());
        let Some(validator) = validator else {
            debug!(model = type_name::<T>(), "No validator registered");
            return Ok(());
        };

        let errors = validator.validate(model);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::validation_failed(errors))
        }
    }
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("validators", &self.validators.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use enghub_core::error::ErrorKind;

    use super::*;
    use crate::validation::rules::not_blank;

    #[derive(Debug, Validate)]
    struct Label {
        #[validate(
            custom(function = "not_blank", message = "Text is required."),
            length(max = 3, message = "Text is too long.")
        )]
        text: String,
    }

    struct Unregistered;

    fn registry() -> ValidatorRegistry {
        let mut registry = ValidatorRegistry::new();
        registry.register::<Label>(DeriveValidator::new(&[("text", "Text")]));
        registry
    }

    #[test]
    fn test_valid_model_passes() {
        let label = Label {
            text: "ok".to_string(),
        };
        assert!(registry().validate(&label).is_ok());
    }

    #[test]
    fn test_failures_use_property_names() {
        let label = Label {
            text: "toolong".to_string(),
        };
        let err = registry().validate(&label).expect_err("invalid");
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(
            err.field_errors.get("Text"),
            Some(&vec!["Text is too long.".to_string()])
        );
        assert_eq!(err.message, "Text: Text is too long.");
    }

    #[test]
    fn test_unregistered_type_is_valid() {
        let registry = registry();
        assert!(!registry.is_registered::<Unregistered>());
        assert!(registry.validate(&Unregistered).is_ok());
    }
}
