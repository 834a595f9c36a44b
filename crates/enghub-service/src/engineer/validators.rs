//! Validator registrations for the engineer DTOs.

use crate::validation::{DeriveValidator, ValidatorRegistry};

use super::dto::{CreateEngineerDto, EngineerDto};

/// Field to property names used as error keys. Both the Rust and the
/// serialized spelling of `name_ar` map to `NameAR`.
const ENGINEER_PROPERTIES: &[(&str, &str)] = &[
    ("id", "Id"),
    ("name", "Name"),
    ("name_ar", "NameAR"),
    ("nameAR", "NameAR"),
];

/// Register the validators of every engineer payload.
pub fn register_engineer_validators(registry: &mut ValidatorRegistry) {
    registry
        .register::<CreateEngineerDto>(DeriveValidator::new(ENGINEER_PROPERTIES))
        .register::<EngineerDto>(DeriveValidator::new(ENGINEER_PROPERTIES));
}

impl ValidatorRegistry {
    /// A registry holding every validator the application ships with.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        register_engineer_validators(&mut registry);
        registry
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use enghub_core::error::ErrorKind;

    use super::*;

    fn messages(err: &enghub_core::AppError, key: &str) -> Vec<String> {
        err.field_errors.get(key).cloned().unwrap_or_default()
    }

    #[test]
    fn test_empty_create_payload_reports_both_names() {
        let registry = ValidatorRegistry::with_defaults();
        let err = registry
            .validate(&CreateEngineerDto::default())
            .expect_err("invalid");
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(messages(&err, "Name"), vec!["Name cannot be empty."]);
        assert_eq!(messages(&err, "NameAR"), vec!["NameAR cannot be empty."]);
        assert_eq!(err.field_errors.len(), 2);
    }

    #[test]
    fn test_long_names_are_rejected() {
        let registry = ValidatorRegistry::with_defaults();
        let dto = CreateEngineerDto {
            name: "a".repeat(101),
            name_ar: "ع".repeat(100),
        };
        let err = registry.validate(&dto).expect_err("too long");
        assert_eq!(
            messages(&err, "Name"),
            vec!["Max length for name is 100 characters."]
        );
        assert!(!err.field_errors.contains_key("NameAR"));
    }

    #[test]
    fn test_engineer_dto_requires_id() {
        let registry = ValidatorRegistry::with_defaults();
        let dto = EngineerDto {
            id: Uuid::nil(),
            name: "Ali".to_string(),
            name_ar: "علي".to_string(),
        };
        let err = registry.validate(&dto).expect_err("nil id");
        assert_eq!(messages(&err, "Id"), vec!["Id cannot be empty."]);

        let valid = EngineerDto {
            id: Uuid::new_v4(),
            ..dto
        };
        assert!(registry.validate(&valid).is_ok());
    }
}
