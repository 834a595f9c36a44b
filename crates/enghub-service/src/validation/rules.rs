//! Custom field rules used with `#[validate(custom(...))]`.

use uuid::Uuid;
use validator::ValidationError;

/// Rejects empty and whitespace-only text.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("not_blank"));
    }
    Ok(())
}

/// Rejects the all-zero UUID.
pub fn not_nil(value: &Uuid) -> Result<(), ValidationError> {
    if value.is_nil() {
        return Err(ValidationError::new("not_nil"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_blank() {
        assert!(not_blank("Ali").is_ok());
        assert!(not_blank("").is_err());
        assert!(not_blank(" \t ").is_err());
    }

    #[test]
    fn test_not_nil() {
        assert!(not_nil(&Uuid::new_v4()).is_ok());
        assert!(not_nil(&Uuid::nil()).is_err());
    }
}
