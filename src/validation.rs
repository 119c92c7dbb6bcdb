// Validation utilities module
// Provides custom validation functions for domain-specific rules

use validator::{ValidationError, ValidationErrors};

/// Validates that a username contains only letters, digits, dots, hyphens
/// and underscores
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_')
    {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_username_characters"))
    }
}

/// Validates that a tax identifier is plausible: digits with optional dashes
pub fn validate_tax_id(tax_id: &str) -> Result<(), ValidationError> {
    if !tax_id.is_empty() && tax_id.chars().all(|c| c.is_ascii_digit() || c == '-') {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_tax_id"))
    }
}

/// Builds a single-field ValidationErrors value for imperative checks that the
/// derive macro cannot express (e.g. non-negative Decimal amounts)
pub fn field_error(field: &'static str, code: &'static str) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(field, ValidationError::new(code));
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username_accepts_common_forms() {
        assert!(validate_username("front.desk").is_ok());
        assert!(validate_username("admin_01").is_ok());
        assert!(validate_username("mary-ann").is_ok());
    }

    #[test]
    fn test_validate_username_rejects_spaces_and_symbols() {
        assert!(validate_username("front desk").is_err());
        assert!(validate_username("admin!").is_err());
    }

    #[test]
    fn test_validate_tax_id() {
        assert!(validate_tax_id("0105544045639").is_ok());
        assert!(validate_tax_id("010-554-4045").is_ok());
        assert!(validate_tax_id("").is_err());
        assert!(validate_tax_id("abc123").is_err());
    }

    #[test]
    fn test_field_error_carries_field_and_code() {
        let errors = field_error("price", "price_must_be_non_negative");
        assert!(errors.field_errors().contains_key("price"));
    }
}
