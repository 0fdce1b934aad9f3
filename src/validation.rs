// Validation utilities module
// Custom validation functions for domain-specific rules

use validator::ValidationError;

/// Rejects empty and whitespace-only strings
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("must_not_be_blank"))
    } else {
        Ok(())
    }
}

/// A CPF-like identifier: digits, optionally formatted with '.' and '-'
pub fn validate_national_id(value: &str) -> Result<(), ValidationError> {
    validate_not_blank(value)?;
    let well_formed = value
        .chars()
        .all(|c| c.is_ascii_digit() || c == '.' || c == '-')
        && value.chars().any(|c| c.is_ascii_digit());
    if well_formed {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_national_id"))
    }
}

/// Partial-update variant of `validate_not_blank`; "" means "leave unchanged"
pub fn validate_optional_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        Ok(())
    } else {
        validate_not_blank(value)
    }
}

/// Partial-update variant of `validate_national_id`
pub fn validate_optional_national_id(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        Ok(())
    } else {
        validate_national_id(value)
    }
}

/// Email check for partial updates, where an empty string means "leave unchanged"
pub fn validate_optional_email(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || validator::validate_email(value) {
        Ok(())
    } else {
        Err(ValidationError::new("email"))
    }
}
