use crate::errors::{ValidationError, DomainResult, DomainError};
use regex::Regex;
use std::sync::OnceLock;
use sqlx::{query_scalar, SqlitePool};

/// A trait that entities should implement for validation.
pub trait Validate {
    /// Validates the entity and returns an error if validation fails.
    fn validate(&self) -> DomainResult<()>;
}

// Common regex patterns
fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap())
}

/// Donor phone numbers as entered on the donation form: exactly ten digits.
fn donor_phone_regex() -> &'static Regex {
    static DONOR_PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
    DONOR_PHONE_REGEX.get_or_init(|| Regex::new(r"^[0-9]{10}$").unwrap())
}

/// Committee member mobile numbers: ten digits starting 6-9 (Indian mobile).
fn indian_mobile_regex() -> &'static Regex {
    static INDIAN_MOBILE_REGEX: OnceLock<Regex> = OnceLock::new();
    INDIAN_MOBILE_REGEX.get_or_init(|| Regex::new(r"^[6-9][0-9]{9}$").unwrap())
}

/// Returns true when `email` has a plausible mailbox shape.
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// Returns true when `phone` is exactly ten digits.
pub fn is_valid_donor_phone(phone: &str) -> bool {
    donor_phone_regex().is_match(phone)
}

/// Returns true when `mobile` is a valid Indian mobile number.
pub fn is_valid_indian_mobile(mobile: &str) -> bool {
    indian_mobile_regex().is_match(mobile)
}

/// Normalizes a phone number picked from the device contact book.
///
/// Strips every non-digit, then a leading country code `91` from twelve-digit
/// numbers and a leading trunk `0` from eleven-digit numbers, yielding the
/// bare ten-digit form the donation form expects.
pub fn normalize_phone(raw: &str) -> String {
    let mut digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 12 && digits.starts_with("91") {
        digits.drain(..2);
    }
    if digits.len() == 11 && digits.starts_with('0') {
        digits.drain(..1);
    }
    digits
}

/// Struct for configuring validations in a fluent style
#[derive(Default)]
pub struct ValidationBuilder<T> {
    field_name: String,
    value: Option<T>,
    errors: Vec<ValidationError>,
}

/// Generic validation implementations
impl<T> ValidationBuilder<T> {
    pub fn new(field_name: &str, value: Option<T>) -> Self {
        Self {
            field_name: field_name.to_string(),
            value,
            errors: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self
    where T: Default + PartialEq {
        if self.value.is_none() || self.value == Some(T::default()) {
            self.errors.push(ValidationError::required(&self.field_name));
        }
        self
    }

    pub fn validate_with<F>(mut self, validator: F) -> Self
    where F: FnOnce(&T) -> Result<(), ValidationError> {
        if let Some(value) = &self.value {
            if let Err(err) = validator(value) {
                self.errors.push(err);
            }
        }
        self
    }

    /// Complete validation and return result
    pub fn validate(self) -> DomainResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            // Return the first error for simplicity
            Err(DomainError::Validation(self.errors[0].clone()))
        }
    }
}

/// String-specific validations
impl ValidationBuilder<String> {
    pub fn min_length(mut self, min: usize) -> Self {
        if let Some(value) = &self.value {
            if value.len() < min {
                self.errors.push(ValidationError::min_length(&self.field_name, min));
            }
        }
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        if let Some(value) = &self.value {
            if value.len() > max {
                self.errors.push(ValidationError::max_length(&self.field_name, max));
            }
        }
        self
    }

    pub fn matches_pattern(mut self, pattern: &Regex, message: &str) -> Self {
        if let Some(value) = &self.value {
            if !pattern.is_match(value) {
                self.errors.push(ValidationError::format(&self.field_name, message));
            }
        }
        self
    }

    pub fn email(self) -> Self {
        self.matches_pattern(email_regex(), "must be a valid email address")
    }

    pub fn donor_phone(self) -> Self {
        self.matches_pattern(donor_phone_regex(), "must be a 10-digit phone number")
    }

    pub fn indian_mobile(self) -> Self {
        self.matches_pattern(indian_mobile_regex(), "must be a valid 10-digit Indian mobile number")
    }

    pub fn one_of(mut self, allowed_values: &[&str], message: Option<&str>) -> Self {
        if let Some(value) = &self.value {
            if !allowed_values.contains(&value.as_str()) {
                let reason = message.unwrap_or("must be one of the allowed values");
                self.errors.push(ValidationError::invalid_value(&self.field_name, reason));
            }
        }
        self
    }
}

/// Uniqueness validation helper (relies on database access)
pub async fn validate_unique(
    pool: &SqlitePool,
    table: &str,
    field: &str,
    value: &str,
    field_name: &str,
) -> DomainResult<()> {
    let query = format!("SELECT COUNT(*) FROM {} WHERE {} = ?", table, field);

    let count: i64 = query_scalar(&query)
        .bind(value)
        .fetch_one(pool)
        .await
        .map_err(|e| DomainError::Database(e.into()))?;

    if count > 0 {
        return Err(DomainError::Validation(ValidationError::unique(field_name)));
    }

    Ok(())
}

// Test module with comprehensive validation tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("user.name+tag@example.co.uk"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@example"));
    }

    #[test]
    fn test_donor_phone_validation() {
        assert!(is_valid_donor_phone("9876543210"));
        assert!(is_valid_donor_phone("0123456789"));
        assert!(!is_valid_donor_phone("987654321"));
        assert!(!is_valid_donor_phone("98765432101"));
        assert!(!is_valid_donor_phone("98765 4321"));
        assert!(!is_valid_donor_phone("abcdefghij"));
    }

    #[test]
    fn test_indian_mobile_validation() {
        assert!(is_valid_indian_mobile("9876543210"));
        assert!(is_valid_indian_mobile("6000000000"));
        // Indian mobiles never start below 6
        assert!(!is_valid_indian_mobile("5876543210"));
        assert!(!is_valid_indian_mobile("0123456789"));
        assert!(!is_valid_indian_mobile("98765432"));
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("98765 43210"), "9876543210");
        assert_eq!(normalize_phone("+91 98765-43210"), "9876543210");
        assert_eq!(normalize_phone("919876543210"), "9876543210");
        assert_eq!(normalize_phone("09876543210"), "9876543210");
        // Untouched when it is already ten digits
        assert_eq!(normalize_phone("9876543210"), "9876543210");
        // Odd lengths pass through with only the digit filter applied
        assert_eq!(normalize_phone("12345"), "12345");
    }

    #[test]
    fn test_validation_builder() {
        let result = ValidationBuilder::new("name", Some("".to_string()))
            .required()
            .validate();
        assert!(result.is_err());

        let result = ValidationBuilder::new("name", Some("test".to_string()))
            .required()
            .min_length(5)
            .validate();
        assert!(result.is_err());

        let result = ValidationBuilder::new("email", Some("invalid".to_string()))
            .email()
            .validate();
        assert!(result.is_err());

        let result = ValidationBuilder::new("email", Some("valid@example.com".to_string()))
            .email()
            .validate();
        assert!(result.is_ok());

        let result = ValidationBuilder::new("mobile", Some("5876543210".to_string()))
            .indian_mobile()
            .validate();
        assert!(result.is_err());

        // Required validation for Option
        let value: Option<String> = None;
        let result = ValidationBuilder::new("name", value)
            .required()
            .validate();
        assert!(result.is_err());
    }
}
