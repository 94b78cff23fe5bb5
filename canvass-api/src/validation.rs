//! Validation Traits
//!
//! Common validation patterns extracted from route handlers and services.

use crate::error::{ApiError, ApiResult};

/// Trait for validating non-empty strings.
pub trait ValidateNonEmpty {
    /// Validate that the value is non-empty.
    ///
    /// # Errors
    /// Returns `ApiError::missing_field` if the value is empty or
    /// whitespace-only.
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()>;
}

impl ValidateNonEmpty for str {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        if self.trim().is_empty() {
            return Err(ApiError::missing_field(field_name));
        }
        Ok(())
    }
}

impl ValidateNonEmpty for String {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        self.as_str().validate_non_empty(field_name)
    }
}

impl<T: ValidateNonEmpty> ValidateNonEmpty for Option<T> {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        match self {
            Some(value) => value.validate_non_empty(field_name),
            None => Err(ApiError::missing_field(field_name)),
        }
    }
}

/// Trait for validating text length against inclusive character bounds.
///
/// Bounds apply to the trimmed value, counted in characters rather than
/// bytes so multi-byte text is not penalized.
pub trait ValidateLength {
    /// Validate that the trimmed value is between `min` and `max`
    /// characters (inclusive).
    fn validate_length(&self, field_name: &str, min: usize, max: usize) -> ApiResult<()>;
}

impl ValidateLength for str {
    fn validate_length(&self, field_name: &str, min: usize, max: usize) -> ApiResult<()> {
        let len = self.trim().chars().count();
        if len < min || len > max {
            return Err(ApiError::invalid_range(field_name, min, max));
        }
        Ok(())
    }
}

impl ValidateLength for String {
    fn validate_length(&self, field_name: &str, min: usize, max: usize) -> ApiResult<()> {
        self.as_str().validate_length(field_name, min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_validate_non_empty() {
        assert!("hello".validate_non_empty("test").is_ok());
        assert!("".validate_non_empty("test").is_err());
        assert!("   ".validate_non_empty("test").is_err());
        assert!("  hi  ".validate_non_empty("test").is_ok());
    }

    #[test]
    fn test_validate_non_empty_option() {
        let some: Option<String> = Some("value".to_string());
        let none: Option<String> = None;
        assert!(some.validate_non_empty("test").is_ok());
        assert!(none.validate_non_empty("test").is_err());
    }

    #[test]
    fn test_validate_length_bounds() {
        assert!("abc".validate_length("area", 3, 100).is_ok());
        assert!("ab".validate_length("area", 3, 100).is_err());
        assert!("a".repeat(101).validate_length("area", 3, 100).is_err());
        assert!("a".repeat(100).validate_length("area", 3, 100).is_ok());
    }

    #[test]
    fn test_validate_length_trims_and_counts_chars() {
        // 3 characters after trim.
        assert!("  abc  ".validate_length("area", 3, 100).is_ok());
        // Multi-byte characters count once each.
        assert!("日本語".validate_length("area", 3, 3).is_ok());
    }

    #[test]
    fn test_validate_length_error_code() {
        let err = "x".validate_length("question", 10, 1000).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRange);
        assert!(err.message.contains("question"));
    }
}
