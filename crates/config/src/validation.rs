//! Validation system for settings values
//!
//! Each settings section implements the `ConfigSection` trait which includes validation.

pub use crate::error::ValidationError;

/// Trait for settings sections that can validate themselves
pub trait ConfigSection: Default {
    /// Validates the section
    ///
    /// Returns a list of validation errors. Empty list means valid.
    fn validate(&self) -> Result<(), Vec<ValidationError>>;
}

/// Common validators for settings values
pub struct Validator;

impl Validator {
    /// Validates that a numeric value is strictly greater than zero
    pub fn positive<T>(value: T, field: &str) -> Result<(), ValidationError>
    where
        T: PartialOrd + Default + std::fmt::Display + Copy,
    {
        if value <= T::default() {
            Err(ValidationError::with_value(
                field,
                "must be greater than zero",
                value,
            ))
        } else {
            Ok(())
        }
    }

    /// Validates that a numeric value is within a range
    pub fn in_range<T>(value: T, min: T, max: T, field: &str) -> Result<(), ValidationError>
    where
        T: PartialOrd + std::fmt::Display + Copy,
    {
        if value < min || value > max {
            Err(ValidationError::with_value(
                field,
                format!("must be between {} and {}", min, max),
                value,
            ))
        } else {
            Ok(())
        }
    }

    /// Collects multiple validation results into a single result
    pub fn collect_errors(
        results: Vec<Result<(), ValidationError>>,
    ) -> Result<(), Vec<ValidationError>> {
        let errors: Vec<ValidationError> = results.into_iter().filter_map(|r| r.err()).collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive() {
        assert!(Validator::positive(1, "test").is_ok());
        assert!(Validator::positive(0, "test").is_err());
        assert!(Validator::positive(-3, "test").is_err());
    }

    #[test]
    fn test_in_range_valid() {
        assert!(Validator::in_range(50, 0, 100, "test").is_ok());
        assert!(Validator::in_range(0, 0, 100, "test").is_ok());
        assert!(Validator::in_range(100, 0, 100, "test").is_ok());
    }

    #[test]
    fn test_in_range_invalid() {
        assert!(Validator::in_range(-1, 0, 100, "test").is_err());
        assert!(Validator::in_range(101, 0, 100, "test").is_err());
    }

    #[test]
    fn test_collect_errors_all_ok() {
        let results = vec![Ok(()), Ok(()), Ok(())];
        assert!(Validator::collect_errors(results).is_ok());
    }

    #[test]
    fn test_collect_errors_some_err() {
        let results = vec![
            Ok(()),
            Err(ValidationError::new("field1", "error1")),
            Ok(()),
            Err(ValidationError::new("field2", "error2")),
        ];
        let result = Validator::collect_errors(results);
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().len(), 2);
    }
}
