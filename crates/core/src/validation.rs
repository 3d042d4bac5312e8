//! Input validation utilities.
//!
//! Range and finiteness checks applied to raw survey answers before anything is encoded.

use crate::{CoreError, CoreResult};

/// Validates that a measurement is finite and strictly positive.
///
/// # Errors
///
/// Returns a `CoreError::Validation` naming `field` if the value is NaN, infinite, zero or
/// negative.
pub fn validate_positive(field: &str, value: f64) -> CoreResult<f64> {
    if !value.is_finite() {
        return Err(CoreError::Validation(format!(
            "{field} must be a finite number"
        )));
    }

    if value <= 0.0 {
        return Err(CoreError::Validation(format!(
            "{field} must be greater than zero (got {value})"
        )));
    }

    Ok(value)
}

/// Validates that an integer answer lies within `min..=max`.
///
/// # Errors
///
/// Returns a `CoreError::Validation` naming `field` if the value is out of range.
pub fn validate_range<T>(field: &str, value: T, min: T, max: T) -> CoreResult<T>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if value < min || value > max {
        return Err(CoreError::Validation(format!(
            "{field} must be between {min} and {max} (got {value})"
        )));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_positive_rejects_zero_negative_and_nan() {
        assert!(validate_positive("height_cm", 0.0).is_err());
        assert!(validate_positive("height_cm", -10.0).is_err());
        assert!(validate_positive("height_cm", f64::NAN).is_err());
        assert!(validate_positive("height_cm", f64::INFINITY).is_err());
        assert_eq!(validate_positive("height_cm", 170.0).unwrap(), 170.0);
    }

    #[test]
    fn test_validate_range_is_inclusive() {
        assert_eq!(validate_range("ment_hlth", 0, 0, 30).unwrap(), 0);
        assert_eq!(validate_range("ment_hlth", 30, 0, 30).unwrap(), 30);
        let err = validate_range("ment_hlth", 31, 0, 30).expect_err("31 is out of range");
        assert!(err.to_string().contains("ment_hlth"));
    }
}
