//! The classifier capability and its output vocabulary.
//!
//! Serving code depends only on [`Classifier`]; the artifact-backed random forest is one
//! implementation and tests substitute fixed-output stubs.

use crate::features::FeatureVector;
use crate::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// Pure inference: one feature row in, one raw class value out.
///
/// Implementations must be safe to call concurrently from many sessions on a shared instance.
pub trait Classifier: Send + Sync {
    /// Returns the raw class value for `features`.
    ///
    /// The value is not range-checked here; mapping it to a [`DiabetesClass`] is the caller's job.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Classifier` if inference itself cannot run.
    fn predict(&self, features: &FeatureVector) -> CoreResult<i64>;
}

impl<C: Classifier + ?Sized> Classifier for std::sync::Arc<C> {
    fn predict(&self, features: &FeatureVector) -> CoreResult<i64> {
        (**self).predict(features)
    }
}

/// Predicted diabetes status (`Diabetes_012`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiabetesClass {
    NoDiabetes,
    Prediabetes,
    Diabetes,
}

impl DiabetesClass {
    /// Maps a raw class value: `0` no diabetes, `1` prediabetes, `2` diabetes.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::UnexpectedClassLabel` for any other value.
    pub fn from_class_value(value: i64) -> CoreResult<Self> {
        match value {
            0 => Ok(DiabetesClass::NoDiabetes),
            1 => Ok(DiabetesClass::Prediabetes),
            2 => Ok(DiabetesClass::Diabetes),
            other => Err(CoreError::UnexpectedClassLabel(other)),
        }
    }

    pub fn class_value(self) -> i64 {
        match self {
            DiabetesClass::NoDiabetes => 0,
            DiabetesClass::Prediabetes => 1,
            DiabetesClass::Diabetes => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DiabetesClass::NoDiabetes => "No Diabetes",
            DiabetesClass::Prediabetes => "Prediabetes",
            DiabetesClass::Diabetes => "Diabetes",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_mapping_is_total_over_known_values() {
        assert_eq!(DiabetesClass::from_class_value(0).unwrap(), DiabetesClass::NoDiabetes);
        assert_eq!(DiabetesClass::from_class_value(1).unwrap(), DiabetesClass::Prediabetes);
        assert_eq!(DiabetesClass::from_class_value(2).unwrap(), DiabetesClass::Diabetes);
        for class in [
            DiabetesClass::NoDiabetes,
            DiabetesClass::Prediabetes,
            DiabetesClass::Diabetes,
        ] {
            assert_eq!(
                DiabetesClass::from_class_value(class.class_value()).unwrap(),
                class
            );
        }
    }

    #[test]
    fn test_unknown_class_values_are_reported() {
        for value in [-1, 3, 42, i64::MAX] {
            let err = DiabetesClass::from_class_value(value).expect_err("should be rejected");
            assert!(matches!(err, CoreError::UnexpectedClassLabel(v) if v == value));
        }
    }
}
