//! Body Mass Index calculation and banding.

use crate::validation::validate_positive;
use crate::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// Absorbs floating-point artefacts such as `18.499999999999996` at the band thresholds.
const THRESHOLD_EPSILON: f64 = 1e-9;

/// Body Mass Index: weight in kilograms divided by height in metres squared.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bmi(f64);

impl Bmi {
    /// Computes BMI from a height in centimetres and a weight in kilograms.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if either measurement is non-positive or not finite, or
    /// if the resulting BMI is not finite (e.g. a vanishingly small height). No BMI is produced
    /// in that case.
    pub fn from_measurements(height_cm: f64, weight_kg: f64) -> CoreResult<Self> {
        let height_cm = validate_positive("height_cm", height_cm)?;
        let weight_kg = validate_positive("weight_kg", weight_kg)?;

        let height_m = height_cm / 100.0;
        let value = weight_kg / (height_m * height_m);
        if !value.is_finite() {
            return Err(CoreError::Validation(format!(
                "height_cm/weight_kg: {height_cm} cm and {weight_kg} kg do not give a finite BMI"
            )));
        }
        Ok(Self(value))
    }

    /// Wraps an already computed value, e.g. the BMI column of a feature vector.
    pub fn from_value(value: f64) -> Self {
        Self(value)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// The value rounded to two decimals, as shown to respondents.
    pub fn display_value(self) -> f64 {
        (self.0 * 100.0).round() / 100.0
    }

    pub fn category(self) -> BmiCategory {
        BmiCategory::for_bmi(self)
    }
}

impl std::fmt::Display for Bmi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Weight band derived from a [`Bmi`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmiCategory {
    Underweight,
    Healthy,
    Overweight,
    Obese,
}

impl BmiCategory {
    /// Bands a BMI: `< 18.5` underweight, `18.5..=24.9` healthy, `25..=29.9` overweight,
    /// `> 29.9` obese.
    ///
    /// The raw value is compared against the thresholds, each widened by [`THRESHOLD_EPSILON`]
    /// towards its inclusive side. Values strictly between 24.9 and 25 belong to no stated band;
    /// below 24.95 they band as healthy, from 24.95 as overweight.
    pub fn for_bmi(bmi: Bmi) -> Self {
        let value = bmi.value();
        if value < 18.5 - THRESHOLD_EPSILON {
            BmiCategory::Underweight
        } else if value <= 24.9 + THRESHOLD_EPSILON {
            BmiCategory::Healthy
        } else if value < 25.0 - THRESHOLD_EPSILON {
            if value < 24.95 {
                BmiCategory::Healthy
            } else {
                BmiCategory::Overweight
            }
        } else if value <= 29.9 + THRESHOLD_EPSILON {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Healthy => "Healthy",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }
}
