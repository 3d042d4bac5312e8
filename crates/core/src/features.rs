//! The classifier's input schema.
//!
//! The order of [`Feature`] is the column order the classifier was trained on. It is recorded in
//! every artifact and checked when an artifact is loaded; reordering the enum without retraining
//! makes every existing artifact unloadable.

use serde::{Deserialize, Serialize};

/// Number of columns in a [`FeatureVector`].
pub const FEATURE_COUNT: usize = 21;

/// One column of the feature vector, in training order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Feature {
    HighBp,
    HighChol,
    CholCheck,
    Bmi,
    Smoker,
    Stroke,
    HeartDiseaseOrAttack,
    PhysActivity,
    Fruits,
    Veggies,
    HvyAlcoholConsump,
    AnyHealthcare,
    NoDocBcCost,
    GenHlth,
    MentHlth,
    PhysHlth,
    DiffWalk,
    Sex,
    Age,
    Education,
    Income,
}

/// Dataset column names, indexed by [`Feature::index`].
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "HighBP",
    "HighChol",
    "CholCheck",
    "BMI",
    "Smoker",
    "Stroke",
    "HeartDiseaseorAttack",
    "PhysActivity",
    "Fruits",
    "Veggies",
    "HvyAlcoholConsump",
    "AnyHealthcare",
    "NoDocbcCost",
    "GenHlth",
    "MentHlth",
    "PhysHlth",
    "DiffWalk",
    "Sex",
    "Age",
    "Education",
    "Income",
];

impl Feature {
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::HighBp,
        Feature::HighChol,
        Feature::CholCheck,
        Feature::Bmi,
        Feature::Smoker,
        Feature::Stroke,
        Feature::HeartDiseaseOrAttack,
        Feature::PhysActivity,
        Feature::Fruits,
        Feature::Veggies,
        Feature::HvyAlcoholConsump,
        Feature::AnyHealthcare,
        Feature::NoDocBcCost,
        Feature::GenHlth,
        Feature::MentHlth,
        Feature::PhysHlth,
        Feature::DiffWalk,
        Feature::Sex,
        Feature::Age,
        Feature::Education,
        Feature::Income,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Column name in the training dataset.
    pub fn name(self) -> &'static str {
        FEATURE_NAMES[self.index()]
    }
}

/// A fixed-order row of 21 numeric features.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.0[feature.index()]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_order_matches_names() {
        assert_eq!(Feature::ALL.len(), FEATURE_COUNT);
        for (i, feature) in Feature::ALL.iter().enumerate() {
            assert_eq!(feature.index(), i);
        }
        assert_eq!(Feature::Bmi.name(), "BMI");
        assert_eq!(Feature::HeartDiseaseOrAttack.name(), "HeartDiseaseorAttack");
        assert_eq!(Feature::Income.name(), "Income");
    }

    #[test]
    fn test_get_reads_the_feature_column() {
        let mut values = [0.0; FEATURE_COUNT];
        values[Feature::Age.index()] = 42.0;
        let vector = FeatureVector::new(values);
        assert_eq!(vector.get(Feature::Age), 42.0);
        assert_eq!(vector.as_slice()[Feature::Age.index()], 42.0);
    }
}
