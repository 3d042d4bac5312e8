//! Survey-to-feature encoding.
//!
//! [`FeatureEncoder::encode`] is the only way a [`SurveyResponse`] becomes a [`FeatureVector`].
//! Every answer is validated first; on any error no vector is produced, so a prediction can never
//! run on a half-encoded or stale row.

use crate::bmi::Bmi;
use crate::constants::{AGE_MAX, HEALTH_DAYS_MAX};
use crate::features::{Feature, FeatureVector, FEATURE_COUNT};
use crate::survey::{Education, GeneralHealth, Income, Ordinal, Sex, SurveyResponse, YesNo};
use crate::validation::validate_range;
use crate::CoreResult;

/// Maps raw survey answers onto the classifier's input schema.
#[derive(Clone, Copy, Debug, Default)]
pub struct FeatureEncoder;

impl FeatureEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Encodes one survey response.
    ///
    /// - yes/no answers become `1`/`0`, `Male`/`Female` become `1`/`0`
    /// - BMI is computed from height (cm) and weight (kg)
    /// - general health, education and income labels become their 1-based ranks
    /// - mental/physical "days not good" and age are copied as-is after range checks
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if:
    /// - any choice answer is not one of its known labels,
    /// - height or weight is non-positive or not finite, or they give a non-finite BMI,
    /// - age is above 120, or either day count is outside `0..=30`.
    pub fn encode(&self, response: &SurveyResponse) -> CoreResult<FeatureVector> {
        let flag = |field: &str, answer: &str| YesNo::parse(field, answer).map(YesNo::value);

        let bmi = Bmi::from_measurements(response.height_cm, response.weight_kg)?;
        let age = validate_range("age", response.age, 0, AGE_MAX)?;
        let ment_hlth = validate_range("ment_hlth", response.ment_hlth, 0, HEALTH_DAYS_MAX)?;
        let phys_hlth = validate_range("phys_hlth", response.phys_hlth, 0, HEALTH_DAYS_MAX)?;

        let mut values = [0.0; FEATURE_COUNT];
        let mut set = |feature: Feature, value: f64| values[feature.index()] = value;

        set(Feature::HighBp, flag("high_bp", &response.high_bp)?);
        set(Feature::HighChol, flag("high_chol", &response.high_chol)?);
        set(Feature::CholCheck, flag("chol_check", &response.chol_check)?);
        set(Feature::Bmi, bmi.value());
        set(Feature::Smoker, flag("smoker", &response.smoker)?);
        set(Feature::Stroke, flag("stroke", &response.stroke)?);
        set(
            Feature::HeartDiseaseOrAttack,
            flag("heart_disease_or_attack", &response.heart_disease_or_attack)?,
        );
        set(Feature::PhysActivity, flag("phys_activity", &response.phys_activity)?);
        set(Feature::Fruits, flag("fruits", &response.fruits)?);
        set(Feature::Veggies, flag("veggies", &response.veggies)?);
        set(
            Feature::HvyAlcoholConsump,
            flag("hvy_alcohol_consump", &response.hvy_alcohol_consump)?,
        );
        set(Feature::AnyHealthcare, flag("any_healthcare", &response.any_healthcare)?);
        set(Feature::NoDocBcCost, flag("no_doc_bc_cost", &response.no_doc_bc_cost)?);
        set(
            Feature::GenHlth,
            f64::from(GeneralHealth::parse(&response.gen_hlth)?.rank()),
        );
        set(Feature::MentHlth, f64::from(ment_hlth));
        set(Feature::PhysHlth, f64::from(phys_hlth));
        set(Feature::DiffWalk, flag("diff_walk", &response.diff_walk)?);
        set(Feature::Sex, Sex::parse(&response.sex)?.value());
        set(Feature::Age, f64::from(age));
        set(
            Feature::Education,
            f64::from(Education::parse(&response.education)?.rank()),
        );
        set(Feature::Income, f64::from(Income::parse(&response.income)?.rank()));

        Ok(FeatureVector::new(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_response() -> SurveyResponse {
        SurveyResponse {
            high_bp: "Yes".into(),
            high_chol: "No".into(),
            chol_check: "Yes".into(),
            smoker: "No".into(),
            stroke: "No".into(),
            heart_disease_or_attack: "Yes".into(),
            phys_activity: "Yes".into(),
            fruits: "No".into(),
            veggies: "Yes".into(),
            hvy_alcohol_consump: "No".into(),
            any_healthcare: "Yes".into(),
            no_doc_bc_cost: "No".into(),
            diff_walk: "Yes".into(),
            sex: "Female".into(),
            age: 57,
            height_cm: 160.0,
            weight_kg: 64.0,
            gen_hlth: "Fair".into(),
            ment_hlth: 3,
            phys_hlth: 14,
            education: "Some college".into(),
            income: "$25,000 to $35,000".into(),
        }
    }

    #[test]
    fn test_encode_produces_fixed_order_vector() {
        let vector = FeatureEncoder::new()
            .encode(&sample_response())
            .expect("valid response should encode");

        let expected = [
            1.0, 0.0, 1.0, 25.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 4.0, 3.0, 14.0, 1.0,
            0.0, 57.0, 5.0, 5.0,
        ];
        assert_eq!(vector.as_slice().len(), FEATURE_COUNT);
        for (i, (actual, expected)) in vector.as_slice().iter().zip(expected).enumerate() {
            assert!(
                (actual - expected).abs() < 1e-9,
                "feature {} ({}) was {actual}, expected {expected}",
                i,
                Feature::ALL[i].name()
            );
        }
    }

    #[test]
    fn test_encode_rejects_non_positive_height() {
        let mut response = sample_response();
        response.height_cm = 0.0;
        let err = FeatureEncoder::new()
            .encode(&response)
            .expect_err("zero height should fail");
        assert!(err.is_validation());

        response.height_cm = -5.0;
        assert!(FeatureEncoder::new().encode(&response).is_err());
    }

    #[test]
    fn test_encode_rejects_height_giving_infinite_bmi() {
        let mut response = sample_response();
        response.height_cm = 1e-200;
        let err = FeatureEncoder::new()
            .encode(&response)
            .expect_err("infinite BMI should fail");
        assert!(err.is_validation());
    }

    #[test]
    fn test_encode_rejects_unknown_labels() {
        let encoder = FeatureEncoder::new();

        let mut response = sample_response();
        response.education = "PhD".into();
        assert!(encoder.encode(&response).unwrap_err().is_validation());

        let mut response = sample_response();
        response.gen_hlth = "Great".into();
        assert!(encoder.encode(&response).unwrap_err().is_validation());

        let mut response = sample_response();
        response.income = "$1,000,000".into();
        assert!(encoder.encode(&response).unwrap_err().is_validation());

        let mut response = sample_response();
        response.stroke = "maybe".into();
        assert!(encoder.encode(&response).unwrap_err().is_validation());
    }

    #[test]
    fn test_encode_rejects_out_of_range_days_and_age() {
        let encoder = FeatureEncoder::new();

        let mut response = sample_response();
        response.ment_hlth = 31;
        assert!(encoder.encode(&response).is_err());

        let mut response = sample_response();
        response.phys_hlth = -1;
        assert!(encoder.encode(&response).is_err());

        let mut response = sample_response();
        response.age = 121;
        assert!(encoder.encode(&response).is_err());
    }

    #[test]
    fn test_encode_accepts_day_bounds() {
        let mut response = sample_response();
        response.ment_hlth = 0;
        response.phys_hlth = 30;
        let vector = FeatureEncoder::new().encode(&response).unwrap();
        assert_eq!(vector.get(Feature::MentHlth), 0.0);
        assert_eq!(vector.get(Feature::PhysHlth), 30.0);
    }
}
