//! Conversions between protobuf messages and core types.

use crate::pb;
use glyco_core::{ModelInfo, Report, SurveyResponse};

pub fn survey_from_request(req: pb::PredictReq) -> SurveyResponse {
    SurveyResponse {
        high_bp: req.high_bp,
        high_chol: req.high_chol,
        chol_check: req.chol_check,
        smoker: req.smoker,
        stroke: req.stroke,
        heart_disease_or_attack: req.heart_disease_or_attack,
        phys_activity: req.phys_activity,
        fruits: req.fruits,
        veggies: req.veggies,
        hvy_alcohol_consump: req.hvy_alcohol_consump,
        any_healthcare: req.any_healthcare,
        no_doc_bc_cost: req.no_doc_bc_cost,
        diff_walk: req.diff_walk,
        sex: req.sex,
        age: req.age,
        height_cm: req.height_cm,
        weight_kg: req.weight_kg,
        gen_hlth: req.gen_hlth,
        ment_hlth: req.ment_hlth,
        phys_hlth: req.phys_hlth,
        education: req.education,
        income: req.income,
    }
}

pub fn request_from_survey(survey: SurveyResponse) -> pb::PredictReq {
    pb::PredictReq {
        high_bp: survey.high_bp,
        high_chol: survey.high_chol,
        chol_check: survey.chol_check,
        smoker: survey.smoker,
        stroke: survey.stroke,
        heart_disease_or_attack: survey.heart_disease_or_attack,
        phys_activity: survey.phys_activity,
        fruits: survey.fruits,
        veggies: survey.veggies,
        hvy_alcohol_consump: survey.hvy_alcohol_consump,
        any_healthcare: survey.any_healthcare,
        no_doc_bc_cost: survey.no_doc_bc_cost,
        diff_walk: survey.diff_walk,
        sex: survey.sex,
        age: survey.age,
        height_cm: survey.height_cm,
        weight_kg: survey.weight_kg,
        gen_hlth: survey.gen_hlth,
        ment_hlth: survey.ment_hlth,
        phys_hlth: survey.phys_hlth,
        education: survey.education,
        income: survey.income,
    }
}

pub fn predict_response(report: &Report) -> pb::PredictRes {
    pb::PredictRes {
        prediction_id: report.prediction_id.to_string(),
        predicted_class: report.class.label().to_string(),
        class_value: report.class.class_value(),
        class_colour: report.class_colour.css().to_string(),
        bmi: report.bmi.display_value(),
        bmi_category: report.bmi_category.label().to_string(),
        bmi_colour: report.bmi_colour.css().to_string(),
        rows: report
            .rows
            .iter()
            .map(|row| pb::ReportRow {
                label: row.label.to_string(),
                value: row.value.clone(),
            })
            .collect(),
        disclaimer: report.disclaimer.to_string(),
    }
}

pub fn model_info_response(info: &ModelInfo) -> pb::ModelInfoRes {
    pb::ModelInfoRes {
        schema: info.schema.clone(),
        feature_names: info.feature_names.clone(),
        classes: info.classes.clone(),
        tree_count: info.tree_count as u64,
        trained_at: info.trained_at.to_rfc3339(),
        training_rows: info.training_rows as u64,
        checksum: info.checksum.clone().unwrap_or_default(),
    }
}
