//! Report card for a single prediction.
//!
//! Pairs a [`PredictionResult`] with the answers that produced it, decoded back from the feature
//! vector so the report always shows what the classifier actually saw.

use crate::bmi::{Bmi, BmiCategory};
use crate::classifier::DiabetesClass;
use crate::constants::DISCLAIMER;
use crate::features::{Feature, FeatureVector};
use crate::prediction::PredictionResult;
use crate::survey::{Education, GeneralHealth, Income, Ordinal, Sex, YesNo};
use serde::Serialize;
use std::fmt::Write as _;
use uuid::Uuid;

/// Highlight colour for the class and BMI rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskColour {
    Green,
    Yellow,
    Orange,
    Red,
}

impl RiskColour {
    pub fn for_class(class: DiabetesClass) -> Self {
        match class {
            DiabetesClass::NoDiabetes => RiskColour::Green,
            DiabetesClass::Prediabetes => RiskColour::Orange,
            DiabetesClass::Diabetes => RiskColour::Red,
        }
    }

    pub fn for_bmi_category(category: BmiCategory) -> Self {
        match category {
            BmiCategory::Underweight => RiskColour::Orange,
            BmiCategory::Healthy => RiskColour::Green,
            BmiCategory::Overweight => RiskColour::Yellow,
            BmiCategory::Obese => RiskColour::Red,
        }
    }

    /// CSS colour name.
    pub fn css(self) -> &'static str {
        match self {
            RiskColour::Green => "green",
            RiskColour::Yellow => "yellow",
            RiskColour::Orange => "orange",
            RiskColour::Red => "red",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub label: &'static str,
    pub value: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct Report {
    pub prediction_id: Uuid,
    pub class: DiabetesClass,
    pub class_colour: RiskColour,
    pub bmi: Bmi,
    pub bmi_category: BmiCategory,
    pub bmi_colour: RiskColour,
    pub rows: Vec<ReportRow>,
    pub disclaimer: &'static str,
}

const FLAG_ROWS: [(Feature, &str); 13] = [
    (Feature::HighBp, "High Blood Pressure"),
    (Feature::HighChol, "High Cholesterol"),
    (Feature::CholCheck, "Cholesterol Check"),
    (Feature::Smoker, "Smoker"),
    (Feature::Stroke, "Stroke"),
    (Feature::HeartDiseaseOrAttack, "Heart Disease"),
    (Feature::PhysActivity, "Physical Activity"),
    (Feature::Fruits, "Fruits Consumption"),
    (Feature::Veggies, "Vegetables Consumption"),
    (Feature::HvyAlcoholConsump, "Heavy Alcohol Consumption"),
    (Feature::AnyHealthcare, "Healthcare Coverage"),
    (Feature::NoDocBcCost, "Couldn't See Doctor Due to Cost"),
    (Feature::DiffWalk, "Difficulty Walking"),
];

fn ordinal_label<O: Ordinal>(value: f64) -> String {
    O::from_rank(value)
        .map(|o| o.label().to_string())
        .unwrap_or_else(|| format!("{value}"))
}

impl Report {
    /// Builds the report for `features` and the prediction made on them.
    pub fn new(features: &FeatureVector, result: &PredictionResult) -> Self {
        let mut rows: Vec<ReportRow> = FLAG_ROWS
            .iter()
            .map(|(feature, label)| ReportRow {
                label: *label,
                value: YesNo::from_flag(features.get(*feature)).label().to_string(),
            })
            .collect();

        rows.extend([
            ReportRow {
                label: "Sex",
                value: Sex::from_flag(features.get(Feature::Sex)).label().to_string(),
            },
            ReportRow {
                label: "Age",
                value: format!("{}", features.get(Feature::Age)),
            },
            ReportRow {
                label: "General Health",
                value: ordinal_label::<GeneralHealth>(features.get(Feature::GenHlth)),
            },
            ReportRow {
                label: "Mental Health (days not good)",
                value: format!("{}", features.get(Feature::MentHlth)),
            },
            ReportRow {
                label: "Physical Health (days not good)",
                value: format!("{}", features.get(Feature::PhysHlth)),
            },
            ReportRow {
                label: "Education Level",
                value: ordinal_label::<Education>(features.get(Feature::Education)),
            },
            ReportRow {
                label: "Income Level",
                value: ordinal_label::<Income>(features.get(Feature::Income)),
            },
        ]);

        Self {
            prediction_id: Uuid::new_v4(),
            class: result.class,
            class_colour: RiskColour::for_class(result.class),
            bmi: result.bmi,
            bmi_category: result.bmi_category,
            bmi_colour: RiskColour::for_bmi_category(result.bmi_category),
            rows,
            disclaimer: DISCLAIMER,
        }
    }

    /// Renders the report card as an HTML fragment.
    pub fn render_html(&self) -> String {
        let mut html = String::from(
            "<table class=\"report-table\">\n  <tr><th>Field</th><th>Value</th></tr>\n",
        );
        let _ = writeln!(
            html,
            "  <tr><td>Predicted Diabetes Class</td><td style=\"color: {};\"><strong>{}</strong></td></tr>",
            self.class_colour.css(),
            escape_html(self.class.label())
        );
        let _ = writeln!(
            html,
            "  <tr><td>Health Status</td><td style=\"color: {};\"><strong>{}</strong></td></tr>",
            self.bmi_colour.css(),
            escape_html(self.bmi_category.label())
        );
        let _ = writeln!(html, "  <tr><td>BMI</td><td>{}</td></tr>", self.bmi);
        for row in &self.rows {
            let _ = writeln!(
                html,
                "  <tr><td>{}</td><td>{}</td></tr>",
                escape_html(row.label),
                escape_html(&row.value)
            );
        }
        html.push_str("</table>\n");
        let _ = writeln!(
            html,
            "<p class=\"disclaimer\"><strong>Disclaimer:</strong> {}</p>",
            escape_html(self.disclaimer)
        );
        html
    }

    /// Renders the report as aligned plain text for terminals.
    pub fn render_text(&self) -> String {
        let width = self
            .rows
            .iter()
            .map(|r| r.label.len())
            .chain(["Predicted Diabetes Class".len()])
            .max()
            .unwrap_or_default();

        let mut out = String::new();
        let _ = writeln!(out, "{:<width$}  {}", "Predicted Diabetes Class", self.class.label());
        let _ = writeln!(out, "{:<width$}  {}", "Health Status", self.bmi_category.label());
        let _ = writeln!(out, "{:<width$}  {}", "BMI", self.bmi);
        for row in &self.rows {
            let _ = writeln!(out, "{:<width$}  {}", row.label, row.value);
        }
        let _ = writeln!(out, "\nDisclaimer: {}", self.disclaimer);
        out
    }
}

/// Escapes the five HTML-significant characters.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::FeatureEncoder;
    use crate::survey::SurveyResponse;

    fn encoded_defaults() -> FeatureVector {
        FeatureEncoder::new()
            .encode(&SurveyResponse::form_defaults())
            .expect("form defaults should encode")
    }

    fn result_for(features: &FeatureVector, class: DiabetesClass) -> PredictionResult {
        let bmi = Bmi::from_value(features.get(Feature::Bmi));
        PredictionResult {
            class,
            bmi,
            bmi_category: bmi.category(),
        }
    }

    #[test]
    fn test_colours_follow_class_and_category() {
        assert_eq!(RiskColour::for_class(DiabetesClass::Diabetes), RiskColour::Red);
        assert_eq!(RiskColour::for_class(DiabetesClass::Prediabetes), RiskColour::Orange);
        assert_eq!(RiskColour::for_class(DiabetesClass::NoDiabetes), RiskColour::Green);
        assert_eq!(RiskColour::for_bmi_category(BmiCategory::Underweight), RiskColour::Orange);
        assert_eq!(RiskColour::for_bmi_category(BmiCategory::Healthy), RiskColour::Green);
        assert_eq!(RiskColour::for_bmi_category(BmiCategory::Overweight), RiskColour::Yellow);
        assert_eq!(RiskColour::for_bmi_category(BmiCategory::Obese), RiskColour::Red);
    }

    #[test]
    fn test_report_has_a_row_per_answer() {
        let features = encoded_defaults();
        let report = Report::new(&features, &result_for(&features, DiabetesClass::Prediabetes));

        assert_eq!(report.rows.len(), 20);
        let general = report
            .rows
            .iter()
            .find(|r| r.label == "General Health")
            .expect("general health row");
        assert_eq!(
            general.value,
            GeneralHealth::from_rank(features.get(Feature::GenHlth))
                .unwrap()
                .label()
        );
        assert_eq!(report.disclaimer, DISCLAIMER);
    }

    #[test]
    fn test_render_html_contains_class_colour_and_disclaimer() {
        let features = encoded_defaults();
        let report = Report::new(&features, &result_for(&features, DiabetesClass::Diabetes));
        let html = report.render_html();

        assert!(html.contains("color: red;\"><strong>Diabetes</strong>"));
        assert!(html.contains(&format!("<td>BMI</td><td>{}</td>", report.bmi)));
        assert!(html.contains("Disclaimer:"));
        assert!(html.contains("Couldn&#39;t See Doctor Due to Cost"));
    }

    #[test]
    fn test_render_text_lists_every_row() {
        let features = encoded_defaults();
        let report = Report::new(&features, &result_for(&features, DiabetesClass::NoDiabetes));
        let text = report.render_text();

        assert!(text.contains("No Diabetes"));
        for row in &report.rows {
            assert!(text.contains(row.label), "missing row {}", row.label);
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<a href=\"x\">Tom & 'Jerry'</a>"),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }
}
