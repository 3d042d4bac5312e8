//! Server-rendered survey form and report pages.

use glyco_core::report::escape_html;
use glyco_core::survey::{Education, GeneralHealth, Income, Ordinal, Sex, YesNo};
use glyco_core::{Report, SurveyResponse};
use serde::Deserialize;
use std::fmt::Write as _;

const STYLE: &str = r#"<style>
  body { font-family: sans-serif; max-width: 760px; margin: 2rem auto; padding: 0 1rem; }
  fieldset { margin-bottom: 1rem; }
  label { display: block; margin: 0.4rem 0; }
  .report-table { width: 100%; border-collapse: collapse; margin: 20px 0; font-size: 18px; text-align: left; }
  .report-table th, .report-table td { padding: 12px; border-bottom: 1px solid #ddd; }
  .report-table th { background-color: #f2f2f2; }
  .error { color: #b00020; }
</style>"#;

/// Yes/no questions in form order: (field name, question).
const FLAG_QUESTIONS: [(&str, &str); 13] = [
    ("high_bp", "High Blood Pressure"),
    ("high_chol", "High Cholesterol"),
    ("chol_check", "Cholesterol Check in past 5 years"),
    ("smoker", "Smoker"),
    ("stroke", "Ever had a stroke?"),
    ("heart_disease_or_attack", "Heart Disease or Attack"),
    ("phys_activity", "Physical Activity in last 30 days"),
    ("fruits", "Consumes Fruit 1+ times/day"),
    ("veggies", "Consumes Vegetables 1+ times/day"),
    ("hvy_alcohol_consump", "Heavy Alcohol Consumption"),
    ("any_healthcare", "Has any kind of healthcare coverage"),
    ("no_doc_bc_cost", "Couldn't see doctor due to cost"),
    ("diff_walk", "Difficulty Walking"),
];

/// Form submission as sent by the browser: every field is text until validated.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct SurveyForm {
    pub high_bp: String,
    pub high_chol: String,
    pub chol_check: String,
    pub smoker: String,
    pub stroke: String,
    pub heart_disease_or_attack: String,
    pub phys_activity: String,
    pub fruits: String,
    pub veggies: String,
    pub hvy_alcohol_consump: String,
    pub any_healthcare: String,
    pub no_doc_bc_cost: String,
    pub diff_walk: String,
    pub sex: String,
    pub age: String,
    pub height_cm: String,
    pub weight_kg: String,
    pub gen_hlth: String,
    pub ment_hlth: String,
    pub phys_hlth: String,
    pub education: String,
    pub income: String,
}

fn number<T: std::str::FromStr>(field: &str, raw: &str) -> Result<T, String> {
    raw.trim()
        .parse()
        .map_err(|_| format!("{field}: '{}' is not a valid number", raw.trim()))
}

impl SurveyForm {
    /// Parses the numeric fields. Choice labels are checked later by the encoder.
    pub fn into_survey(self) -> Result<SurveyResponse, String> {
        Ok(SurveyResponse {
            age: number("age", &self.age)?,
            height_cm: number("height_cm", &self.height_cm)?,
            weight_kg: number("weight_kg", &self.weight_kg)?,
            ment_hlth: number("ment_hlth", &self.ment_hlth)?,
            phys_hlth: number("phys_hlth", &self.phys_hlth)?,
            high_bp: self.high_bp,
            high_chol: self.high_chol,
            chol_check: self.chol_check,
            smoker: self.smoker,
            stroke: self.stroke,
            heart_disease_or_attack: self.heart_disease_or_attack,
            phys_activity: self.phys_activity,
            fruits: self.fruits,
            veggies: self.veggies,
            hvy_alcohol_consump: self.hvy_alcohol_consump,
            any_healthcare: self.any_healthcare,
            no_doc_bc_cost: self.no_doc_bc_cost,
            diff_walk: self.diff_walk,
            sex: self.sex,
            gen_hlth: self.gen_hlth,
            education: self.education,
            income: self.income,
        })
    }
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n{STYLE}\n</head>\n<body>\n<h1>{title}</h1>\n{body}</body>\n</html>\n",
        title = escape_html(title),
    )
}

fn radio(out: &mut String, name: &str, question: &str, options: &[&str], selected: &str) {
    let _ = write!(out, "<label>{}<br>", escape_html(question));
    for option in options {
        let checked = if *option == selected { " checked" } else { "" };
        let _ = write!(
            out,
            " <input type=\"radio\" name=\"{name}\" value=\"{value}\"{checked}> {value}",
            value = escape_html(option)
        );
    }
    out.push_str("</label>\n");
}

fn select<S: AsRef<str>>(
    out: &mut String,
    name: &str,
    question: &str,
    options: &[S],
    selected: &str,
) {
    let _ = write!(
        out,
        "<label>{}<br><select name=\"{name}\">",
        escape_html(question)
    );
    for option in options {
        let option = option.as_ref();
        let chosen = if option == selected { " selected" } else { "" };
        let _ = write!(
            out,
            "<option value=\"{value}\"{chosen}>{value}</option>",
            value = escape_html(option)
        );
    }
    out.push_str("</select></label>\n");
}

fn number_input(out: &mut String, name: &str, question: &str, min: u32, max: u32, value: f64) {
    let _ = writeln!(
        out,
        "<label>{}<br><input type=\"number\" name=\"{name}\" min=\"{min}\" max=\"{max}\" step=\"1\" value=\"{value}\"></label>",
        escape_html(question)
    );
}

/// The survey form, pre-filled with [`SurveyResponse::form_defaults`].
pub fn survey_form_page() -> String {
    let defaults = SurveyResponse::form_defaults();
    let yes_no = [YesNo::Yes.label(), YesNo::No.label()];
    let days: Vec<String> = (0..=30).map(|d| d.to_string()).collect();
    let mut body = String::from("<form method=\"post\" action=\"/report\">\n");

    body.push_str("<fieldset><legend>Basic Information</legend>\n");
    radio(
        &mut body,
        "sex",
        "Sex",
        &[Sex::Male.label(), Sex::Female.label()],
        &defaults.sex,
    );
    number_input(&mut body, "age", "Enter your age:", 0, 120, f64::from(defaults.age));
    body.push_str("</fieldset>\n");

    body.push_str("<fieldset><legend>BMI Calculator</legend>\n");
    number_input(
        &mut body,
        "height_cm",
        "Enter your height (in centimeters):",
        50,
        250,
        defaults.height_cm,
    );
    number_input(
        &mut body,
        "weight_kg",
        "Enter your weight (in kilograms):",
        10,
        300,
        defaults.weight_kg,
    );
    body.push_str("</fieldset>\n");

    body.push_str("<fieldset><legend>Health Conditions</legend>\n");
    for (name, question) in FLAG_QUESTIONS {
        radio(&mut body, name, question, &yes_no, YesNo::No.label());
    }
    body.push_str("</fieldset>\n");

    body.push_str("<fieldset><legend>General Health</legend>\n");
    select(
        &mut body,
        "gen_hlth",
        "General Health",
        &GeneralHealth::labels(),
        &defaults.gen_hlth,
    );
    select(
        &mut body,
        "ment_hlth",
        "Mental Health (days not good in last 30 days)",
        &days,
        "0",
    );
    select(
        &mut body,
        "phys_hlth",
        "Physical Health (days not good in last 30 days)",
        &days,
        "0",
    );
    body.push_str("</fieldset>\n");

    body.push_str("<fieldset><legend>Socioeconomic Information</legend>\n");
    select(
        &mut body,
        "education",
        "Education Level",
        &Education::labels(),
        &defaults.education,
    );
    select(
        &mut body,
        "income",
        "Income Level",
        &Income::labels(),
        &defaults.income,
    );
    body.push_str("</fieldset>\n");

    body.push_str("<button type=\"submit\">Predict Diabetes</button>\n</form>\n");
    page("Diabetes Prediction App", &body)
}

pub fn report_page(report: &Report) -> String {
    let mut body = report.render_html();
    body.push_str("<p><a href=\"/\">Start again</a></p>\n");
    page("Diabetes Report", &body)
}

pub fn error_page(message: &str) -> String {
    let body = format!(
        "<p class=\"error\">{}</p>\n<p><a href=\"/\">Back to the survey</a></p>\n",
        escape_html(message)
    );
    page("Please check your answers", &body)
}
