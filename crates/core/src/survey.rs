//! Raw survey answers and the closed answer vocabularies.
//!
//! A [`SurveyResponse`] holds exactly what a respondent submitted: human-readable labels for
//! choice questions and plain numbers for measurements. Nothing here is trusted; the
//! [`FeatureEncoder`](crate::encoder::FeatureEncoder) parses every label against the tables below
//! and rejects anything it does not recognise.

use crate::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// Match a submitted label against a closed list, ignoring surrounding whitespace and ASCII case.
fn match_label<T: Copy>(field: &str, input: &str, table: &[(T, &'static str)]) -> CoreResult<T> {
    let needle = input.trim();
    table
        .iter()
        .find(|(_, label)| label.eq_ignore_ascii_case(needle))
        .map(|(value, _)| *value)
        .ok_or_else(|| {
            let allowed: Vec<&str> = table.iter().map(|(_, label)| *label).collect();
            CoreError::Validation(format!(
                "{field}: unknown answer '{needle}' (expected one of: {})",
                allowed.join(", ")
            ))
        })
}

// ============================================================================
// ANSWER VOCABULARIES
// ============================================================================

/// Answer to a yes/no question.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    const TABLE: [(YesNo, &'static str); 2] = [(YesNo::Yes, "Yes"), (YesNo::No, "No")];

    pub fn parse(field: &str, input: &str) -> CoreResult<Self> {
        match_label(field, input, &Self::TABLE)
    }

    pub fn from_flag(value: f64) -> Self {
        if value >= 0.5 {
            YesNo::Yes
        } else {
            YesNo::No
        }
    }

    pub fn value(self) -> f64 {
        match self {
            YesNo::Yes => 1.0,
            YesNo::No => 0.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            YesNo::Yes => "Yes",
            YesNo::No => "No",
        }
    }
}

/// Biological sex as recorded by the survey.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    const TABLE: [(Sex, &'static str); 2] = [(Sex::Male, "Male"), (Sex::Female, "Female")];

    pub fn parse(input: &str) -> CoreResult<Self> {
        match_label("sex", input, &Self::TABLE)
    }

    pub fn from_flag(value: f64) -> Self {
        if value >= 0.5 {
            Sex::Male
        } else {
            Sex::Female
        }
    }

    pub fn value(self) -> f64 {
        match self {
            Sex::Male => 1.0,
            Sex::Female => 0.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
        }
    }
}

/// An ordinal answer: a label with a fixed integer rank starting at 1.
pub trait Ordinal: Copy + Sized + 'static {
    /// Name of the survey field, used in validation messages.
    const FIELD: &'static str;
    /// Every answer in rank order.
    const TABLE: &'static [(Self, &'static str)];

    fn parse(input: &str) -> CoreResult<Self> {
        match_label(Self::FIELD, input, Self::TABLE)
    }

    /// 1-based rank used as the feature value.
    fn rank(self) -> u8;

    fn label(self) -> &'static str {
        Self::TABLE[usize::from(self.rank()) - 1].1
    }

    /// Inverse of [`Ordinal::rank`]; `None` for ranks outside the table.
    fn from_rank(rank: f64) -> Option<Self> {
        if rank.fract() != 0.0 || rank < 1.0 {
            return None;
        }
        Self::TABLE.get(rank as usize - 1).map(|(value, _)| *value)
    }

    /// All labels in rank order, for rendering choice lists.
    fn labels() -> Vec<&'static str> {
        Self::TABLE.iter().map(|(_, label)| *label).collect()
    }
}

/// Self-rated general health (GenHlth).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeneralHealth {
    Excellent = 1,
    VeryGood = 2,
    Good = 3,
    Fair = 4,
    Poor = 5,
}

impl Ordinal for GeneralHealth {
    const FIELD: &'static str = "gen_hlth";
    const TABLE: &'static [(Self, &'static str)] = &[
        (GeneralHealth::Excellent, "Excellent"),
        (GeneralHealth::VeryGood, "Very Good"),
        (GeneralHealth::Good, "Good"),
        (GeneralHealth::Fair, "Fair"),
        (GeneralHealth::Poor, "Poor"),
    ];

    fn rank(self) -> u8 {
        self as u8
    }
}

/// Highest education level completed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Education {
    NeverAttended = 1,
    Elementary = 2,
    SomeHighSchool = 3,
    HighSchoolGraduate = 4,
    SomeCollege = 5,
    CollegeGraduate = 6,
}

impl Ordinal for Education {
    const FIELD: &'static str = "education";
    const TABLE: &'static [(Self, &'static str)] = &[
        (Education::NeverAttended, "Never attended school"),
        (Education::Elementary, "Elementary school"),
        (Education::SomeHighSchool, "Some high school"),
        (Education::HighSchoolGraduate, "High school graduate"),
        (Education::SomeCollege, "Some college"),
        (Education::CollegeGraduate, "College graduate"),
    ];

    fn rank(self) -> u8 {
        self as u8
    }
}

/// Annual household income bracket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Income {
    Below10k = 1,
    From10kTo15k = 2,
    From15kTo20k = 3,
    From20kTo25k = 4,
    From25kTo35k = 5,
    From35kTo50k = 6,
    From50kTo75k = 7,
    Above75k = 8,
}

impl Ordinal for Income {
    const FIELD: &'static str = "income";
    const TABLE: &'static [(Self, &'static str)] = &[
        (Income::Below10k, "Less than $10,000"),
        (Income::From10kTo15k, "$10,000 to $15,000"),
        (Income::From15kTo20k, "$15,000 to $20,000"),
        (Income::From20kTo25k, "$20,000 to $25,000"),
        (Income::From25kTo35k, "$25,000 to $35,000"),
        (Income::From35kTo50k, "$35,000 to $50,000"),
        (Income::From50kTo75k, "$50,000 to $75,000"),
        (Income::Above75k, "$75,000 or more"),
    ];

    fn rank(self) -> u8 {
        self as u8
    }
}

// ============================================================================
// SURVEY RESPONSE
// ============================================================================

/// One respondent's raw answers, as submitted by a form, JSON body or CLI file.
///
/// Choice answers are kept as the labels the respondent saw (`"Yes"`, `"Very Good"`,
/// `"$35,000 to $50,000"`, ...). Measurements are plain numbers in the units named by the field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurveyResponse {
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
    pub age: u32,
    pub height_cm: f64,
    pub weight_kg: f64,

    pub gen_hlth: String,
    pub ment_hlth: i32,
    pub phys_hlth: i32,

    pub education: String,
    pub income: String,
}

impl SurveyResponse {
    /// The form's initial state: every flag `No`, 25 years old, 170 cm, 70 kg, "Good" health,
    /// zero bad days, high-school graduate on the lowest income bracket.
    pub fn form_defaults() -> Self {
        let no = || YesNo::No.label().to_string();
        Self {
            high_bp: no(),
            high_chol: no(),
            chol_check: no(),
            smoker: no(),
            stroke: no(),
            heart_disease_or_attack: no(),
            phys_activity: no(),
            fruits: no(),
            veggies: no(),
            hvy_alcohol_consump: no(),
            any_healthcare: no(),
            no_doc_bc_cost: no(),
            diff_walk: no(),
            sex: Sex::Male.label().to_string(),
            age: 25,
            height_cm: 170.0,
            weight_kg: 70.0,
            gen_hlth: GeneralHealth::Good.label().to_string(),
            ment_hlth: 0,
            phys_hlth: 0,
            education: Education::HighSchoolGraduate.label().to_string(),
            income: Income::Below10k.label().to_string(),
        }
    }
}
