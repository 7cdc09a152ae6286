//! Column layout of the placement dataset and the inference-side record types

use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Row identifier present in raw data, dropped before modeling
pub const ID_COLUMN: &str = "sl_no";

/// Post-placement salary present in raw data, dropped before modeling
pub const SALARY_COLUMN: &str = "salary";

/// Placement outcome label
pub const LABEL_COLUMN: &str = "status";

/// Raw label spelling for a positive outcome
pub const LABEL_PLACED: &str = "Placed";

/// Raw label spelling for a negative outcome
pub const LABEL_NOT_PLACED: &str = "Not Placed";

/// The twelve feature columns, in the order the form supplies them
pub const FEATURE_COLUMNS: [&str; 12] = [
    "gender",
    "ssc_p",
    "ssc_b",
    "hsc_p",
    "hsc_b",
    "hsc_s",
    "degree_p",
    "degree_t",
    "workex",
    "etest_p",
    "specialisation",
    "mba_p",
];

/// Columns one-hot encoded by the pipeline
pub const CATEGORICAL_COLUMNS: [&str; 7] = [
    "gender",
    "ssc_b",
    "hsc_b",
    "hsc_s",
    "degree_t",
    "workex",
    "specialisation",
];

/// Percentage columns standardized by the pipeline
pub const NUMERIC_COLUMNS: [&str; 5] = ["ssc_p", "hsc_p", "degree_p", "etest_p", "mba_p"];

/// Column whose gaps are filled with the mean before training
pub const IMPUTED_COLUMN: &str = "mba_p";

/// Canonical vocabulary for each categorical column, as offered by the form
pub fn vocabulary(column: &str) -> &'static [&'static str] {
    match column {
        "gender" => &["Male", "Female"],
        "ssc_b" | "hsc_b" => &["Central", "Others"],
        "hsc_s" => &["Science", "Commerce", "Arts"],
        "degree_t" => &["Sci&Tech", "Comm&Mgmt", "Others"],
        "workex" => &["Yes", "No"],
        "specialisation" => &["Mkt&HR", "Mkt&Fin"],
        _ => &[],
    }
}

/// One applicant's feature values as collected by the form.
///
/// Categorical fields are plain strings so values outside the trained
/// vocabulary can still be submitted; the pipeline encodes those as unknown.
/// Percentages are not range-checked here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub gender: String,
    pub ssc_p: f64,
    pub ssc_b: String,
    pub hsc_p: f64,
    pub hsc_b: String,
    pub hsc_s: String,
    pub degree_p: f64,
    pub degree_t: String,
    pub workex: String,
    pub etest_p: f64,
    pub specialisation: String,
    pub mba_p: f64,
}

impl StudentProfile {
    /// Build the single-row frame the pipeline expects
    pub fn to_frame(&self) -> Result<DataFrame> {
        let df = df!(
            "gender" => [self.gender.as_str()],
            "ssc_p" => [self.ssc_p],
            "ssc_b" => [self.ssc_b.as_str()],
            "hsc_p" => [self.hsc_p],
            "hsc_b" => [self.hsc_b.as_str()],
            "hsc_s" => [self.hsc_s.as_str()],
            "degree_p" => [self.degree_p],
            "degree_t" => [self.degree_t.as_str()],
            "workex" => [self.workex.as_str()],
            "etest_p" => [self.etest_p],
            "specialisation" => [self.specialisation.as_str()],
            "mba_p" => [self.mba_p]
        )?;
        Ok(df)
    }

    /// The reference applicant used for regression checks
    pub fn example() -> Self {
        Self {
            gender: "Male".to_string(),
            ssc_p: 67.0,
            ssc_b: "Others".to_string(),
            hsc_p: 91.0,
            hsc_b: "Others".to_string(),
            hsc_s: "Commerce".to_string(),
            degree_p: 58.0,
            degree_t: "Sci&Tech".to_string(),
            workex: "No".to_string(),
            etest_p: 55.0,
            specialisation: "Mkt&HR".to_string(),
            mba_p: 58.8,
        }
    }
}

/// Predicted placement outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    Placed,
    NotPlaced,
}

impl Placement {
    /// Map a classifier output (0.0 / 1.0) to an outcome
    pub fn from_label(label: f64) -> Self {
        if label >= 0.5 {
            Placement::Placed
        } else {
            Placement::NotPlaced
        }
    }

    /// Numeric label used in training data
    pub fn label(self) -> u8 {
        match self {
            Placement::Placed => 1,
            Placement::NotPlaced => 0,
        }
    }

    pub fn is_placed(self) -> bool {
        matches!(self, Placement::Placed)
    }

    /// The message shown to the user for this outcome
    pub fn message(self) -> &'static str {
        match self {
            Placement::Placed => "✅ The student is likely to be PLACED.",
            Placement::NotPlaced => "❌ The student is likely to NOT be placed.",
        }
    }
}

impl std::fmt::Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Placement::Placed => write!(f, "placed"),
            Placement::NotPlaced => write!(f, "not placed"),
        }
    }
}
