//! Staged survey responses.
//!
//! Each survey export is mapped row-by-row into one of these records and
//! upserted into its own collection before consolidation. Free-text answers
//! are kept as trimmed strings (empty when unanswered); closed questions are
//! mapped to [`Answer`] or to the small code strings the survey tables define.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::ContactId;
use crate::measurement::GestationalAge;

/// Collection holding staged pre-delivery survey responses.
pub const PRE_SURVEY_COLLECTION: &str = "patient_presurvey";
/// Collection holding staged post-delivery survey responses.
pub const POST_SURVEY_COLLECTION: &str = "patient_postsurvey";
/// Collection holding consolidated patient records.
pub const UNIFIED_COLLECTION: &str = "patients_unified";

/// Closed yes/no answer; `NA` when the question did not apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Answer {
    Yes,
    No,
    #[serde(rename = "NA")]
    NotApplicable,
}

impl Answer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Answer::Yes => "Yes",
            Answer::No => "No",
            Answer::NotApplicable => "NA",
        }
    }

    pub fn is_yes(self) -> bool {
        matches!(self, Answer::Yes)
    }

    /// The opposite answer; `NA` stays `NA`.
    pub fn negate(self) -> Self {
        match self {
            Answer::Yes => Answer::No,
            Answer::No => Answer::Yes,
            Answer::NotApplicable => Answer::NotApplicable,
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One pre-delivery (intake) survey response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreSurveyRecord {
    pub date_joined: Option<NaiveDate>,
    pub name: String,
    pub mobile: ContactId,
    pub age: Option<u32>,
    /// GA as typed by the respondent, e.g. `38.4`.
    pub ga_entry_str: String,
    pub ga_entry: Option<GestationalAge>,
    pub curr_height: Option<f64>,
    /// Weight as answered; the unit (kg or jin) is resolved during consolidation.
    pub curr_weight: Option<f64>,
    pub pre_weight: Option<f64>,
    pub last_menstrual: String,
    pub edd: String,
    pub had_pregnancy: Answer,
    pub had_delivery: Answer,
    /// Pregnancy count including the current one: `1`..`5` or `>=6`.
    pub n_pregnancy: String,
    /// Living children: `0`..`5` or `>=6`.
    pub n_children: String,
    pub last_delivery: String,
    pub had_preterm: Answer,
    pub had_surgery: Answer,
    pub pregnancy_symptoms: String,
    pub diagnosed_conditions: String,
    pub smoking_history: Option<Answer>,
    pub still_smoking: Answer,
    pub quit_smoking: Answer,
    pub alcohol_history: Option<Answer>,
    pub still_drinking: Answer,
    pub quit_drinking: Answer,
    pub drug_history: Option<Answer>,
}

/// One post-delivery survey response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSurveyRecord {
    pub name: String,
    pub mobile: ContactId,
    pub hospitalised_date: String,
    /// Delivery method with the choice letter stripped; still in survey language.
    pub delivery_type: String,
    pub water_break_datetime: String,
    pub contraction_duration: String,
    pub birthroom_duration: String,
    pub birthroom_interval_duration: String,
    pub csect_entry_time: String,
    pub csect_reason: String,
    /// Actual delivery date as answered.
    pub add: String,
    pub delivery_time: String,
    pub ga_exit_str: String,
    pub ga_exit: Option<GestationalAge>,
    pub device_usage_reason: String,
    pub device_influence: Option<String>,
    pub device_usefulness: Option<String>,
    pub device_advantages: String,
    pub device_disadvantages: String,
    pub increased_awareness: Option<String>,
    pub had_problems: Option<String>,
    pub problems_faced: String,
    pub will_recommend: Option<String>,
    pub reasons_for_recommend: String,
    pub reasons_for_not_recommend: String,
    pub had_ultrasound: Option<String>,
    pub informed_doctor: Option<String>,
    pub doctor_reaction: String,
    pub improvement: String,
}
