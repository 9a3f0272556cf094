//! Gestational-age reconciliation and unified record assembly.
//!
//! Pure transformations from ingested rows to [`mch_model`] records. Nothing
//! here touches the store; per-patient failures are reported in the returned
//! batches and logged, never raised.

pub mod assemble;
pub mod bmi;
pub mod datetime;
pub mod gestational_age;
pub mod numeric;
pub mod reconcile;
pub mod survey;
pub mod text_utils;

pub use assemble::{
    CohortBatch, Deduped, HistoricalInputs, ReconcileIssue, RecruitedInputs, assemble_historical,
    assemble_recruited, dedupe_last_wins, parse_delivery_type, remap_delivery_type,
};
pub use bmi::{resolve_bmi, resolve_bmi_text};
pub use datetime::{combine_date_time, parse_date, parse_datetime};
pub use gestational_age::{GaAnswer, extract_gestational_age, parse_ga_str};
pub use reconcile::{FULL_TERM_DAYS, ReconcileError, Reconciler};
pub use survey::{SurveyBatch, map_post_survey, map_pre_survey};
