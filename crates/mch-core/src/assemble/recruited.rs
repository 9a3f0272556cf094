//! Recruited cohort: pre-survey left-joined with post-survey on contact.

use std::collections::BTreeMap;

use mch_ingest::MeasurementsByPatient;
use mch_model::{
    ContactId, PostSurveyRecord, PreSurveyRecord, ReconciliationResult, RecordType,
    UnifiedPatientRecord, redact,
};
use tracing::{debug, warn};

use super::delivery::remap_delivery_type;
use super::{CohortBatch, ReconcileIssue, non_empty};
use crate::bmi::resolve_bmi;
use crate::datetime::{combine_date_time, parse_date, parse_datetime};
use crate::reconcile::Reconciler;

pub const GDM_MARKER: &str = "妊娠糖尿病";
pub const PIH_MARKER: &str = "妊娠高血压";

/// Pregnancy-count codes meaning the current pregnancy is the first.
const FIRST_PREGNANCY_CODES: &[&str] = &["0", "1"];

/// Staged survey responses and measurements for the recruited cohort.
#[derive(Debug, Clone, Copy)]
pub struct RecruitedInputs<'a> {
    pub pre: &'a [PreSurveyRecord],
    pub post: &'a [PostSurveyRecord],
    pub measurements: &'a MeasurementsByPatient,
}

/// Builds one unified record per pre-survey response.
///
/// Survey GA values take precedence; the reconciler fills them in when the
/// survey left them blank. A failed reconciliation never drops a recruited
/// patient.
pub fn assemble_recruited(inputs: &RecruitedInputs<'_>, reconciler: &Reconciler) -> CohortBatch {
    let post_by_contact: BTreeMap<&ContactId, &PostSurveyRecord> =
        inputs.post.iter().map(|post| (&post.mobile, post)).collect();

    let mut batch = CohortBatch::default();
    for pre in inputs.pre {
        let post = post_by_contact.get(&pre.mobile).copied();
        let delivery = post.and_then(|p| combine_date_time(&p.add, &p.delivery_time));

        let reconciled = match inputs.measurements.get(&pre.mobile) {
            Some(sequence) => match reconciler.reconcile(sequence, delivery) {
                Ok(result) => Some(result),
                Err(error) => {
                    warn!(
                        contact = %redact(pre.mobile.as_str()),
                        %error,
                        "reconciliation failed; keeping survey values"
                    );
                    batch.degraded.push(ReconcileIssue {
                        mobile: pre.mobile.clone(),
                        error,
                    });
                    None
                }
            },
            None => None,
        };

        batch
            .records
            .push(build_record(pre, post, delivery, reconciled.as_ref()));
    }
    debug!(
        records = batch.records.len(),
        degraded = batch.degraded.len(),
        "recruited cohort assembled"
    );
    batch
}

fn build_record(
    pre: &PreSurveyRecord,
    post: Option<&PostSurveyRecord>,
    delivery: Option<chrono::NaiveDateTime>,
    reconciled: Option<&ReconciliationResult>,
) -> UnifiedPatientRecord {
    let mut record = UnifiedPatientRecord::new(RecordType::Recruited, pre.mobile.clone());
    record.date_joined = pre.date_joined;
    record.name = non_empty(&pre.name);
    record.age = pre.age;
    record.edd = parse_date(&pre.edd);

    record.ga_entry = pre
        .ga_entry
        .map(|ga| i64::from(ga.days()))
        .or_else(|| reconciled.map(|r| r.entry_ga_days));
    record.ga_exit_add = post
        .and_then(|p| p.ga_exit)
        .map(|ga| i64::from(ga.days()))
        .or_else(|| reconciled.and_then(|r| r.exit_ga_days_at_delivery));
    // Uncapped, and anchored to the reconciled entry rather than `ga_entry`.
    record.ga_exit_last = reconciled.and_then(|r| r.exit_ga_days_at_last_measurement);

    record.bmi = match (pre.curr_height, pre.pre_weight) {
        (Some(height), Some(weight)) => resolve_bmi(height, weight),
        _ => None,
    };
    record.had_pregnancy = !FIRST_PREGNANCY_CODES.contains(&pre.n_pregnancy.as_str());
    record.had_preterm = pre.had_preterm.is_yes();
    record.had_surgery = pre.had_surgery.is_yes();
    record.gdm = pre.diagnosed_conditions.contains(GDM_MARKER);
    record.pih = pre.diagnosed_conditions.contains(PIH_MARKER);

    if let Some(post) = post {
        record.delivery_type = remap_delivery_type(&post.delivery_type);
        record.add = delivery;
        record.onset = parse_datetime(&post.water_break_datetime);
    }
    record
}
