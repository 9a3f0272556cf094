//! Historical cohort: delivery sheet joined with profiles and measurements.

use std::collections::BTreeMap;

use mch_ingest::{HistoricalProfile, HistoricalSheetRow, MeasurementsByPatient};
use mch_model::{ContactId, ReconciliationResult, RecordType, UnifiedPatientRecord, redact};
use tracing::{debug, warn};

use super::delivery::parse_delivery_type;
use super::{CohortBatch, ReconcileIssue, non_empty};
use crate::bmi::resolve_bmi_text;
use crate::datetime::{parse_date, parse_datetime};
use crate::numeric::{parse_count, parse_int};
use crate::reconcile::Reconciler;

/// Medical-record question codes in the profile export.
pub mod record_types {
    /// Pregnancy count, current one included.
    pub const PREGNANCY_COUNT: u32 = 1;
    pub const GDM: u32 = 4;
    pub const PIH: u32 = 5;
    pub const PREVIOUS_PRETERM: u32 = 8;
    pub const UTERINE_SURGERY: u32 = 13;
}

/// Profile answer code for "yes" (`1` is no, `2` unknown).
const ANSWER_YES: i64 = 0;

/// Sheet rows plus the profile and measurement lookups for the historical cohort.
#[derive(Debug, Clone, Copy)]
pub struct HistoricalInputs<'a> {
    pub sheet: &'a [HistoricalSheetRow],
    pub profiles: &'a BTreeMap<ContactId, HistoricalProfile>,
    pub measurements: &'a MeasurementsByPatient,
}

/// Builds one unified record per sheet row whose reconciliation succeeds.
///
/// `on_patient` is called once per sheet row after it is processed.
pub fn assemble_historical<F>(
    inputs: &HistoricalInputs<'_>,
    reconciler: &Reconciler,
    mut on_patient: F,
) -> CohortBatch
where
    F: FnMut(&ContactId),
{
    let mut batch = CohortBatch::default();
    let empty = HistoricalProfile::default();

    for row in inputs.sheet {
        let delivery = parse_datetime(&row.add);
        if delivery.is_none() {
            warn!(
                contact = %redact(row.mobile.as_str()),
                "unreadable delivery date; exit GA will be absent"
            );
        }

        let sequence = inputs
            .measurements
            .get(&row.mobile)
            .map(Vec::as_slice)
            .unwrap_or_default();
        match reconciler.reconcile(sequence, delivery) {
            Ok(result) => {
                let profile = inputs.profiles.get(&row.mobile).unwrap_or(&empty);
                batch.records.push(build_record(row, profile, &result));
            }
            Err(error) => {
                warn!(
                    contact = %redact(row.mobile.as_str()),
                    %error,
                    "patient excluded"
                );
                batch.excluded.push(ReconcileIssue {
                    mobile: row.mobile.clone(),
                    error,
                });
            }
        }
        on_patient(&row.mobile);
    }

    debug!(
        records = batch.records.len(),
        excluded = batch.excluded.len(),
        "historical cohort assembled"
    );
    batch
}

fn build_record(
    row: &HistoricalSheetRow,
    profile: &HistoricalProfile,
    result: &ReconciliationResult,
) -> UnifiedPatientRecord {
    let mut record = UnifiedPatientRecord::new(RecordType::Historical, row.mobile.clone());
    record.date_joined = Some(result.entry_timestamp.date());
    record.name = non_empty(&profile.name);
    record.age = parse_count(&profile.age);
    record.ga_entry = Some(result.entry_ga_days);
    record.ga_exit_add = result.exit_ga_days_at_delivery;
    record.ga_exit_last = result.capped_exit_at_last();
    record.bmi = resolve_bmi_text(&profile.height, &profile.old_weight);
    record.edd = parse_date(&profile.edd);

    record.had_pregnancy = answer_code(profile, record_types::PREGNANCY_COUNT)
        .is_some_and(|count| count > 1);
    record.gdm = is_yes(profile, record_types::GDM);
    record.pih = is_yes(profile, record_types::PIH);
    record.had_preterm = is_yes(profile, record_types::PREVIOUS_PRETERM);
    record.had_surgery = is_yes(profile, record_types::UTERINE_SURGERY);

    record.delivery_type = parse_delivery_type(&row.delivery_type);
    record.add = parse_datetime(&row.add);
    record.onset = parse_datetime(&row.onset);
    record
}

fn answer_code(profile: &HistoricalProfile, record_type: u32) -> Option<i64> {
    profile.answer(record_type).and_then(parse_int)
}

fn is_yes(profile: &HistoricalProfile, record_type: u32) -> bool {
    answer_code(profile, record_type) == Some(ANSWER_YES)
}
