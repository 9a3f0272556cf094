//! Unified patient record assembly for both cohorts.

pub mod dedupe;
pub mod delivery;
pub mod historical;
pub mod recruited;

use mch_model::{ContactId, UnifiedPatientRecord};

use crate::reconcile::ReconcileError;

pub use dedupe::{Deduped, dedupe_last_wins};
pub use delivery::{parse_delivery_type, remap_delivery_type};
pub use historical::{HistoricalInputs, assemble_historical};
pub use recruited::{RecruitedInputs, assemble_recruited};

/// A patient left without reconciled GA values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileIssue {
    pub mobile: ContactId,
    pub error: ReconcileError,
}

/// Output of one cohort assembly.
#[derive(Debug, Clone, Default)]
pub struct CohortBatch {
    pub records: Vec<UnifiedPatientRecord>,
    /// Patients dropped from the batch.
    pub excluded: Vec<ReconcileIssue>,
    /// Patients kept with reconciler-derived fields absent.
    pub degraded: Vec<ReconcileIssue>,
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
