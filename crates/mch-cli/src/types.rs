use mch_core::ReconcileIssue;
use mch_store::UpsertSummary;

/// Counts for one collection written by a stage.
#[derive(Debug, Clone, Default)]
pub struct StageSummary {
    pub stage: &'static str,
    pub collection: &'static str,
    pub rows_read: usize,
    pub duplicates: usize,
    pub skipped: usize,
    pub excluded: Vec<ReconcileIssue>,
    pub degraded: Vec<ReconcileIssue>,
    pub upserts: UpsertSummary,
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub stages: Vec<StageSummary>,
}

impl RunSummary {
    pub fn extend(&mut self, stages: impl IntoIterator<Item = StageSummary>) {
        self.stages.extend(stages);
    }

    pub fn issue_count(&self) -> usize {
        self.stages
            .iter()
            .map(|s| s.excluded.len() + s.degraded.len())
            .sum()
    }
}
