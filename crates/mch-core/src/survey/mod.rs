//! Survey export mapping into staged records.

pub mod maps;
pub mod post;
pub mod pre;

use mch_ingest::{CsvRow, ResponseGroup};

use crate::text_utils::{
    append_free_text, is_other_placeholder, join_values, normalize_commas, strip_choice,
};

pub use post::map_post_survey;
pub use pre::map_pre_survey;

/// Staged records mapped from one export, in file order.
#[derive(Debug, Clone)]
pub struct SurveyBatch<T> {
    pub records: Vec<T>,
    /// Data rows in the export.
    pub rows_read: usize,
    /// Rows dropped for lacking a contact identifier.
    pub skipped: usize,
}

/// Joins the ticked options of a multi-response question and its "other" text.
pub(crate) fn collect_group(row: &CsvRow<'_>, group: &ResponseGroup) -> String {
    let ticked: Vec<&str> = group
        .options
        .iter()
        .map(|&idx| row.get(Some(idx)))
        .filter(|value| !is_other_placeholder(value))
        .map(strip_choice)
        .collect();
    let joined = append_free_text(join_values(&ticked), row.get(group.free_text));
    normalize_commas(&joined)
}

/// Answer text, or `None` when the export has no such column.
pub(crate) fn optional_column<'a>(row: &CsvRow<'a>, index: Option<usize>) -> Option<&'a str> {
    index.map(|idx| row.get(Some(idx)))
}
