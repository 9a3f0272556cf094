use std::collections::BTreeMap;

use mch_model::{ContactId, redact};
use tracing::info;

/// Rows left after duplicate removal plus how many were dropped.
#[derive(Debug, Clone)]
pub struct Deduped<T> {
    pub records: Vec<T>,
    pub duplicates: usize,
}

/// Keeps the last row per contact, preserving the order of the survivors.
///
/// `source` names the batch in the log line emitted for each duplicate.
pub fn dedupe_last_wins<T, F>(rows: Vec<T>, source: &str, key: F) -> Deduped<T>
where
    F: Fn(&T) -> &ContactId,
{
    let mut last_index: BTreeMap<&ContactId, usize> = BTreeMap::new();
    for (idx, row) in rows.iter().enumerate() {
        if last_index.insert(key(row), idx).is_some() {
            info!(
                source,
                contact = %redact(key(row).as_str()),
                "repeated submission; keeping the later one"
            );
        }
    }
    let keep: Vec<usize> = {
        let mut indices: Vec<usize> = last_index.into_values().collect();
        indices.sort_unstable();
        indices
    };
    let duplicates = rows.len() - keep.len();

    let mut keep = keep.into_iter().peekable();
    let records = rows
        .into_iter()
        .enumerate()
        .filter_map(|(idx, row)| {
            if keep.peek() == Some(&idx) {
                keep.next();
                Some(row)
            } else {
                None
            }
        })
        .collect();
    Deduped {
        records,
        duplicates,
    }
}
