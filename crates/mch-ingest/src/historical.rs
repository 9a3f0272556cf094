//! Historical cohort exports: the delivery sheet and patient profile rows.
//!
//! Values are kept as raw trimmed text. Normalization (dates, numbers,
//! delivery categories) happens during record assembly.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use mch_model::ContactId;
use tracing::{debug, info};

use crate::csv_table::read_csv_table;
use crate::error::Result;

/// One row of the historical delivery sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoricalSheetRow {
    pub mobile: ContactId,
    /// Actual delivery date-time.
    pub add: String,
    /// Water-break date-time.
    pub onset: String,
    pub delivery_type: String,
}

/// A patient's profile with medical-record answers pivoted by record type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoricalProfile {
    pub name: String,
    pub age: String,
    pub height: String,
    pub old_weight: String,
    pub edd: String,
    /// `record_type` → `record_answer`; the last row for a type wins.
    pub answers: BTreeMap<u32, String>,
}

impl HistoricalProfile {
    pub fn answer(&self, record_type: u32) -> Option<&str> {
        self.answers.get(&record_type).map(String::as_str)
    }
}

/// Reads the historical sheet in file order. Rows without a contact are dropped.
pub fn read_historical_sheet(path: &Path) -> Result<Vec<HistoricalSheetRow>> {
    let table = read_csv_table(path)?;
    let mobile_idx = table.require_column("mobile", path)?;
    let add_idx = table.require_column("add", path)?;
    let onset_idx = table.column_index("onset");
    let delivery_idx = table.column_index("delivery_type");

    let rows: Vec<HistoricalSheetRow> = table
        .rows()
        .filter_map(|row| {
            let mobile = ContactId::parse(row.get(Some(mobile_idx)))?;
            Some(HistoricalSheetRow {
                mobile,
                add: row.get(Some(add_idx)).to_string(),
                onset: row.get(onset_idx).to_string(),
                delivery_type: row.get(delivery_idx).to_string(),
            })
        })
        .collect();
    info!(path = %path.display(), rows = rows.len(), "historical sheet loaded");
    Ok(rows)
}

/// Reads profile rows for the given patients and pivots their answers.
pub fn read_historical_profiles(
    path: &Path,
    filter: Option<&BTreeSet<ContactId>>,
) -> Result<BTreeMap<ContactId, HistoricalProfile>> {
    let table = read_csv_table(path)?;
    let mobile_idx = table.require_column("mobile", path)?;
    let type_idx = table.column_index("record_type");
    let answer_idx = table.column_index("record_answer");
    let name_idx = table.column_index("name");
    let age_idx = table.column_index("age");
    let height_idx = table.column_index("height");
    let weight_idx = table.column_index("old_weight");
    let edd_idx = table.column_index("edd");

    let mut profiles: BTreeMap<ContactId, HistoricalProfile> = BTreeMap::new();
    for row in table.rows() {
        let Some(mobile) = ContactId::parse(row.get(Some(mobile_idx))) else {
            continue;
        };
        if filter.is_some_and(|wanted| !wanted.contains(&mobile)) {
            continue;
        }
        let profile = profiles.entry(mobile).or_default();
        fill_if_blank(&mut profile.name, row.get(name_idx));
        fill_if_blank(&mut profile.age, row.get(age_idx));
        fill_if_blank(&mut profile.height, row.get(height_idx));
        fill_if_blank(&mut profile.old_weight, row.get(weight_idx));
        fill_if_blank(&mut profile.edd, row.get(edd_idx));

        let raw_type = row.get(type_idx);
        if raw_type.is_empty() {
            continue;
        }
        match parse_record_type(raw_type) {
            Some(record_type) => {
                profile
                    .answers
                    .insert(record_type, row.get(answer_idx).to_string());
            }
            None => debug!(value = raw_type, "ignoring invalid record type"),
        }
    }
    info!(path = %path.display(), patients = profiles.len(), "historical profiles loaded");
    Ok(profiles)
}

/// Record type code, accepting integral float text such as `4.0`.
fn parse_record_type(text: &str) -> Option<u32> {
    let trimmed = text.trim();
    if let Ok(code) = trimmed.parse::<u32>() {
        return Some(code);
    }
    let value = trimmed.parse::<f64>().ok()?;
    (value.is_finite() && value.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&value))
        .then_some(value as u32)
}

fn fill_if_blank(slot: &mut String, value: &str) {
    if slot.is_empty() && !value.is_empty() {
        *slot = value.to_string();
    }
}
