//! Clinical measurement export reader.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::NaiveDateTime;
use mch_model::{ContactId, Measurement, sort_measurements};
use tracing::{debug, warn};

use crate::csv_table::read_csv_table;
use crate::error::Result;

pub const MOBILE_COLUMN: &str = "mobile";
pub const TIME_COLUMN: &str = "m_time";
pub const BASIC_INFO_COLUMN: &str = "basic_info";
pub const CONCLUSION_COLUMN: &str = "conclusion";

const TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Measurements grouped by patient, each sequence sorted by timestamp.
pub type MeasurementsByPatient = BTreeMap<ContactId, Vec<Measurement>>;

/// Parses `m_time` as a local wall-clock date-time.
///
/// Unix seconds are rejected: the export carries no zone to place them in
/// the same local time as survey delivery dates.
pub fn parse_measurement_time(raw: &str) -> Option<NaiveDateTime> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

/// Reads the measurement export, keeping only the requested patients.
///
/// With `filter` set to `None` every row is kept. Rows with a blank contact
/// or an unparseable timestamp are skipped.
pub fn read_measurements(
    path: &Path,
    filter: Option<&BTreeSet<ContactId>>,
) -> Result<MeasurementsByPatient> {
    let table = read_csv_table(path)?;
    let mobile_idx = table.require_column(MOBILE_COLUMN, path)?;
    let time_idx = table.require_column(TIME_COLUMN, path)?;
    let info_idx = table.require_column(BASIC_INFO_COLUMN, path)?;
    let conclusion_idx = table.column_index(CONCLUSION_COLUMN);

    let mut grouped = MeasurementsByPatient::new();
    let mut skipped = 0usize;
    for (line, row) in table.rows().enumerate() {
        let Some(mobile) = ContactId::parse(row.get(Some(mobile_idx))) else {
            skipped += 1;
            continue;
        };
        if filter.is_some_and(|wanted| !wanted.contains(&mobile)) {
            continue;
        }
        let raw_time = row.get(Some(time_idx));
        let Some(timestamp) = parse_measurement_time(raw_time) else {
            warn!(row = line + 2, value = raw_time, "skipping measurement with invalid time");
            skipped += 1;
            continue;
        };
        let conclusion = Some(row.get(conclusion_idx))
            .filter(|text| !text.is_empty())
            .map(str::to_string);
        grouped.entry(mobile).or_default().push(Measurement::new(
            timestamp,
            row.get(Some(info_idx)),
            conclusion,
        ));
    }

    for sequence in grouped.values_mut() {
        sort_measurements(sequence);
    }
    debug!(
        path = %path.display(),
        patients = grouped.len(),
        skipped,
        "measurements loaded"
    );
    Ok(grouped)
}
