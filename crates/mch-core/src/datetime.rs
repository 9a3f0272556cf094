//! Date and date-time normalization for survey and sheet values.
//!
//! Inputs arrive in whatever shape the survey tool or spreadsheet produced:
//! ISO (`2024-03-05 14:30`), slash-separated day-first (`5/3/2024 14:30`),
//! or with Chinese date markers (`2024年3月5日`). Slash and dash forms that
//! start with the day are always read day-first.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%Y年%m月%d日 %H:%M",
    "%Y年%m月%d日%H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%Y.%m.%d",
    "%Y年%m月%d日",
];

/// Parses a date-time; a bare date is read as midnight.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let value = text.trim();
    if value.is_empty() {
        return None;
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| parse_date(value).map(|date| date.and_time(NaiveTime::MIN)))
}

/// Parses a date, dropping any time-of-day component.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let value = text.trim();
    if value.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Joins a date answer and a time-of-day answer into one date-time.
///
/// A blank or unreadable time falls back to the date alone.
pub fn combine_date_time(date: &str, time: &str) -> Option<NaiveDateTime> {
    let joined = format!("{} {}", date.trim(), time.trim());
    parse_datetime(&joined).or_else(|| parse_datetime(date))
}
