//! Gestational-age extraction from measurement metadata and survey answers.
//!
//! Device registrations store the self-reported GA in the `basic_info` JSON
//! object (`setPregTime`, `pregTime`); clinicians write it at the start of the
//! conclusion note, before the first full-width period. In both places the
//! value is read by collecting its digits:
//!
//! - three digits `d0 d1 d2` are weeks `d0 d1` plus `d2` days,
//! - two digits are read as `d0*10*7 + d1*7`.
//!
//! The two-digit rule is kept as recorded; it equals whole weeks only when the
//! digits spell the week count.

use mch_model::{DAYS_PER_WEEK, GestationalAge};
use serde_json::Value;

/// Sentence terminator that ends the GA clause of a conclusion note.
pub const CONCLUSION_TERMINATOR: char = '。';

const MAX_DAY_IN_WEEK: u32 = DAYS_PER_WEEK - 1;

/// Extracts the GA recorded with one measurement.
///
/// Returns `None` when `basic_info` is not a JSON object or neither source
/// yields a non-zero value. A zero from the registration falls through to
/// the conclusion; a zero from the conclusion is returned as is.
///
/// # Example
/// ```
/// use mch_core::extract_gestational_age;
///
/// let info = r#"{"setPregTime": true, "pregTime": "38周4天"}"#;
/// assert_eq!(extract_gestational_age(None, info).map(|ga| ga.days()), Some(270));
/// ```
pub fn extract_gestational_age(conclusion: Option<&str>, basic_info: &str) -> Option<GestationalAge> {
    let info: Value = serde_json::from_str(basic_info).ok()?;
    let info = info.as_object()?;

    let mut days = None;
    if info.get("setPregTime").is_some_and(is_truthy) {
        days = info.get("pregTime").and_then(value_text).and_then(|text| days_from_digits(&text));
    }

    if days.is_none_or(|d| d == 0)
        && let Some(note) = conclusion.filter(|note| !note.is_empty())
    {
        let clause = note.split(CONCLUSION_TERMINATOR).next().unwrap_or(note);
        if let Some(found) = days_from_digits(clause) {
            days = Some(found);
        }
    }

    days.map(GestationalAge::from_days)
}

/// Collects digits in order and applies the two- or three-digit rule.
fn days_from_digits(text: &str) -> Option<u32> {
    let digits: Vec<u32> = text.chars().filter_map(digit_value).collect();
    match digits.as_slice() {
        [tens, units, day] => Some((tens * 10 + units) * DAYS_PER_WEEK + day),
        [tens, units] => Some(tens * 10 * DAYS_PER_WEEK + units * DAYS_PER_WEEK),
        _ => None,
    }
}

/// ASCII and full-width decimal digits.
fn digit_value(c: char) -> Option<u32> {
    match c {
        '0'..='9' => c.to_digit(10),
        '０'..='９' => Some(c as u32 - '０' as u32),
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A GA answer as typed plus its day count.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GaAnswer {
    pub raw: String,
    pub days: Option<GestationalAge>,
}

/// Parses a survey GA answer written `weeks.days`, e.g. `38.4`.
///
/// A missing day part means day 0; the day is clamped to `0..=6`.
/// Unreadable text keeps `raw` and has no day count.
pub fn parse_ga_str(text: &str) -> GaAnswer {
    let raw = text.trim();
    if raw.is_empty() {
        return GaAnswer::default();
    }
    let (week_text, day_text) = raw.split_once('.').unwrap_or((raw, "0"));
    let days = match (week_text.trim().parse::<u32>(), day_text.trim().parse::<i64>()) {
        (Ok(weeks), Ok(day)) => {
            let day = day.clamp(0, i64::from(MAX_DAY_IN_WEEK));
            u32::try_from(day)
                .ok()
                .map(|day| GestationalAge::from_weeks_days(weeks, day))
        }
        _ => None,
    };
    GaAnswer {
        raw: raw.to_string(),
        days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn days(conclusion: Option<&str>, info: &str) -> Option<u32> {
        extract_gestational_age(conclusion, info).map(GestationalAge::days)
    }

    #[test]
    fn three_digit_registration() {
        assert_eq!(days(None, r#"{"setPregTime":1,"pregTime":"384"}"#), Some(270));
    }

    #[test]
    fn two_digit_registration_keeps_recorded_formula() {
        assert_eq!(days(None, r#"{"setPregTime":true,"pregTime":"38"}"#), Some(266));
    }

    #[test]
    fn falls_back_to_conclusion_clause() {
        let info = r#"{"setPregTime":false,"pregTime":"384"}"#;
        assert_eq!(days(Some("孕32周5天。胎心正常120次"), info), Some(229));
        assert_eq!(days(Some("孕３２周。"), info), Some(224));
    }

    #[test]
    fn zero_registration_uses_conclusion() {
        let info = r#"{"setPregTime":1,"pregTime":"00"}"#;
        assert_eq!(days(Some("孕30周"), info), Some(210));
        assert_eq!(days(None, info), Some(0));
    }

    #[test]
    fn unusable_inputs_yield_none() {
        assert_eq!(days(None, "not json"), None);
        assert_eq!(days(Some("孕32周"), "[1,2]"), None);
        assert_eq!(days(None, r#"{"pregTime":"384"}"#), None);
        assert_eq!(days(Some(""), r#"{"setPregTime":1,"pregTime":"1"}"#), None);
        assert_eq!(days(Some("胎心正常。孕32周"), "{}"), None);
    }

    #[test]
    fn survey_ga_strings() {
        assert_eq!(parse_ga_str("38.4").days.map(GestationalAge::days), Some(270));
        assert_eq!(parse_ga_str("38").days.map(GestationalAge::days), Some(266));
        assert_eq!(parse_ga_str("38.9").days.map(GestationalAge::days), Some(272));
        let unreadable = parse_ga_str("三十八周");
        assert_eq!(unreadable.raw, "三十八周");
        assert!(unreadable.days.is_none());
        assert_eq!(parse_ga_str("  "), GaAnswer::default());
    }
}
