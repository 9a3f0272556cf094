//! Lenient numeric parsing for survey and export text.

/// Parses a trimmed decimal; blank, non-numeric and non-finite text yield `None`.
pub fn parse_f64(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses an integer, accepting decimal text such as `"29.0"` and truncating it.
pub fn parse_int(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }
    let value = parse_f64(trimmed)?;
    if value.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(value.trunc() as i64)
}

/// Parses a non-negative count such as an age.
pub fn parse_count(text: &str) -> Option<u32> {
    parse_int(text).and_then(|v| u32::try_from(v).ok())
}

/// Rounds half away from zero to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
