//! BMI with weight-unit disambiguation.
//!
//! Respondents give weight either in kilograms or in jin (斤, half a
//! kilogram), and the survey does not say which. Values over 110 are always
//! jin. Below that, the unit whose BMI falls in the plausible adult range
//! wins; when both or neither do, kilograms are assumed.

use std::ops::RangeInclusive;

use crate::numeric::{parse_f64, round1};

/// Weights above this are read as jin.
pub const JIN_THRESHOLD: f64 = 110.0;
pub const KG_PER_JIN: f64 = 0.5;
pub const PLAUSIBLE_BMI: RangeInclusive<f64> = 15.0..=45.0;

/// BMI rounded to one decimal, or `None` for unusable height or weight.
///
/// # Example
/// ```
/// use mch_core::resolve_bmi;
///
/// assert_eq!(resolve_bmi(160.0, 55.0), Some(21.5));
/// assert_eq!(resolve_bmi(160.0, 120.0), Some(23.4));
/// ```
pub fn resolve_bmi(height_cm: f64, weight: f64) -> Option<f64> {
    if !height_cm.is_finite() || height_cm <= 0.0 || !weight.is_finite() || weight <= 0.0 {
        return None;
    }
    let height_m = height_cm / 100.0;
    let bmi = |kg: f64| kg / (height_m * height_m);
    let as_kg = bmi(weight);
    let as_jin = bmi(weight * KG_PER_JIN);

    if weight > JIN_THRESHOLD {
        return Some(round1(as_jin));
    }
    let chosen = match (PLAUSIBLE_BMI.contains(&as_kg), PLAUSIBLE_BMI.contains(&as_jin)) {
        (false, true) => as_jin,
        _ => as_kg,
    };
    Some(round1(chosen))
}

/// [`resolve_bmi`] over raw answer text.
pub fn resolve_bmi_text(height_cm: &str, weight: &str) -> Option<f64> {
    resolve_bmi(parse_f64(height_cm)?, parse_f64(weight)?)
}
