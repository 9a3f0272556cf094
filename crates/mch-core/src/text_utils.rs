//! Text helpers for survey answers.
//!
//! Survey exports render a ticked choice as `"A.是"`: a choice letter, a dot,
//! then the option text. Multi-response questions spread the options over
//! several columns and include an "other" option whose label (`其他`, `其它`)
//! is noise unless the respondent typed something into its free-text box.

use std::sync::LazyLock;

use regex::Regex;

/// Labels the survey tool uses for the "other" option.
pub const OTHER_ALIASES: &[&str] = &["其他", "其它"];

/// "Other" label followed only by blanks, fill-in markers or punctuation.
static OTHER_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:其他|其它)(?:\s|_|\{[^}]*\}|[^\w])*$").expect("valid placeholder regex")
});

static COMMA_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:,\s*)+").expect("valid comma regex"));

/// Drops the choice-letter prefix: the text after the first `.`, trimmed.
///
/// Values without a dot are returned trimmed.
///
/// # Example
/// ```
/// use mch_core::text_utils::strip_choice;
///
/// assert_eq!(strip_choice("A.是"), "是");
/// assert_eq!(strip_choice("头晕"), "头晕");
/// ```
pub fn strip_choice(value: &str) -> &str {
    let trimmed = value.trim();
    match trimmed.split_once('.') {
        Some((_, rest)) => rest.trim(),
        None => trimmed,
    }
}

/// True for a bare "other" option with no respondent-supplied text.
pub fn is_other_placeholder(value: &str) -> bool {
    let text = strip_choice(value);
    if text.is_empty() || OTHER_ALIASES.contains(&text) {
        return true;
    }
    OTHER_PLACEHOLDER.is_match(text)
}

/// Collapses comma runs to a single `", "` and trims separators at the ends.
pub fn normalize_commas(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    COMMA_RUNS
        .replace_all(value, ", ")
        .trim_matches(|c: char| c == ',' || c.is_whitespace())
        .to_string()
}

pub fn join_values<S: AsRef<str>>(values: &[S]) -> String {
    values
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Appends a free-text answer to a joined list.
pub fn append_free_text(joined: String, free_text: &str) -> String {
    match (joined.is_empty(), free_text.is_empty()) {
        (_, true) => joined,
        (true, false) => free_text.to_string(),
        (false, false) => format!("{joined}, {free_text}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_choice_splits_on_first_dot_only() {
        assert_eq!(strip_choice("B. 38.4周"), "38.4周");
        assert_eq!(strip_choice(""), "");
        assert_eq!(strip_choice("  没有 "), "没有");
    }

    #[test]
    fn other_placeholders_are_recognised() {
        for value in [
            "",
            "其他",
            "C.其它",
            "其他____",
            "其他____{fillblank-6b00}",
            "其它 ：",
        ] {
            assert!(is_other_placeholder(value), "{value:?} should be a placeholder");
        }
        for value in ["其他：腰痛", "头晕", "A.其他过敏"] {
            assert!(!is_other_placeholder(value), "{value:?} carries content");
        }
    }

    #[test]
    fn comma_runs_collapse() {
        assert_eq!(normalize_commas("头晕, , 恶心,,"), "头晕, 恶心");
        assert_eq!(normalize_commas(", 水肿"), "水肿");
        assert_eq!(normalize_commas(""), "");
    }

    #[test]
    fn free_text_is_appended() {
        assert_eq!(append_free_text(String::new(), "腰痛"), "腰痛");
        assert_eq!(append_free_text("头晕".to_string(), "腰痛"), "头晕, 腰痛");
        assert_eq!(append_free_text("头晕".to_string(), ""), "头晕");
    }
}
