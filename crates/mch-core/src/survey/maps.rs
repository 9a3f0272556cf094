//! Fixed answer tables for closed survey questions.
//!
//! Lookups are made on the option text after the choice letter is stripped.

use mch_model::Answer;

use crate::text_utils::strip_choice;

/// Option text → normalized answer.
pub type AnswerTable = &'static [(&'static str, Answer)];
/// Option text → count code.
pub type CodeTable = &'static [(&'static str, &'static str)];

pub const YES_NO: AnswerTable = &[("是", Answer::Yes), ("不是", Answer::No)];
pub const HAVE_NOT: AnswerTable = &[("有", Answer::Yes), ("没有", Answer::No)];
pub const STILL_SMOKING: AnswerTable = &[("还在抽烟", Answer::Yes), ("戒烟了", Answer::No)];
pub const STILL_DRINKING: AnswerTable = &[("还在饮酒", Answer::Yes), ("戒酒了", Answer::No)];

pub const CHILDREN_COUNT: CodeTable = &[
    ("一", "1"),
    ("两", "2"),
    ("三", "3"),
    ("四", "4"),
    ("五", "5"),
    ("多过六个", ">=6"),
];
pub const PREGNANCY_COUNT: CodeTable = &[
    ("二", "2"),
    ("三", "3"),
    ("四", "4"),
    ("五", "5"),
    ("多过六次", ">=6"),
];

/// Post-delivery feedback answers, stored as the `Yes`/`No` strings.
pub const FEEDBACK_YES_NO: CodeTable = &[("是", "Yes"), ("否", "No"), ("有", "Yes"), ("没有", "No")];
pub const CONTRACTION_AWARENESS: CodeTable = &[("能感受/察觉", "Yes"), ("不能感受/察觉", "No")];
pub const RECOMMENDATION: CodeTable = &[("会", "Yes"), ("不会", "No")];
pub const ULTRASOUND: CodeTable = &[("有", "Yes"), ("没有", "No"), ("否", "No")];

pub const NO_SURGERY: &str = "没有";

pub fn lookup_answer(table: AnswerTable, value: &str) -> Option<Answer> {
    let key = strip_choice(value);
    table
        .iter()
        .find(|(option, _)| *option == key)
        .map(|(_, answer)| *answer)
}

pub fn lookup_code(table: CodeTable, value: &str) -> Option<&'static str> {
    let key = strip_choice(value);
    table
        .iter()
        .find(|(option, _)| *option == key)
        .map(|(_, code)| *code)
}

/// Maps through `table`, keeping the stripped text when no entry matches.
pub fn map_choice(table: CodeTable, value: &str) -> String {
    lookup_code(table, value)
        .map(str::to_string)
        .unwrap_or_else(|| strip_choice(value).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_strip_the_choice_letter() {
        assert_eq!(lookup_answer(YES_NO, "B.不是"), Some(Answer::No));
        assert_eq!(lookup_answer(HAVE_NOT, "C.不清楚"), None);
        assert_eq!(lookup_code(PREGNANCY_COUNT, "E.多过六次"), Some(">=6"));
    }

    #[test]
    fn map_choice_keeps_unknown_text() {
        assert_eq!(map_choice(RECOMMENDATION, "A.会"), "Yes");
        assert_eq!(map_choice(RECOMMENDATION, "C.看情况"), "看情况");
        assert_eq!(map_choice(ULTRASOUND, ""), "");
    }
}
