//! Tests for survey column lookup.

use mch_ingest::{
    ColumnLookup, POST_ADVANTAGES_GROUP, PRE_DIAGNOSED_GROUP, PostSurveyColumn, PreSurveyColumn,
};

fn headers(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[test]
fn pre_survey_columns_resolve_by_exact_header() {
    let cols = headers(&[
        "序号",
        "开始答题时间",
        "1.名字",
        "2.电话号码",
        "4.目前的孕周（例如 38.4 代表38周4天）",
    ]);
    let lookup = ColumnLookup::<PreSurveyColumn>::resolve(&cols).expect("resolve");
    assert_eq!(lookup.index(PreSurveyColumn::JoinedDate), Some(1));
    assert_eq!(lookup.index(PreSurveyColumn::Contact), Some(3));
    assert_eq!(lookup.index(PreSurveyColumn::GestationalAge), Some(4));
    assert!(!lookup.contains(PreSurveyColumn::Height));
    assert!(lookup.missing().contains(&PreSurveyColumn::DrugHistory));
}

#[test]
fn post_survey_patterns_prefer_earlier_patterns() {
    // The bare "孕周" pattern matches column 1, but the patterns are tried
    // in order and the specific one picks column 2.
    let cols = headers(&[
        "您的联系电话",
        "入院时孕周",
        "分娩时的孕周是第几周第几天",
        "实际分娩日期",
        "实际分娩时间（几点）",
    ]);
    let lookup = ColumnLookup::<PostSurveyColumn>::resolve(&cols).expect("resolve");
    assert_eq!(lookup.index(PostSurveyColumn::Contact), Some(0));
    assert_eq!(lookup.index(PostSurveyColumn::GestationalAge), Some(2));
    assert_eq!(lookup.index(PostSurveyColumn::ActualDeliveryDate), Some(3));
    assert_eq!(lookup.index(PostSurveyColumn::DeliveryTime), Some(4));
}

#[test]
fn post_survey_pattern_falls_back_to_first_matching_column() {
    let cols = headers(&["姓名", "孕周（入院）", "孕周（出院）"]);
    let lookup = ColumnLookup::<PostSurveyColumn>::resolve(&cols).expect("resolve");
    assert_eq!(lookup.index(PostSurveyColumn::GestationalAge), Some(1));
    assert_eq!(lookup.index(PostSurveyColumn::Name), Some(0));
}

#[test]
fn keyword_group_collects_options_and_free_text() {
    let cols = headers(&[
        "使用萌动的优点:方便",
        "使用萌动的优点:准确",
        "使用萌动的不足:耗电",
        "使用萌动的优点:其他[选项填空]",
    ]);
    let group = POST_ADVANTAGES_GROUP.resolve(&cols);
    assert_eq!(group.options, vec![0, 1]);
    assert_eq!(group.free_text, Some(3));
}

#[test]
fn prefix_group_with_no_columns_is_empty() {
    let group = PRE_DIAGNOSED_GROUP.resolve(&headers(&["1.名字"]));
    assert!(group.options.is_empty());
    assert!(group.free_text.is_none());
}
