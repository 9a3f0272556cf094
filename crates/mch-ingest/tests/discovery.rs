//! Tests for dataset layout and survey export discovery.

use std::fs;

use mch_ingest::{DatasetLayout, IngestError, SurveyDate, list_csv_files, require_file};
use tempfile::TempDir;

fn touch(dir: &TempDir, name: &str) {
    fs::write(dir.path().join(name), "a,b\n1,2\n").expect("write file");
}

#[test]
fn lists_csv_files_sorted() {
    let dir = TempDir::new().expect("temp dir");
    touch(&dir, "measurements.csv");
    touch(&dir, "240101_pre_survey.CSV");
    touch(&dir, "notes.txt");

    let files = list_csv_files(dir.path()).expect("list csv");
    let names: Vec<_> = files
        .iter()
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
        .collect();
    assert_eq!(names, vec!["240101_pre_survey.CSV", "measurements.csv"]);
}

#[test]
fn survey_dates_require_both_exports() {
    let dir = TempDir::new().expect("temp dir");
    touch(&dir, "240101_pre_survey.csv");
    touch(&dir, "240101_post_survey.csv");
    touch(&dir, "240215_pre_survey.csv");
    touch(&dir, "240301_pre_survey.csv");
    touch(&dir, "240301_post_survey.csv");
    touch(&dir, "latest_pre_survey.csv");

    let layout = DatasetLayout::open(dir.path()).expect("open layout");
    let dates: Vec<String> = layout
        .survey_dates()
        .expect("scan")
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(dates, vec!["240101", "240301"]);

    let latest = layout.latest_survey_date().expect("scan");
    assert_eq!(latest, Some("240301".parse::<SurveyDate>().expect("date")));
}

#[test]
fn missing_directory_is_an_error() {
    let dir = TempDir::new().expect("temp dir");
    let result = DatasetLayout::open(dir.path().join("nope"));
    assert!(matches!(result, Err(IngestError::DirectoryNotFound { .. })));
}

#[test]
fn require_file_reports_missing_inputs() {
    let dir = TempDir::new().expect("temp dir");
    let layout = DatasetLayout::new(dir.path());
    assert!(matches!(
        require_file(layout.measurements()),
        Err(IngestError::FileNotFound { .. })
    ));

    touch(&dir, "measurements.csv");
    assert_eq!(
        require_file(layout.measurements()).expect("present"),
        dir.path().join("measurements.csv")
    );
}
