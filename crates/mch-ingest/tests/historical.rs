//! Tests for the historical cohort readers.

use std::fs;

use mch_ingest::{read_historical_profiles, read_historical_sheet};
use mch_model::ContactId;
use tempfile::TempDir;

#[test]
fn sheet_rows_keep_file_order_and_drop_blank_contacts() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("historical_metadata.csv");
    fs::write(
        &path,
        "mobile,add,onset,delivery_type\n\
         13800000002,2024-03-01 08:00,2024-03-01 02:00,顺产\n\
         ,2024-03-02 08:00,,\n\
         13800000001,2024-02-01 08:00,,剖腹产（剖宫产）\n",
    )
    .expect("write sheet");

    let rows = read_historical_sheet(&path).expect("read sheet");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].mobile.as_str(), "13800000002");
    assert_eq!(rows[0].delivery_type, "顺产");
    assert_eq!(rows[1].onset, "");
}

#[test]
fn profiles_pivot_record_answers() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("historical_profiles.csv");
    fs::write(
        &path,
        "mobile,name,age,height,old_weight,edd,record_type,record_answer\n\
         13800000001,王五,31,160,110,2024-03-05,1,2\n\
         13800000001,王五,31,160,110,2024-03-05,4,0\n\
         13800000001,,,,,,13,1\n\
         13800000002,赵六,28,165,55,,x,0\n",
    )
    .expect("write profiles");

    let profiles = read_historical_profiles(&path, None).expect("read profiles");
    let first = &profiles[&ContactId::new("13800000001").expect("contact")];
    assert_eq!(first.name, "王五");
    assert_eq!(first.height, "160");
    assert_eq!(first.answer(1), Some("2"));
    assert_eq!(first.answer(4), Some("0"));
    assert_eq!(first.answer(13), Some("1"));
    assert_eq!(first.answer(5), None);

    let second = &profiles[&ContactId::new("13800000002").expect("contact")];
    assert!(second.answers.is_empty());
}

#[test]
fn profiles_accept_float_record_types() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("historical_profiles.csv");
    fs::write(
        &path,
        "mobile,name,age,height,old_weight,edd,record_type,record_answer\n\
         13800000001,王五,31,160,110,2024-03-05,1.0,3\n\
         13800000001,王五,31,160,110,2024-03-05,4.0,0\n\
         13800000001,王五,31,160,110,2024-03-05,2.5,1\n\
         13800000001,王五,31,160,110,2024-03-05,,\n",
    )
    .expect("write profiles");

    let profiles = read_historical_profiles(&path, None).expect("read profiles");
    let profile = &profiles[&ContactId::new("13800000001").expect("contact")];
    assert_eq!(profile.answer(1), Some("3"));
    assert_eq!(profile.answer(4), Some("0"));
    assert_eq!(profile.answers.len(), 2);
}
