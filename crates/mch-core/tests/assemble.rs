//! Tests for unified record assembly.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use mch_core::{
    HistoricalInputs, ReconcileError, Reconciler, RecruitedInputs, assemble_historical,
    assemble_recruited, dedupe_last_wins,
};
use mch_ingest::{HistoricalProfile, HistoricalSheetRow, MeasurementsByPatient};
use mch_model::{
    Answer, ContactId, DeliveryType, GestationalAge, Measurement, PostSurveyRecord,
    PreSurveyRecord, RecordType,
};

fn contact(value: &str) -> ContactId {
    ContactId::new(value).expect("valid contact")
}

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, min, 0))
        .expect("valid date-time")
}

fn reading(timestamp: NaiveDateTime, preg_time: &str) -> Measurement {
    Measurement::new(
        timestamp,
        format!(r#"{{"setPregTime":1,"pregTime":"{preg_time}"}}"#),
        None,
    )
}

fn pre_record(mobile: &str) -> PreSurveyRecord {
    PreSurveyRecord {
        date_joined: NaiveDate::from_ymd_opt(2024, 1, 10),
        name: "张三".to_string(),
        mobile: contact(mobile),
        age: Some(29),
        ga_entry_str: "20.3".to_string(),
        ga_entry: Some(GestationalAge::from_weeks_days(20, 3)),
        curr_height: Some(160.0),
        curr_weight: Some(130.0),
        pre_weight: Some(55.0),
        last_menstrual: String::new(),
        edd: "2024-05-20".to_string(),
        had_pregnancy: Answer::Yes,
        had_delivery: Answer::No,
        n_pregnancy: "2".to_string(),
        n_children: "0".to_string(),
        last_delivery: "NA".to_string(),
        had_preterm: Answer::NotApplicable,
        had_surgery: Answer::Yes,
        pregnancy_symptoms: String::new(),
        diagnosed_conditions: "妊娠糖尿病, 贫血".to_string(),
        smoking_history: Some(Answer::No),
        still_smoking: Answer::NotApplicable,
        quit_smoking: Answer::NotApplicable,
        alcohol_history: None,
        still_drinking: Answer::NotApplicable,
        quit_drinking: Answer::NotApplicable,
        drug_history: None,
    }
}

fn post_record(mobile: &str) -> PostSurveyRecord {
    PostSurveyRecord {
        name: "张三".to_string(),
        mobile: contact(mobile),
        hospitalised_date: String::new(),
        delivery_type: "顺产".to_string(),
        water_break_datetime: "2024-05-18 03:20".to_string(),
        contraction_duration: String::new(),
        birthroom_duration: String::new(),
        birthroom_interval_duration: String::new(),
        csect_entry_time: String::new(),
        csect_reason: String::new(),
        add: "2024-05-18".to_string(),
        delivery_time: "11:45".to_string(),
        ga_exit_str: "39.2".to_string(),
        ga_exit: Some(GestationalAge::from_weeks_days(39, 2)),
        device_usage_reason: String::new(),
        device_influence: None,
        device_usefulness: None,
        device_advantages: String::new(),
        device_disadvantages: String::new(),
        increased_awareness: None,
        had_problems: None,
        problems_faced: String::new(),
        will_recommend: Some("Yes".to_string()),
        reasons_for_recommend: String::new(),
        reasons_for_not_recommend: String::new(),
        had_ultrasound: None,
        informed_doctor: None,
        doctor_reaction: String::new(),
        improvement: String::new(),
    }
}

// ============================================================================
// Recruited cohort
// ============================================================================

#[test]
fn recruited_prefers_survey_values() {
    let pre = vec![pre_record("13800000001")];
    let post = vec![post_record("13800000001")];
    let mut measurements = MeasurementsByPatient::new();
    measurements.insert(
        contact("13800000001"),
        vec![
            reading(at(2024, 1, 12, 9, 0), "210"),
            reading(at(2024, 3, 1, 9, 0), "280"),
        ],
    );
    let inputs = RecruitedInputs {
        pre: &pre,
        post: &post,
        measurements: &measurements,
    };

    let batch = assemble_recruited(&inputs, &Reconciler::default());
    assert!(batch.degraded.is_empty());
    let record = &batch.records[0];

    assert_eq!(record.record_type, RecordType::Recruited);
    assert_eq!(record.ga_entry, Some(143));
    assert_eq!(record.ga_exit_add, Some(275));
    // 147 days at Jan 12, last reading 49 days later.
    assert_eq!(record.ga_exit_last, Some(196));
    assert_eq!(record.bmi, Some(21.5));
    assert!(record.had_pregnancy);
    assert!(!record.had_preterm);
    assert!(record.had_surgery);
    assert!(record.gdm);
    assert!(!record.pih);
    assert_eq!(record.delivery_type, Some(DeliveryType::Natural));
    assert_eq!(record.add, Some(at(2024, 5, 18, 11, 45)));
    assert_eq!(record.onset, Some(at(2024, 5, 18, 3, 20)));
    assert_eq!(record.edd, NaiveDate::from_ymd_opt(2024, 5, 20));
}

#[test]
fn recruited_falls_back_to_reconciled_ga() {
    let mut pre = pre_record("13800000002");
    pre.ga_entry = None;
    pre.n_pregnancy = "1".to_string();
    let mut post = post_record("13800000002");
    post.ga_exit = None;

    let mut measurements = MeasurementsByPatient::new();
    measurements.insert(
        contact("13800000002"),
        vec![reading(at(2024, 1, 18, 11, 0), "210")],
    );
    let pre = vec![pre];
    let post = vec![post];
    let inputs = RecruitedInputs {
        pre: &pre,
        post: &post,
        measurements: &measurements,
    };

    let record = &assemble_recruited(&inputs, &Reconciler::default()).records[0];
    assert_eq!(record.ga_entry, Some(147));
    // Jan 18 11:00 to May 18 11:45 is 121 days.
    assert_eq!(record.ga_exit_add, Some(268));
    assert_eq!(record.ga_exit_last, Some(147));
    assert!(!record.had_pregnancy);
}

#[test]
fn recruited_exit_at_last_is_not_capped_at_delivery() {
    let pre = vec![pre_record("13800000005")];
    let post = vec![post_record("13800000005")];
    let mut measurements = MeasurementsByPatient::new();
    measurements.insert(
        contact("13800000005"),
        vec![
            reading(at(2024, 1, 18, 11, 0), "210"),
            reading(at(2024, 5, 28, 11, 0), ""),
        ],
    );
    let inputs = RecruitedInputs {
        pre: &pre,
        post: &post,
        measurements: &measurements,
    };

    let record = &assemble_recruited(&inputs, &Reconciler::default()).records[0];
    // Reconciled exit at delivery is 147 + 121 = 268; the last reading is
    // 131 days after entry and stays past it.
    assert_eq!(record.ga_exit_last, Some(278));
    assert_eq!(record.ga_exit_add, Some(275));
}

#[test]
fn recruited_patient_survives_failed_reconciliation() {
    let pre = vec![pre_record("13800000003")];
    let mut measurements = MeasurementsByPatient::new();
    measurements.insert(
        contact("13800000003"),
        vec![Measurement::new(at(2024, 1, 1, 0, 0), "{}", None)],
    );
    let inputs = RecruitedInputs {
        pre: &pre,
        post: &[],
        measurements: &measurements,
    };

    let batch = assemble_recruited(&inputs, &Reconciler::default());
    assert_eq!(batch.records.len(), 1);
    assert_eq!(batch.degraded.len(), 1);
    assert!(matches!(
        batch.degraded[0].error,
        ReconcileError::NoGestationalAge { .. }
    ));

    let record = &batch.records[0];
    assert_eq!(record.ga_entry, Some(143));
    assert_eq!(record.ga_exit_add, None);
    assert_eq!(record.ga_exit_last, None);
    assert_eq!(record.delivery_type, None);
    assert_eq!(record.add, None);
}

#[test]
fn assembly_is_idempotent() {
    let pre = vec![pre_record("13800000001"), pre_record("13800000004")];
    let post = vec![post_record("13800000004")];
    let measurements = MeasurementsByPatient::new();
    let inputs = RecruitedInputs {
        pre: &pre,
        post: &post,
        measurements: &measurements,
    };

    let first = assemble_recruited(&inputs, &Reconciler::default());
    let second = assemble_recruited(&inputs, &Reconciler::default());
    assert_eq!(first.records, second.records);
}

// ============================================================================
// Historical cohort
// ============================================================================

fn historical_profile() -> HistoricalProfile {
    HistoricalProfile {
        name: "Wang Wu".to_string(),
        age: "31".to_string(),
        height: "160".to_string(),
        old_weight: "120".to_string(),
        edd: "2023-07-06".to_string(),
        answers: BTreeMap::from([
            (1, "2".to_string()),
            (4, "0".to_string()),
            (5, "1".to_string()),
            (8, "2".to_string()),
            (13, "0".to_string()),
        ]),
    }
}

#[test]
fn historical_record_shape() {
    let sheet = vec![HistoricalSheetRow {
        mobile: contact("13800000009"),
        add: "4/7/2023 20:00".to_string(),
        onset: "4/7/2023 10:30".to_string(),
        delivery_type: "紧急剖腹产".to_string(),
    }];
    let profiles = BTreeMap::from([(contact("13800000009"), historical_profile())]);
    let mut measurements = MeasurementsByPatient::new();
    measurements.insert(
        contact("13800000009"),
        vec![
            reading(at(2023, 1, 2, 9, 0), "135"),
            Measurement::new(at(2023, 7, 10, 9, 0), "{}", None),
        ],
    );
    let inputs = HistoricalInputs {
        sheet: &sheet,
        profiles: &profiles,
        measurements: &measurements,
    };

    let mut seen = Vec::new();
    let batch = assemble_historical(&inputs, &Reconciler::default(), |mobile| {
        seen.push(mobile.clone());
    });
    assert_eq!(seen, vec![contact("13800000009")]);
    assert!(batch.excluded.is_empty());

    insta::assert_json_snapshot!(batch.records[0], @r#"
    {
      "type": "hist",
      "mobile": "13800000009",
      "date_joined": "2023-01-02",
      "name": "Wang Wu",
      "age": 31,
      "ga_entry": 96,
      "ga_exit_add": 279,
      "ga_exit_last": 279,
      "bmi": 23.4,
      "edd": "2023-07-06",
      "had_pregnancy": 1,
      "had_preterm": 0,
      "had_surgery": 1,
      "gdm": 1,
      "pih": 0,
      "delivery_type": "emergency c-section",
      "add": "2023-07-04 20:00",
      "onset": "2023-07-04 10:30"
    }
    "#);
}

#[test]
fn historical_patient_without_ga_is_excluded() {
    let sheet = vec![
        HistoricalSheetRow {
            mobile: contact("13800000010"),
            add: "2023-07-04 20:00".to_string(),
            onset: String::new(),
            delivery_type: String::new(),
        },
        HistoricalSheetRow {
            mobile: contact("13800000011"),
            add: "2023-07-04 20:00".to_string(),
            onset: String::new(),
            delivery_type: "顺产".to_string(),
        },
    ];
    let profiles = BTreeMap::new();
    let mut measurements = MeasurementsByPatient::new();
    measurements.insert(
        contact("13800000011"),
        vec![Measurement::new(at(2023, 5, 1, 9, 0), "{}", None)],
    );
    let inputs = HistoricalInputs {
        sheet: &sheet,
        profiles: &profiles,
        measurements: &measurements,
    };

    let batch = assemble_historical(&inputs, &Reconciler::default(), |_| {});
    assert!(batch.records.is_empty());
    assert_eq!(batch.excluded.len(), 2);
    assert_eq!(batch.excluded[0].error, ReconcileError::EmptySequence);
    assert!(matches!(
        batch.excluded[1].error,
        ReconcileError::NoGestationalAge { .. }
    ));
}

// ============================================================================
// Deduplication
// ============================================================================

#[test]
fn dedupe_keeps_last_submission() {
    let mut first = pre_record("13800000001");
    first.name = "first".to_string();
    let mut again = pre_record("13800000001");
    again.name = "again".to_string();
    let other = pre_record("13800000002");

    let deduped = dedupe_last_wins(vec![first, other, again], "pre-survey", |r| &r.mobile);
    assert_eq!(deduped.duplicates, 1);
    let names: Vec<(&str, &str)> = deduped
        .records
        .iter()
        .map(|r| (r.mobile.as_str(), r.name.as_str()))
        .collect();
    assert_eq!(
        names,
        vec![("13800000002", "张三"), ("13800000001", "again")]
    );
}
