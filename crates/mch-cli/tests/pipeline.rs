//! End-to-end runs of the pipeline stages over a fixture dataset directory.

use std::fs;
use std::path::Path;

use indicatif::ProgressBar;
use mch_cli::config::{AppConfig, Mode, RunConfig, RunOverrides};
use mch_cli::pipeline::{stage_historical, stage_recruited, stage_surveys};
use mch_cli::types::StageSummary;
use mch_core::ReconcileError;
use mch_model::{KEY_FIELD, POST_SURVEY_COLLECTION, PRE_SURVEY_COLLECTION, UNIFIED_COLLECTION};
use mch_store::{DocumentStore, JsonDirStore, MemoryStore, UpsertSummary};
use serde_json::{Value, json};
use tempfile::TempDir;

const PRE_SURVEY: &str = "\
开始答题时间,1.名字,2.电话号码,3.您的年龄是多少？,4.目前的孕周（例如 38.4 代表38周4天）,5.目前的身高（厘米）,7.怀孕前的体重（斤）,19.此次怀孕期间，医生是否诊断以下疾病？:妊娠糖尿病
1/12/2023 09:00,张三,13800000001,29,20.0,160,120,A.妊娠糖尿病
2/12/2023 10:00,李四,13800000002,33,,158,100,
2/12/2023 11:00,张三,13800000001,30,20.0,160,120,A.妊娠糖尿病
2/12/2023 12:00,无号码,,25,,,,
";

const POST_SURVEY: &str = "\
姓名,联系电话,分娩方式,实际分娩日期,实际分娩时间（几点）,分娩时的孕周是第几周第几天（例如38.4）
张三,13800000001,A.顺产,2024-03-01,08:30,39.2
";

const MEASUREMENTS: &str = r#"mobile,m_time,basic_info,conclusion
13800000001,2023-12-01 10:00,"{""setPregTime"":1,""pregTime"":""200""}",
13800000001,2024-02-01 10:00,{},胎心正常
13800000002,2023-12-05 10:00,{},
13800000003,2024-01-01 10:00,"{""setPregTime"":1,""pregTime"":""200""}",
13800000003,2024-04-01 10:00,{},
13800000009,2024-04-01 10:00,"{""setPregTime"":1,""pregTime"":""300""}",
"#;

const HISTORICAL_METADATA: &str = "\
mobile,add,onset,delivery_type
13800000003,not a date,,natural
13800000004,2024-06-01 09:00,,c-section
13800000003,2024-05-01 10:00,2024-05-01 02:15,natural
";

const HISTORICAL_PROFILES: &str = "\
mobile,name,age,height,old_weight,edd,record_type,record_answer
13800000003,Wang Wu,31,165,58,2024-05-10,1,2
13800000003,,,,,,4,0
13800000003,,,,,,5,1
";

fn write_fixtures(dir: &Path) {
    let files = [
        ("240301_pre_survey.csv", PRE_SURVEY),
        ("240301_post_survey.csv", POST_SURVEY),
        ("measurements.csv", MEASUREMENTS),
        ("historical_metadata.csv", HISTORICAL_METADATA),
        ("historical_profiles.csv", HISTORICAL_PROFILES),
    ];
    for (name, contents) in files {
        fs::write(dir.join(name), contents).unwrap();
    }
}

fn run_config(datasets: &Path) -> RunConfig {
    let overrides = RunOverrides {
        datasets_dir: Some(datasets.to_path_buf()),
        date: Some("240301".parse().unwrap()),
        ..RunOverrides::default()
    };
    RunConfig::resolve(Mode::Test, &AppConfig::default(), &overrides).unwrap()
}

fn run_all(config: &RunConfig, store: &mut dyn DocumentStore) -> Vec<StageSummary> {
    let mut stages = stage_surveys(config, store).unwrap();
    stages.push(stage_recruited(config, store).unwrap());
    stages.push(stage_historical(config, store, &ProgressBar::hidden()).unwrap());
    stages
}

fn stored(store: &dyn DocumentStore, collection: &str, mobile: &str) -> Value {
    let doc = store
        .find(collection, KEY_FIELD, mobile)
        .unwrap()
        .unwrap_or_else(|| panic!("{mobile} missing from {collection}"));
    Value::Object(doc)
}

// ============================================================================
// Surveys
// ============================================================================

#[test]
fn surveys_are_staged_with_last_submission_winning() {
    let dir = TempDir::new().unwrap();
    write_fixtures(dir.path());
    let config = run_config(dir.path());
    let mut store = MemoryStore::new();

    let stages = stage_surveys(&config, &mut store).unwrap();
    let pre = &stages[0];
    assert_eq!(pre.collection, PRE_SURVEY_COLLECTION);
    assert_eq!(pre.rows_read, 4);
    assert_eq!(pre.skipped, 1);
    assert_eq!(pre.duplicates, 1);
    assert_eq!(pre.upserts.inserted, 2);
    assert_eq!(stages[1].collection, POST_SURVEY_COLLECTION);
    assert_eq!(stages[1].upserts.inserted, 1);

    let staged = stored(&store, PRE_SURVEY_COLLECTION, "13800000001");
    assert_eq!(staged["age"], json!(30));
    assert_eq!(staged["ga_entry_str"], json!("20.0"));
}

#[test]
fn missing_survey_export_is_fatal() {
    let dir = TempDir::new().unwrap();
    write_fixtures(dir.path());
    fs::remove_file(dir.path().join("240301_post_survey.csv")).unwrap();
    let config = run_config(dir.path());

    let err = stage_surveys(&config, &mut MemoryStore::new()).unwrap_err();
    assert!(format!("{err:#}").contains("post-survey"), "{err:#}");
}

// ============================================================================
// Consolidation
// ============================================================================

#[test]
fn full_run_builds_unified_records() {
    let dir = TempDir::new().unwrap();
    write_fixtures(dir.path());
    let config = run_config(dir.path());
    let mut store = MemoryStore::new();

    let stages = run_all(&config, &mut store);
    let recruited = &stages[2];
    assert_eq!(recruited.rows_read, 2);
    assert_eq!(recruited.upserts.inserted, 2);
    assert!(recruited.excluded.is_empty());
    assert_eq!(recruited.degraded.len(), 1);
    assert_eq!(recruited.degraded[0].mobile.as_str(), "13800000002");

    let historical = &stages[3];
    assert_eq!(historical.rows_read, 3);
    assert_eq!(historical.duplicates, 1);
    assert_eq!(historical.upserts.inserted, 1);
    assert_eq!(historical.excluded.len(), 1);
    assert_eq!(historical.excluded[0].error, ReconcileError::EmptySequence);

    assert_eq!(
        stored(&store, UNIFIED_COLLECTION, "13800000001"),
        json!({
            "type": "recruited",
            "mobile": "13800000001",
            "date_joined": "2023-12-02",
            "name": "张三",
            "age": 30,
            "ga_entry": 140,
            "ga_exit_add": 275,
            "ga_exit_last": 202,
            "bmi": 23.4,
            "edd": null,
            "had_pregnancy": 0,
            "had_preterm": 0,
            "had_surgery": 0,
            "gdm": 1,
            "pih": 0,
            "delivery_type": "natural",
            "add": "2024-03-01 08:30",
            "onset": null
        })
    );

    assert_eq!(
        stored(&store, UNIFIED_COLLECTION, "13800000003"),
        json!({
            "type": "hist",
            "mobile": "13800000003",
            "date_joined": "2024-01-01",
            "name": "Wang Wu",
            "age": 31,
            "ga_entry": 140,
            "ga_exit_add": 261,
            "ga_exit_last": 231,
            "bmi": 21.3,
            "edd": "2024-05-10",
            "had_pregnancy": 1,
            "had_preterm": 0,
            "had_surgery": 0,
            "gdm": 1,
            "pih": 0,
            "delivery_type": "natural",
            "add": "2024-05-01 10:00",
            "onset": "2024-05-01 02:15"
        })
    );

    let unified = store.documents(UNIFIED_COLLECTION).unwrap();
    assert_eq!(unified.len(), 3);
    assert!(store.find(UNIFIED_COLLECTION, KEY_FIELD, "13800000009").unwrap().is_none());
}

#[test]
fn rerunning_converges() {
    let datasets = TempDir::new().unwrap();
    write_fixtures(datasets.path());
    let store_dir = TempDir::new().unwrap();
    let config = run_config(datasets.path());

    let mut store = JsonDirStore::open(store_dir.path()).unwrap();
    run_all(&config, &mut store);
    let first = store.documents(UNIFIED_COLLECTION).unwrap();

    let mut reopened = JsonDirStore::open(store_dir.path()).unwrap();
    let second_run = run_all(&config, &mut reopened);
    for stage in &second_run {
        assert_eq!(
            stage.upserts,
            UpsertSummary {
                unchanged: stage.upserts.total(),
                ..UpsertSummary::default()
            },
            "{} wrote changes on rerun",
            stage.stage
        );
    }
    assert_eq!(reopened.documents(UNIFIED_COLLECTION).unwrap(), first);
}
