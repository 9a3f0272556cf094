//! Pipeline stages.
//!
//! Each stage reads its inputs, runs the pure transformations in `mch-core`
//! and upserts the results. Missing inputs and store failures abort the run;
//! per-patient problems are carried in the returned [`StageSummary`].

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use mch_core::{
    HistoricalInputs, RecruitedInputs, SurveyBatch, assemble_historical, assemble_recruited,
    dedupe_last_wins, map_post_survey, map_pre_survey,
};
use mch_ingest::{
    read_csv_table, read_historical_profiles, read_historical_sheet, read_measurements,
    require_file,
};
use mch_model::{
    ContactId, KEY_FIELD, POST_SURVEY_COLLECTION, PRE_SURVEY_COLLECTION, PostSurveyRecord,
    PreSurveyRecord, UNIFIED_COLLECTION,
};
use mch_store::{DocumentStore, JsonDirStore, MemoryStore, upsert_records};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::info;

use crate::config::{RunConfig, StoreTarget};
use crate::types::StageSummary;

/// Opens the store a run writes to.
pub fn open_store(target: &StoreTarget) -> Result<Box<dyn DocumentStore>> {
    let store: Box<dyn DocumentStore> = match target {
        StoreTarget::Memory => Box::new(MemoryStore::new()),
        StoreTarget::JsonDir(root) => Box::new(
            JsonDirStore::open(root)
                .with_context(|| format!("open store at {}", root.display()))?,
        ),
    };
    Ok(store)
}

/// Maps both survey exports for the configured date into their staging collections.
pub fn stage_surveys(config: &RunConfig, store: &mut dyn DocumentStore) -> Result<Vec<StageSummary>> {
    let pre_path = require_file(config.datasets.pre_survey(config.date))
        .context("locate pre-survey export")?;
    let post_path = require_file(config.datasets.post_survey(config.date))
        .context("locate post-survey export")?;

    let pre_table = read_csv_table(&pre_path)?;
    let pre = map_pre_survey(&pre_table)
        .with_context(|| format!("map pre-survey {}", pre_path.display()))?;
    let pre_summary = upsert_survey(store, "pre-survey", PRE_SURVEY_COLLECTION, pre, |r| {
        &r.mobile
    })?;

    let post_table = read_csv_table(&post_path)?;
    let post = map_post_survey(&post_table)
        .with_context(|| format!("map post-survey {}", post_path.display()))?;
    let post_summary = upsert_survey(store, "post-survey", POST_SURVEY_COLLECTION, post, |r| {
        &r.mobile
    })?;

    Ok(vec![pre_summary, post_summary])
}

fn upsert_survey<T, F>(
    store: &mut dyn DocumentStore,
    stage: &'static str,
    collection: &'static str,
    batch: SurveyBatch<T>,
    key: F,
) -> Result<StageSummary>
where
    T: Serialize,
    F: Fn(&T) -> &ContactId,
{
    let SurveyBatch {
        records,
        rows_read,
        skipped,
    } = batch;
    let deduped = dedupe_last_wins(records, stage, key);
    let upserts = upsert_records(store, collection, KEY_FIELD, &deduped.records)
        .with_context(|| format!("upsert into {collection}"))?;
    info!(
        stage,
        rows_read,
        skipped,
        duplicates = deduped.duplicates,
        "survey staged"
    );
    Ok(StageSummary {
        stage,
        collection,
        rows_read,
        duplicates: deduped.duplicates,
        skipped,
        upserts,
        ..StageSummary::default()
    })
}

/// Consolidates the staged surveys and the recruited patients' measurements.
pub fn stage_recruited(config: &RunConfig, store: &mut dyn DocumentStore) -> Result<StageSummary> {
    let pre: Vec<PreSurveyRecord> = read_staged(store, PRE_SURVEY_COLLECTION)?;
    let post: Vec<PostSurveyRecord> = read_staged(store, POST_SURVEY_COLLECTION)?;
    info!(pre = pre.len(), post = post.len(), "read staged surveys");

    let contacts: BTreeSet<ContactId> = pre.iter().map(|r| r.mobile.clone()).collect();
    let measurements_path =
        require_file(config.datasets.measurements()).context("locate measurements export")?;
    let measurements = read_measurements(&measurements_path, Some(&contacts))?;

    let inputs = RecruitedInputs {
        pre: &pre,
        post: &post,
        measurements: &measurements,
    };
    let batch = assemble_recruited(&inputs, &config.reconciler);
    let upserts = upsert_records(store, UNIFIED_COLLECTION, KEY_FIELD, &batch.records)
        .with_context(|| format!("upsert into {UNIFIED_COLLECTION}"))?;

    Ok(StageSummary {
        stage: "recruited",
        collection: UNIFIED_COLLECTION,
        rows_read: pre.len(),
        excluded: batch.excluded,
        degraded: batch.degraded,
        upserts,
        ..StageSummary::default()
    })
}

/// Reconstructs historical patients from the delivery sheet, profiles and measurements.
///
/// `progress` advances once per patient.
pub fn stage_historical(
    config: &RunConfig,
    store: &mut dyn DocumentStore,
    progress: &ProgressBar,
) -> Result<StageSummary> {
    let sheet_path = require_file(config.datasets.historical_metadata())
        .context("locate historical metadata")?;
    let sheet = read_historical_sheet(&sheet_path)?;
    let rows_read = sheet.len();
    let sheet = dedupe_last_wins(sheet, "historical", |row| &row.mobile);

    let contacts: BTreeSet<ContactId> = sheet.records.iter().map(|r| r.mobile.clone()).collect();
    let profiles_path = require_file(config.datasets.historical_profiles())
        .context("locate historical profiles")?;
    let profiles = read_historical_profiles(&profiles_path, Some(&contacts))?;
    let measurements_path =
        require_file(config.datasets.measurements()).context("locate measurements export")?;
    let measurements = read_measurements(&measurements_path, Some(&contacts))?;

    let inputs = HistoricalInputs {
        sheet: &sheet.records,
        profiles: &profiles,
        measurements: &measurements,
    };
    progress.set_length(sheet.records.len() as u64);
    let batch = assemble_historical(&inputs, &config.reconciler, |_| progress.inc(1));
    progress.finish_and_clear();

    let upserts = upsert_records(store, UNIFIED_COLLECTION, KEY_FIELD, &batch.records)
        .with_context(|| format!("upsert into {UNIFIED_COLLECTION}"))?;

    Ok(StageSummary {
        stage: "historical",
        collection: UNIFIED_COLLECTION,
        rows_read,
        duplicates: sheet.duplicates,
        excluded: batch.excluded,
        degraded: batch.degraded,
        upserts,
        ..StageSummary::default()
    })
}

/// Deserializes every document of a staging collection.
fn read_staged<T: DeserializeOwned>(store: &dyn DocumentStore, collection: &str) -> Result<Vec<T>> {
    store
        .documents(collection)
        .with_context(|| format!("read {collection}"))?
        .into_iter()
        .map(|doc| {
            serde_json::from_value(Value::Object(doc))
                .with_context(|| format!("decode document from {collection}"))
        })
        .collect()
}
