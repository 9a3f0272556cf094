use std::io::{self, IsTerminal};
use std::time::{Duration, Instant};

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, info_span};

use mch_cli::config::RunConfig;
use mch_cli::pipeline::{open_store, stage_historical, stage_recruited, stage_surveys};
use mch_cli::types::RunSummary;

use crate::cli::Command;

pub fn run_command(command: Command, config: &RunConfig) -> Result<RunSummary> {
    let run_span = info_span!("run", mode = ?config.mode, date = %config.date);
    let _run_guard = run_span.enter();
    let mut store = open_store(&config.store)?;
    let mut summary = RunSummary::default();

    // =========================================================================
    // Stage 1: Surveys - map exports into the staging collections
    // =========================================================================
    if matches!(command, Command::Run | Command::Surveys) {
        let start = Instant::now();
        let stages = info_span!("surveys").in_scope(|| stage_surveys(config, store.as_mut()))?;
        info!(duration_ms = start.elapsed().as_millis(), "surveys complete");
        summary.extend(stages);
    }

    // =========================================================================
    // Stage 2: Recruited - consolidate staged surveys with measurements
    // =========================================================================
    if matches!(command, Command::Run | Command::Recruited) {
        let start = Instant::now();
        let stage =
            info_span!("recruited").in_scope(|| stage_recruited(config, store.as_mut()))?;
        info!(
            records = stage.upserts.total(),
            excluded = stage.excluded.len(),
            degraded = stage.degraded.len(),
            duration_ms = start.elapsed().as_millis(),
            "recruited complete"
        );
        summary.extend([stage]);
    }

    // =========================================================================
    // Stage 3: Historical - reconstruct patients from the delivery sheet
    // =========================================================================
    if matches!(command, Command::Run | Command::Historical) {
        let start = Instant::now();
        let progress = patient_progress();
        let stage = info_span!("historical")
            .in_scope(|| stage_historical(config, store.as_mut(), &progress))?;
        info!(
            records = stage.upserts.total(),
            excluded = stage.excluded.len(),
            duration_ms = start.elapsed().as_millis(),
            "historical complete"
        );
        summary.extend([stage]);
    }

    Ok(summary)
}

/// Per-patient progress bar, hidden when stderr is not a terminal.
fn patient_progress() -> ProgressBar {
    if !io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let progress = ProgressBar::new(0);
    progress.set_prefix("historical");
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} {prefix:.bold} [{elapsed_precise}] [{bar:32.cyan/blue}] \
{pos}/{len} ({percent}%) eta {eta_precise}",
    ) {
        progress.set_style(style.progress_chars("=> "));
    }
    progress.enable_steady_tick(Duration::from_millis(250));
    progress
}
