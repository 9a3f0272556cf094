//! Run configuration: `mch.toml` plus command-line overrides.
//!
//! ```toml
//! datasets_dir = "datasets"
//! full_term_days = 280
//!
//! [profiles.local]
//! store_dir = "store/local"
//!
//! [profiles.remote]
//! store_dir = "/srv/mch/store"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use mch_core::{FULL_TERM_DAYS, Reconciler};
use mch_ingest::{DatasetLayout, SurveyDate};
use serde::Deserialize;
use tracing::{debug, info};

/// Config file read from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "mch.toml";
const DEFAULT_DATASETS_DIR: &str = "datasets";
const DEFAULT_LOCAL_STORE: &str = "store/local";
const DEFAULT_REMOTE_STORE: &str = "store/remote";

/// Which store profile a run writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Local,
    Remote,
    /// In-memory store; nothing is persisted.
    Test,
}

/// Contents of `mch.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub datasets_dir: Option<PathBuf>,
    pub full_term_days: Option<i64>,
    pub profiles: Profiles,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Profiles {
    pub local: StoreProfile,
    pub remote: StoreProfile,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreProfile {
    pub store_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Loads `path`, or `mch.toml` in the working directory when it exists.
    ///
    /// An explicit path must exist; the implicit file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::from_file(default)
                } else {
                    debug!("no {DEFAULT_CONFIG_FILE} found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let config = Self::parse(&text)
            .with_context(|| format!("parse config file {}", path.display()))?;
        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub datasets_dir: Option<PathBuf>,
    pub store_dir: Option<PathBuf>,
    pub date: Option<SurveyDate>,
    /// Use the most recent date that has both survey exports.
    pub latest: bool,
    pub full_term_days: Option<i64>,
}

/// Where records are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreTarget {
    Memory,
    JsonDir(PathBuf),
}

/// Fully resolved settings handed to every pipeline stage.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub mode: Mode,
    pub datasets: DatasetLayout,
    pub date: SurveyDate,
    pub reconciler: Reconciler,
    pub store: StoreTarget,
}

impl RunConfig {
    pub fn resolve(mode: Mode, app: &AppConfig, overrides: &RunOverrides) -> Result<Self> {
        let datasets_dir = overrides
            .datasets_dir
            .clone()
            .or_else(|| app.datasets_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATASETS_DIR));
        let datasets = DatasetLayout::new(datasets_dir);

        let full_term_days = overrides
            .full_term_days
            .or(app.full_term_days)
            .unwrap_or(FULL_TERM_DAYS);
        if full_term_days <= 0 {
            bail!("full_term_days must be positive, got {full_term_days}");
        }

        let date = match (overrides.date, overrides.latest) {
            (Some(date), _) => date,
            (None, true) => datasets
                .latest_survey_date()
                .context("scan datasets for survey exports")?
                .with_context(|| {
                    format!(
                        "no date has both survey exports in {}",
                        datasets.root().display()
                    )
                })?,
            (None, false) => SurveyDate::today(),
        };

        let store = match mode {
            Mode::Test => StoreTarget::Memory,
            Mode::Local => StoreTarget::JsonDir(
                overrides
                    .store_dir
                    .clone()
                    .or_else(|| app.profiles.local.store_dir.clone())
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_LOCAL_STORE)),
            ),
            Mode::Remote => StoreTarget::JsonDir(
                overrides
                    .store_dir
                    .clone()
                    .or_else(|| app.profiles.remote.store_dir.clone())
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_REMOTE_STORE)),
            ),
        };

        Ok(Self {
            mode,
            datasets,
            date,
            reconciler: Reconciler::new(full_term_days),
            store,
        })
    }
}
