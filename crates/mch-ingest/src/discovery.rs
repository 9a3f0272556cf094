//! Dataset directory layout and survey export discovery.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{Local, NaiveDate};

use crate::error::{IngestError, Result};

const PRE_SURVEY_SUFFIX: &str = "_pre_survey.csv";
const POST_SURVEY_SUFFIX: &str = "_post_survey.csv";

/// File names of the non-survey exports.
pub const MEASUREMENTS_FILE: &str = "measurements.csv";
pub const HISTORICAL_METADATA_FILE: &str = "historical_metadata.csv";
pub const HISTORICAL_PROFILES_FILE: &str = "historical_profiles.csv";

/// Date selector for a pair of survey exports, written `yymmdd`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurveyDate(NaiveDate);

impl SurveyDate {
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    pub fn date(self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for SurveyDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl FromStr for SurveyDate {
    type Err = IngestError;

    fn from_str(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        let invalid = || IngestError::InvalidDate {
            value: value.to_string(),
        };
        if trimmed.len() != 6 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        NaiveDate::parse_from_str(trimmed, "%y%m%d")
            .map(Self)
            .map_err(|_| invalid())
    }
}

impl fmt::Display for SurveyDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%y%m%d"))
    }
}

/// Where each input lives under the datasets directory.
#[derive(Debug, Clone)]
pub struct DatasetLayout {
    root: PathBuf,
}

impl DatasetLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Layout over an existing directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(IngestError::DirectoryNotFound { path: root });
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn pre_survey(&self, date: SurveyDate) -> PathBuf {
        self.root.join(format!("{date}{PRE_SURVEY_SUFFIX}"))
    }

    pub fn post_survey(&self, date: SurveyDate) -> PathBuf {
        self.root.join(format!("{date}{POST_SURVEY_SUFFIX}"))
    }

    pub fn measurements(&self) -> PathBuf {
        self.root.join(MEASUREMENTS_FILE)
    }

    pub fn historical_metadata(&self) -> PathBuf {
        self.root.join(HISTORICAL_METADATA_FILE)
    }

    pub fn historical_profiles(&self) -> PathBuf {
        self.root.join(HISTORICAL_PROFILES_FILE)
    }

    /// Survey dates for which both the pre and post exports exist.
    pub fn survey_dates(&self) -> Result<Vec<SurveyDate>> {
        let mut pre = BTreeSet::new();
        let mut post = BTreeSet::new();
        for path in list_csv_files(&self.root)? {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if let Some(stem) = name.strip_suffix(PRE_SURVEY_SUFFIX) {
                if let Ok(date) = stem.parse::<SurveyDate>() {
                    pre.insert(date);
                }
            } else if let Some(stem) = name.strip_suffix(POST_SURVEY_SUFFIX)
                && let Ok(date) = stem.parse::<SurveyDate>()
            {
                post.insert(date);
            }
        }
        Ok(pre.intersection(&post).copied().collect())
    }

    /// Most recent date with both survey exports present.
    pub fn latest_survey_date(&self) -> Result<Option<SurveyDate>> {
        Ok(self.survey_dates()?.pop())
    }
}

/// Returns `path` if it is an existing file.
pub fn require_file(path: PathBuf) -> Result<PathBuf> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(IngestError::FileNotFound { path })
    }
}

/// Lists all CSV files in a directory.
///
/// Returns files sorted by filename.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
