//! Clinical measurements and gestational age.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Days in one gestational week.
pub const DAYS_PER_WEEK: u32 = 7;

/// Gestational age as a count of days since presumed conception.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct GestationalAge(u32);

impl GestationalAge {
    pub const fn from_days(days: u32) -> Self {
        Self(days)
    }

    /// Builds a GA from a weeks/days pair, e.g. 38 weeks 4 days.
    pub const fn from_weeks_days(weeks: u32, days: u32) -> Self {
        Self(weeks * DAYS_PER_WEEK + days)
    }

    pub const fn days(self) -> u32 {
        self.0
    }

    pub const fn weeks(self) -> u32 {
        self.0 / DAYS_PER_WEEK
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for GestationalAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}w{}d", self.weeks(), self.0 % DAYS_PER_WEEK)
    }
}

/// One clinical reading for a patient.
///
/// `basic_info` is the serialized registration object recorded by the device
/// app; `conclusion` is the clinician's free-text note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement {
    pub timestamp: NaiveDateTime,
    pub basic_info: String,
    pub conclusion: Option<String>,
}

impl Measurement {
    pub fn new(
        timestamp: NaiveDateTime,
        basic_info: impl Into<String>,
        conclusion: Option<String>,
    ) -> Self {
        Self {
            timestamp,
            basic_info: basic_info.into(),
            conclusion,
        }
    }
}

/// Sorts measurements by timestamp ascending, keeping source order for ties.
pub fn sort_measurements(measurements: &mut [Measurement]) {
    measurements.sort_by_key(|m| m.timestamp);
}
