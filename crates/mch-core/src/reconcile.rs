//! Entry/exit gestational-age reconciliation.
//!
//! A patient's measurement history can start long before the pregnancy being
//! studied: devices are reused across pregnancies, and the first reading may
//! belong to an earlier one. Given the delivery timestamp, the reconciler
//! moves the entry point forward until it lies within one full term of
//! delivery, then projects the first GA found at or after the entry back to
//! the entry timestamp.
//!
//! Two indices walk the sorted slice: `earliest` marks the entry measurement
//! and `ga_cursor` marks where the GA search resumes. Whenever `earliest`
//! moves, `ga_cursor` is brought to the same index before searching again,
//! whichever side of it the cursor was on.

use chrono::NaiveDateTime;
use mch_model::{Measurement, ReconciliationResult};
use thiserror::Error;
use tracing::debug;

use crate::gestational_age::extract_gestational_age;

/// Days in a full-term pregnancy.
pub const FULL_TERM_DAYS: i64 = 280;

/// Why no result could be produced for one patient.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    #[error("no measurements")]
    EmptySequence,

    /// No measurement at or after the entry point records a GA.
    #[error("no gestational age recorded at or after {entry}")]
    NoGestationalAge { entry: NaiveDateTime },

    #[error("delivery {delivery} precedes first measurement {first}")]
    DeliveryBeforeEntry {
        delivery: NaiveDateTime,
        first: NaiveDateTime,
    },

    /// Every measurement is more than one full term before delivery.
    #[error("no measurement within {term_days} days of delivery {delivery}")]
    NoMeasurementWithinTerm {
        delivery: NaiveDateTime,
        term_days: i64,
    },
}

/// Reconciles entry and exit GA over a patient's sorted measurements.
#[derive(Debug, Clone, Copy)]
pub struct Reconciler {
    full_term_days: i64,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self {
            full_term_days: FULL_TERM_DAYS,
        }
    }
}

impl Reconciler {
    pub fn new(full_term_days: i64) -> Self {
        Self { full_term_days }
    }

    pub fn full_term_days(&self) -> i64 {
        self.full_term_days
    }

    /// Runs reconciliation. `measurements` must be sorted by timestamp.
    ///
    /// Without a delivery timestamp the entry is the first measurement and
    /// both exit values are absent.
    pub fn reconcile(
        &self,
        measurements: &[Measurement],
        delivery: Option<NaiveDateTime>,
    ) -> Result<ReconciliationResult, ReconcileError> {
        let (first, last) = match measurements {
            [] => return Err(ReconcileError::EmptySequence),
            [only] => (only, only),
            [first, .., last] => (first, last),
        };

        if let Some(delivery) = delivery
            && delivery < first.timestamp
        {
            return Err(ReconcileError::DeliveryBeforeEntry {
                delivery,
                first: first.timestamp,
            });
        }

        let mut earliest = 0usize;
        let mut ga_cursor = 0usize;
        let mut entry_ga = self.entry_ga(measurements, earliest, &mut ga_cursor)?;

        let Some(delivery) = delivery else {
            return Ok(ReconciliationResult {
                entry_timestamp: first.timestamp,
                entry_ga_days: entry_ga,
                exit_ga_days_at_delivery: None,
                exit_ga_days_at_last_measurement: None,
            });
        };

        if days_between(measurements[earliest].timestamp, delivery) > self.full_term_days {
            while earliest < measurements.len()
                && days_between(measurements[earliest].timestamp, delivery) > self.full_term_days
            {
                earliest += 1;
            }
            if earliest == measurements.len() {
                return Err(ReconcileError::NoMeasurementWithinTerm {
                    delivery,
                    term_days: self.full_term_days,
                });
            }
            debug!(
                skipped = earliest,
                cursor = ga_cursor,
                "entry moved within one term of delivery"
            );
            ga_cursor = resync_cursor(ga_cursor, earliest);
            entry_ga = self.entry_ga(measurements, earliest, &mut ga_cursor)?;
        }

        let entry = measurements[earliest].timestamp;
        Ok(ReconciliationResult {
            entry_timestamp: entry,
            entry_ga_days: entry_ga,
            exit_ga_days_at_delivery: Some(entry_ga + days_between(entry, delivery)),
            exit_ga_days_at_last_measurement: Some(entry_ga + days_between(entry, last.timestamp)),
        })
    }

    /// Scans from `ga_cursor` for the first GA and projects it back to `earliest`.
    ///
    /// Leaves `ga_cursor` on the measurement the GA came from.
    fn entry_ga(
        &self,
        measurements: &[Measurement],
        earliest: usize,
        ga_cursor: &mut usize,
    ) -> Result<i64, ReconcileError> {
        while *ga_cursor < measurements.len() {
            let m = &measurements[*ga_cursor];
            if let Some(ga) = extract_gestational_age(m.conclusion.as_deref(), &m.basic_info) {
                let elapsed = days_between(measurements[earliest].timestamp, m.timestamp);
                return Ok(i64::from(ga.days()) - elapsed);
            }
            *ga_cursor += 1;
        }
        Err(ReconcileError::NoGestationalAge {
            entry: measurements[earliest].timestamp,
        })
    }
}

/// Steps the GA cursor toward `earliest` until the two indices match.
fn resync_cursor(mut ga_cursor: usize, earliest: usize) -> usize {
    while ga_cursor < earliest {
        ga_cursor += 1;
    }
    while ga_cursor > earliest {
        ga_cursor -= 1;
    }
    ga_cursor
}

/// Whole days from `from` to `to`, rounded toward negative infinity.
fn days_between(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    let delta = to - from;
    let days = delta.num_days();
    if delta < chrono::TimeDelta::days(days) {
        days - 1
    } else {
        days
    }
}
