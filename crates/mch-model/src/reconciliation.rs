use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Entry and exit gestational ages inferred for one patient.
///
/// Day counts are signed because the exit values are derived by adding
/// calendar-day differences to a projected entry GA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    /// Timestamp of the measurement selected as the true pregnancy entry.
    pub entry_timestamp: NaiveDateTime,
    pub entry_ga_days: i64,
    /// Present only when a delivery timestamp was supplied.
    pub exit_ga_days_at_delivery: Option<i64>,
    /// Present only when a delivery timestamp was supplied.
    pub exit_ga_days_at_last_measurement: Option<i64>,
}

impl ReconciliationResult {
    /// Exit GA at the last measurement, capped at the exit GA at delivery.
    ///
    /// Readings taken after delivery would otherwise report a GA past birth.
    pub fn capped_exit_at_last(&self) -> Option<i64> {
        match (
            self.exit_ga_days_at_last_measurement,
            self.exit_ga_days_at_delivery,
        ) {
            (Some(last), Some(delivery)) => Some(last.min(delivery)),
            (last, _) => last,
        }
    }
}
