//! The unified per-patient document.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::enums::{DeliveryType, RecordType};
use crate::ids::ContactId;
use crate::serde_fmt::{flag01, minute_datetime};

/// Store field holding the contact identifier on every collection.
pub const KEY_FIELD: &str = "mobile";

/// Flat document written to the unified collection, keyed by `mobile`.
///
/// Every field is always serialized (absent values as `null`) so that an
/// upsert replaces stale values left by an earlier run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedPatientRecord {
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub mobile: ContactId,
    pub date_joined: Option<NaiveDate>,
    pub name: Option<String>,
    pub age: Option<u32>,
    /// Entry gestational age in days.
    pub ga_entry: Option<i64>,
    /// Gestational age in days at the actual delivery date.
    pub ga_exit_add: Option<i64>,
    /// Gestational age in days at the last device measurement.
    ///
    /// Always projected from the reconciled entry GA. Historical records cap
    /// it at the reconciled exit at delivery; recruited records keep readings
    /// taken after delivery uncapped.
    pub ga_exit_last: Option<i64>,
    pub bmi: Option<f64>,
    pub edd: Option<NaiveDate>,
    #[serde(with = "flag01")]
    pub had_pregnancy: bool,
    #[serde(with = "flag01")]
    pub had_preterm: bool,
    #[serde(with = "flag01")]
    pub had_surgery: bool,
    #[serde(with = "flag01")]
    pub gdm: bool,
    #[serde(with = "flag01")]
    pub pih: bool,
    pub delivery_type: Option<DeliveryType>,
    #[serde(with = "minute_datetime")]
    pub add: Option<NaiveDateTime>,
    #[serde(with = "minute_datetime")]
    pub onset: Option<NaiveDateTime>,
}

impl UnifiedPatientRecord {
    /// An empty record of the given cohort; every optional field unset and
    /// every flag cleared.
    pub fn new(record_type: RecordType, mobile: ContactId) -> Self {
        Self {
            record_type,
            mobile,
            date_joined: None,
            name: None,
            age: None,
            ga_entry: None,
            ga_exit_add: None,
            ga_exit_last: None,
            bmi: None,
            edd: None,
            had_pregnancy: false,
            had_preterm: false,
            had_surgery: false,
            gdm: false,
            pih: false,
            delivery_type: None,
            add: None,
            onset: None,
        }
    }

    pub fn key(&self) -> &ContactId {
        &self.mobile
    }
}
