//! Data model for consolidated maternal-health patient records.

pub mod enums;
pub mod error;
pub mod ids;
pub mod measurement;
pub mod reconciliation;
pub mod redact;
pub mod record;
pub mod serde_fmt;
pub mod survey;

pub use enums::{DeliveryType, RecordType};
pub use error::{ModelError, Result};
pub use ids::ContactId;
pub use measurement::{DAYS_PER_WEEK, GestationalAge, Measurement, sort_measurements};
pub use reconciliation::ReconciliationResult;
pub use redact::{REDACTED_VALUE, log_data_enabled, redact, set_log_data_enabled};
pub use record::{KEY_FIELD, UnifiedPatientRecord};
pub use survey::{
    Answer, POST_SURVEY_COLLECTION, PRE_SURVEY_COLLECTION, PostSurveyRecord, PreSurveyRecord,
    UNIFIED_COLLECTION,
};
