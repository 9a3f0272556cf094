//! Keyed document storage for patient records.
//!
//! Records are stored as JSON objects in named collections and written with
//! upsert semantics: match on a key field, replace the provided fields,
//! insert when absent. Two backends implement [`DocumentStore`]:
//!
//! - [`MemoryStore`] keeps everything in memory (test runs),
//! - [`JsonDirStore`] keeps one JSON file per collection in a directory,
//!   replacing files atomically.
//!
//! # Example
//!
//! ```
//! use mch_store::{DocumentStore, MemoryStore, UpsertOutcome, to_document};
//! use serde_json::json;
//!
//! let mut store = MemoryStore::new();
//! let doc = to_document("patients", &json!({"mobile": "13800000000", "bmi": 21.5}))?;
//!
//! assert_eq!(store.upsert("patients", "mobile", doc.clone())?, UpsertOutcome::Inserted);
//! assert_eq!(store.upsert("patients", "mobile", doc)?, UpsertOutcome::Unchanged);
//! # Ok::<(), mch_store::StoreError>(())
//! ```

mod collection;
mod error;
mod io;
mod json_dir;
mod memory;
mod store;

pub use error::{Result, StoreError};
pub use json_dir::JsonDirStore;
pub use memory::MemoryStore;
pub use store::{
    Document, DocumentStore, UpsertOutcome, UpsertSummary, to_document, upsert_records,
};
