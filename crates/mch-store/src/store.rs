//! The keyed document store interface.

use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, StoreError};

/// A stored document: a JSON object.
pub type Document = serde_json::Map<String, Value>;

/// What one upsert did to the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    /// A matching document already held every provided value.
    Unchanged,
}

/// Outcome counts for a batch of upserts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertSummary {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
}

impl UpsertSummary {
    pub fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted => self.inserted += 1,
            UpsertOutcome::Updated => self.updated += 1,
            UpsertOutcome::Unchanged => self.unchanged += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.inserted + self.updated + self.unchanged
    }
}

/// Collections of JSON documents matched on a string key field.
///
/// Upsert finds the document whose `key` field equals the new document's,
/// replaces the fields the new document provides and inserts it when no
/// document matches. Writing the same document twice leaves the collection
/// as writing it once did.
pub trait DocumentStore {
    /// Creates a unique index on `field`; an existing index is not an error.
    ///
    /// Returns `true` when the index was created by this call.
    fn ensure_unique_index(&mut self, collection: &str, field: &str) -> Result<bool>;

    fn upsert(&mut self, collection: &str, key: &str, document: Document) -> Result<UpsertOutcome>;

    /// Upserts a batch in order. Stops at the first failing document.
    fn upsert_many(
        &mut self,
        collection: &str,
        key: &str,
        documents: Vec<Document>,
    ) -> Result<UpsertSummary> {
        let mut summary = UpsertSummary::default();
        for document in documents {
            summary.record(self.upsert(collection, key, document)?);
        }
        Ok(summary)
    }

    fn find(&self, collection: &str, key: &str, value: &str) -> Result<Option<Document>>;

    /// All documents of `collection` in insertion order; empty when it does not exist.
    fn documents(&self, collection: &str) -> Result<Vec<Document>>;
}

/// Serializes `record` into a store document.
pub fn to_document<T: Serialize>(collection: &str, record: &T) -> Result<Document> {
    let value = serde_json::to_value(record).map_err(|source| StoreError::Serialization {
        collection: collection.to_string(),
        source,
    })?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(StoreError::NotAnObject {
            collection: collection.to_string(),
        }),
    }
}

/// Ensures the unique key index, then upserts every record keyed on `key`.
pub fn upsert_records<S, T>(
    store: &mut S,
    collection: &str,
    key: &str,
    records: &[T],
) -> Result<UpsertSummary>
where
    S: DocumentStore + ?Sized,
    T: Serialize,
{
    store.ensure_unique_index(collection, key)?;
    let documents = records
        .iter()
        .map(|record| to_document(collection, record))
        .collect::<Result<Vec<_>>>()?;
    let summary = store.upsert_many(collection, key, documents)?;
    tracing::info!(
        collection,
        inserted = summary.inserted,
        updated = summary.updated,
        unchanged = summary.unchanged,
        "upserted records"
    );
    Ok(summary)
}
