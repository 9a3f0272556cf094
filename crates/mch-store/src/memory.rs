//! Store held entirely in memory.

use std::collections::BTreeMap;

use crate::collection::{Collection, validate_name};
use crate::error::Result;
use crate::store::{Document, DocumentStore, UpsertOutcome};

/// In-memory [`DocumentStore`], used by `test` mode and the test suites.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    collections: BTreeMap<String, Collection>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of collections that have been written to.
    pub fn collection_names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    fn collection_mut(&mut self, name: &str) -> Result<&mut Collection> {
        validate_name(name)?;
        Ok(self.collections.entry(name.to_string()).or_default())
    }
}

impl DocumentStore for MemoryStore {
    fn ensure_unique_index(&mut self, collection: &str, field: &str) -> Result<bool> {
        self.collection_mut(collection)?
            .ensure_unique_index(collection, field)
    }

    fn upsert(&mut self, collection: &str, key: &str, document: Document) -> Result<UpsertOutcome> {
        self.collection_mut(collection)?
            .upsert(collection, key, document)
    }

    fn find(&self, collection: &str, key: &str, value: &str) -> Result<Option<Document>> {
        validate_name(collection)?;
        Ok(self
            .collections
            .get(collection)
            .and_then(|c| c.find(key, value))
            .cloned())
    }

    fn documents(&self, collection: &str) -> Result<Vec<Document>> {
        validate_name(collection)?;
        Ok(self
            .collections
            .get(collection)
            .map(|c| c.documents.clone())
            .unwrap_or_default())
    }
}
