//! Store backed by a directory of JSON collection files.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::collection::{Collection, validate_name};
use crate::error::{Result, StoreError};
use crate::io::{load_collection, save_collection};
use crate::store::{Document, DocumentStore, UpsertOutcome, UpsertSummary};

/// [`DocumentStore`] keeping each collection in `<root>/<collection>.json`.
///
/// Every mutating call loads the collection, applies the change and writes
/// the file back atomically, so the directory always holds complete
/// collections. Batches go through [`DocumentStore::upsert_many`], which
/// writes once per batch.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    root: PathBuf,
}

impl JsonDirStore {
    /// Opens (creating if needed) the store directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| StoreError::io("create directory", &root, e))?;
        info!(root = %root.display(), "opened JSON store");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File holding `collection`.
    pub fn collection_path(&self, collection: &str) -> Result<PathBuf> {
        validate_name(collection)?;
        Ok(self.root.join(format!("{collection}.json")))
    }

    fn modify<T>(
        &mut self,
        collection: &str,
        apply: impl FnOnce(&mut Collection) -> Result<T>,
    ) -> Result<T> {
        let path = self.collection_path(collection)?;
        let mut contents = load_collection(&path)?;
        let before = contents.clone();
        let result = apply(&mut contents)?;
        if contents != before {
            save_collection(&contents, collection, &path)?;
        }
        Ok(result)
    }
}

impl DocumentStore for JsonDirStore {
    fn ensure_unique_index(&mut self, collection: &str, field: &str) -> Result<bool> {
        self.modify(collection, |c| c.ensure_unique_index(collection, field))
    }

    fn upsert(&mut self, collection: &str, key: &str, document: Document) -> Result<UpsertOutcome> {
        self.modify(collection, |c| c.upsert(collection, key, document))
    }

    /// Applies the whole batch in memory and writes the file once.
    ///
    /// A failing document aborts the batch and nothing is written.
    fn upsert_many(
        &mut self,
        collection: &str,
        key: &str,
        documents: Vec<Document>,
    ) -> Result<UpsertSummary> {
        self.modify(collection, |c| {
            let mut summary = UpsertSummary::default();
            for document in documents {
                summary.record(c.upsert(collection, key, document)?);
            }
            Ok(summary)
        })
    }

    fn find(&self, collection: &str, key: &str, value: &str) -> Result<Option<Document>> {
        let path = self.collection_path(collection)?;
        Ok(load_collection(&path)?.find(key, value).cloned())
    }

    fn documents(&self, collection: &str) -> Result<Vec<Document>> {
        let path = self.collection_path(collection)?;
        Ok(load_collection(&path)?.documents)
    }
}
