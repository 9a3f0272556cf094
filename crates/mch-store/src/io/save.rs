//! Collection saving.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::collection::Collection;
use crate::error::{Result, StoreError};

/// Writes a collection file.
///
/// Uses atomic write (temp file + rename) so a crash never leaves a
/// half-written collection behind.
pub(crate) fn save_collection(collection: &Collection, name: &str, path: &Path) -> Result<()> {
    let bytes =
        serde_json::to_vec_pretty(collection).map_err(|source| StoreError::Serialization {
            collection: name.to_string(),
            source,
        })?;

    let temp_path = path.with_extension("json.tmp");

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StoreError::io("create directory", parent, e))?;
    }

    let mut file =
        File::create(&temp_path).map_err(|e| StoreError::io("create", &temp_path, e))?;
    file.write_all(&bytes)
        .map_err(|e| StoreError::io("write", &temp_path, e))?;
    file.sync_all()
        .map_err(|e| StoreError::io("sync", &temp_path, e))?;

    fs::rename(&temp_path, path).map_err(|source| StoreError::AtomicWriteFailed {
        temp_path: temp_path.clone(),
        target_path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(
        path = %path.display(),
        documents = collection.documents.len(),
        "saved collection"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::load_collection;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("patients.json");

        let mut collection = Collection::default();
        collection.unique_indexes.insert("mobile".to_string());
        let Some(doc) = json!({"mobile": "13800000000", "ga_entry": 96}).as_object().cloned()
        else {
            panic!("object literal");
        };
        collection.documents.push(doc);

        save_collection(&collection, "patients", &path).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(load_collection(&path).unwrap(), collection);
    }
}
