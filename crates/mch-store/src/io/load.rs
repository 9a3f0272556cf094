//! Collection loading.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::collection::Collection;
use crate::error::{Result, StoreError};

/// Reads a collection file. A missing file is an empty collection.
pub(crate) fn load_collection(path: &Path) -> Result<Collection> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Collection::default()),
        Err(e) => return Err(StoreError::io("read", path, e)),
    };

    let collection: Collection =
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Deserialization {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::debug!(
        path = %path.display(),
        documents = collection.documents.len(),
        "loaded collection"
    );
    Ok(collection)
}
