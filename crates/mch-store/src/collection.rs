//! In-memory collection contents shared by every store backend.

use std::collections::BTreeSet;

use mch_model::redact;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::store::{Document, UpsertOutcome};

/// Documents of one collection plus the fields carrying a unique index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct Collection {
    #[serde(default)]
    pub unique_indexes: BTreeSet<String>,
    #[serde(default)]
    pub documents: Vec<Document>,
}

impl Collection {
    /// Adds a unique index on `field`. Returns `false` when it already exists.
    pub fn ensure_unique_index(&mut self, name: &str, field: &str) -> Result<bool> {
        if self.unique_indexes.contains(field) {
            debug!(collection = name, field, "unique index already exists");
            return Ok(false);
        }
        let mut seen = BTreeSet::new();
        for value in self.documents.iter().filter_map(|doc| doc.get(field)) {
            if !value.is_null() && !seen.insert(value_key(value)) {
                return Err(StoreError::DuplicateKey {
                    collection: name.to_string(),
                    field: field.to_string(),
                    value: redact(&value_key(value)).to_string(),
                });
            }
        }
        self.unique_indexes.insert(field.to_string());
        Ok(true)
    }

    pub fn find(&self, key: &str, value: &str) -> Option<&Document> {
        self.position(key, value).map(|i| &self.documents[i])
    }

    /// Finds the document whose `key` equals the document's own `key`,
    /// overwrites the fields `document` provides, inserts when none matches.
    pub fn upsert(&mut self, name: &str, key: &str, document: Document) -> Result<UpsertOutcome> {
        let Some(value) = document.get(key).and_then(Value::as_str).map(str::to_string) else {
            return Err(StoreError::MissingKey {
                collection: name.to_string(),
                key: key.to_string(),
            });
        };

        let position = self.position(key, &value);
        let merged = match position {
            Some(i) => {
                let mut merged = self.documents[i].clone();
                for (field, field_value) in document {
                    merged.insert(field, field_value);
                }
                if merged == self.documents[i] {
                    return Ok(UpsertOutcome::Unchanged);
                }
                merged
            }
            None => document,
        };

        self.check_unique(name, &merged, position)?;

        let outcome = match position {
            Some(i) => {
                self.documents[i] = merged;
                UpsertOutcome::Updated
            }
            None => {
                self.documents.push(merged);
                UpsertOutcome::Inserted
            }
        };
        debug!(collection = name, key = %redact(&value), ?outcome, "upsert");
        Ok(outcome)
    }

    fn position(&self, key: &str, value: &str) -> Option<usize> {
        self.documents
            .iter()
            .position(|doc| doc.get(key).and_then(Value::as_str) == Some(value))
    }

    /// Rejects `candidate` if another document shares a uniquely indexed value.
    fn check_unique(&self, name: &str, candidate: &Document, replacing: Option<usize>) -> Result<()> {
        for field in &self.unique_indexes {
            let Some(value) = candidate.get(field).filter(|v| !v.is_null()) else {
                continue;
            };
            let clash = self
                .documents
                .iter()
                .enumerate()
                .any(|(i, doc)| Some(i) != replacing && doc.get(field) == Some(value));
            if clash {
                return Err(StoreError::DuplicateKey {
                    collection: name.to_string(),
                    field: field.clone(),
                    value: redact(&value_key(value)).to_string(),
                });
            }
        }
        Ok(())
    }
}

fn value_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Collection names double as file stems.
pub(crate) fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidCollectionName {
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("object literal expected"),
        }
    }

    #[test]
    fn upsert_merges_provided_fields() {
        let mut collection = Collection::default();
        let first = collection
            .upsert("c", "mobile", doc(json!({"mobile": "1", "a": 1, "b": 2})))
            .unwrap();
        assert_eq!(first, UpsertOutcome::Inserted);

        let second = collection
            .upsert("c", "mobile", doc(json!({"mobile": "1", "b": 3})))
            .unwrap();
        assert_eq!(second, UpsertOutcome::Updated);
        assert_eq!(
            collection.find("mobile", "1"),
            Some(&doc(json!({"mobile": "1", "a": 1, "b": 3})))
        );
    }

    #[test]
    fn missing_key_is_rejected() {
        let mut collection = Collection::default();
        let err = collection
            .upsert("c", "mobile", doc(json!({"mobile": 13800000000_u64})))
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingKey { .. }));
    }

    #[test]
    fn unique_index_rejects_existing_duplicates() {
        let mut collection = Collection::default();
        collection
            .upsert("c", "mobile", doc(json!({"mobile": "1", "name": "a"})))
            .unwrap();
        collection
            .upsert("c", "mobile", doc(json!({"mobile": "2", "name": "a"})))
            .unwrap();
        assert!(matches!(
            collection.ensure_unique_index("c", "name"),
            Err(StoreError::DuplicateKey { .. })
        ));
        assert!(collection.ensure_unique_index("c", "mobile").unwrap());
        assert!(!collection.ensure_unique_index("c", "mobile").unwrap());
    }

    #[test]
    fn collection_names() {
        assert!(validate_name("patient_presurvey").is_ok());
        assert!(validate_name("../etc").is_err());
        assert!(validate_name("").is_err());
    }
}
