// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 FarmLink

//! Mirror documents: the derived, rebuildable copy of identity and
//! transaction records holding extended application metadata.
//!
//! Documents are keyed by the AUTHORITATIVE id, never by a lookup key, so
//! a later lookup-key change (new email, new phone) still upserts the same
//! document. Upserts are idempotent: replaying one after a partial failure
//! self-heals a stale mirror.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::super::{DataStore, StorageError, StorageResult};

/// What kind of authoritative record a mirror document shadows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MirrorKind {
    Identity,
    Transaction,
}

/// One mirror document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MirrorDocument {
    /// The authoritative row this document mirrors
    pub authoritative_id: String,
    /// Identity or transaction
    pub kind: MirrorKind,
    /// Denormalized record body plus extended metadata
    pub data: Value,
    /// Last time this document was refreshed from the authoritative store
    pub updated_at: DateTime<Utc>,
}

/// Repository for mirror documents.
pub struct MirrorRepository<'a> {
    store: &'a DataStore,
}

impl<'a> MirrorRepository<'a> {
    /// Create a new MirrorRepository.
    pub fn new(store: &'a DataStore) -> Self {
        Self { store }
    }

    /// Upsert a mirror document keyed by authoritative id.
    pub fn upsert(&self, authoritative_id: &str, kind: MirrorKind, data: Value) -> StorageResult<()> {
        let doc = MirrorDocument {
            authoritative_id: authoritative_id.to_string(),
            kind,
            data,
            updated_at: Utc::now(),
        };
        self.store
            .write_json(self.store.paths().mirror_doc(authoritative_id), &doc)
    }

    /// Get a mirror document by authoritative id.
    pub fn get(&self, authoritative_id: &str) -> StorageResult<MirrorDocument> {
        let path = self.store.paths().mirror_doc(authoritative_id);
        if !self.store.exists(&path) {
            return Err(StorageError::NotFound(format!(
                "Mirror document {authoritative_id}"
            )));
        }
        self.store.read_json(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{DataStore, StoragePaths};
    use serde_json::json;
    use std::env;
    use std::fs;

    fn test_store() -> DataStore {
        let dir = env::temp_dir().join(format!("test-mirror-repo-{}", uuid::Uuid::new_v4()));
        let mut store = DataStore::new(StoragePaths::new(&dir));
        store.initialize().expect("Failed to initialize");
        store
    }

    fn cleanup(store: &DataStore) {
        let _ = fs::remove_dir_all(store.paths().root());
    }

    #[test]
    fn upsert_and_get() {
        let store = test_store();
        let repo = MirrorRepository::new(&store);

        repo.upsert("u-1", MirrorKind::Identity, json!({"name": "Amina"}))
            .unwrap();

        let doc = repo.get("u-1").unwrap();
        assert_eq!(doc.kind, MirrorKind::Identity);
        assert_eq!(doc.data["name"], "Amina");

        cleanup(&store);
    }

    #[test]
    fn upsert_is_idempotent_replace() {
        let store = test_store();
        let repo = MirrorRepository::new(&store);

        repo.upsert("u-1", MirrorKind::Identity, json!({"score": 0.0}))
            .unwrap();
        repo.upsert("u-1", MirrorKind::Identity, json!({"score": 2.5}))
            .unwrap();

        let doc = repo.get("u-1").unwrap();
        assert_eq!(doc.data["score"], 2.5);

        cleanup(&store);
    }

    #[test]
    fn missing_document_is_not_found() {
        let store = test_store();
        let repo = MirrorRepository::new(&store);

        let result = repo.get("missing");
        assert!(matches!(result, Err(StorageError::NotFound(_))));

        cleanup(&store);
    }
}
