// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 FarmLink

//! Path constants and utilities for the data-directory layout.

use std::path::{Path, PathBuf};

/// Base directory for all persistent storage.
pub const DATA_ROOT: &str = "/data";

/// Storage path utilities for the data directory.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DATA_ROOT)
    }
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all persistent data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // ========== Authoritative Identity Rows ==========

    /// Directory containing all authoritative identity rows.
    pub fn users_dir(&self) -> PathBuf {
        self.root.join("users")
    }

    /// Path to a specific identity row.
    pub fn user(&self, user_id: &str) -> PathBuf {
        self.users_dir().join(format!("{user_id}.json"))
    }

    // ========== Mirror Documents ==========

    /// Directory containing all mirror documents.
    pub fn mirror_dir(&self) -> PathBuf {
        self.root.join("mirror")
    }

    /// Path to a mirror document, keyed by the authoritative id.
    pub fn mirror_doc(&self, authoritative_id: &str) -> PathBuf {
        self.mirror_dir().join(format!("{authoritative_id}.json"))
    }

    // ========== Orders ==========

    /// Directory containing all orders.
    pub fn orders_dir(&self) -> PathBuf {
        self.root.join("orders")
    }

    /// Path to a specific order.
    pub fn order(&self, order_id: &str) -> PathBuf {
        self.orders_dir().join(format!("{order_id}.json"))
    }

    // ========== Transactions ==========

    /// Directory containing all settlement transactions.
    pub fn transactions_dir(&self) -> PathBuf {
        self.root.join("transactions")
    }

    /// Path to a specific transaction.
    pub fn transaction(&self, transaction_id: &str) -> PathBuf {
        self.transactions_dir().join(format!("{transaction_id}.json"))
    }

    // ========== Challenges ==========

    /// Directory containing live challenges (OTC codes, wallet nonces).
    pub fn challenges_dir(&self) -> PathBuf {
        self.root.join("challenges")
    }

    /// Path to the challenge document for a subject key.
    ///
    /// Subject keys are emails, phone numbers or wallet addresses, so the
    /// file name is a UUIDv5 of the key rather than the raw string.
    pub fn challenge(&self, subject_key: &str) -> PathBuf {
        let name = uuid::Uuid::new_v5(&uuid::Uuid::NAMESPACE_OID, subject_key.as_bytes());
        self.challenges_dir().join(format!("{name}.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths_use_data_root() {
        let paths = StoragePaths::default();
        assert_eq!(paths.root(), Path::new("/data"));
    }

    #[test]
    fn custom_root_for_testing() {
        let paths = StoragePaths::new("/tmp/test-data");
        assert_eq!(paths.root(), Path::new("/tmp/test-data"));
        assert_eq!(
            paths.user("user-123"),
            PathBuf::from("/tmp/test-data/users/user-123.json")
        );
    }

    #[test]
    fn entity_paths_are_correct() {
        let paths = StoragePaths::default();
        assert_eq!(paths.users_dir(), PathBuf::from("/data/users"));
        assert_eq!(paths.mirror_dir(), PathBuf::from("/data/mirror"));
        assert_eq!(
            paths.mirror_doc("u-1"),
            PathBuf::from("/data/mirror/u-1.json")
        );
        assert_eq!(paths.order("ord-1"), PathBuf::from("/data/orders/ord-1.json"));
        assert_eq!(
            paths.transaction("tx-1"),
            PathBuf::from("/data/transactions/tx-1.json")
        );
    }

    #[test]
    fn challenge_path_is_stable_per_subject() {
        let paths = StoragePaths::default();
        let a = paths.challenge("a@x.com");
        let b = paths.challenge("a@x.com");
        let c = paths.challenge("+254700000000");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("/data/challenges"));
    }
}
