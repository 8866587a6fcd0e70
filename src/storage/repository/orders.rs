// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 FarmLink

//! Order rows.
//!
//! Order creation itself is pass-through CRUD owned by the listing side of
//! the system; settlement only needs to resolve an order to its buyer and
//! seller, so this repository stays minimal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::{DataStore, StorageError, StorageResult};

/// One marketplace order.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct StoredOrder {
    /// Order id (UUID)
    pub id: String,
    /// Product being purchased
    pub product_id: String,
    /// Buyer subject (contact or wallet address)
    pub buyer: String,
    /// Seller's authoritative user id
    pub seller_id: String,
    /// When the order was placed
    pub created_at: DateTime<Utc>,
}

/// Repository for order rows.
pub struct OrderRepository<'a> {
    store: &'a DataStore,
}

impl<'a> OrderRepository<'a> {
    /// Create a new OrderRepository.
    pub fn new(store: &'a DataStore) -> Self {
        Self { store }
    }

    /// Check if an order exists.
    pub fn exists(&self, order_id: &str) -> bool {
        self.store.exists(self.store.paths().order(order_id))
    }

    /// Get an order by id.
    pub fn get(&self, order_id: &str) -> StorageResult<StoredOrder> {
        let path = self.store.paths().order(order_id);
        if !self.store.exists(&path) {
            return Err(StorageError::NotFound(format!("Order {order_id}")));
        }
        self.store.read_json(path)
    }

    /// Create a new order.
    pub fn create(&self, order: &StoredOrder) -> StorageResult<()> {
        if self.exists(&order.id) {
            return Err(StorageError::AlreadyExists(format!("Order {}", order.id)));
        }
        self.store
            .write_json(self.store.paths().order(&order.id), order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{DataStore, StoragePaths};
    use std::env;
    use std::fs;

    fn test_store() -> DataStore {
        let dir = env::temp_dir().join(format!("test-order-repo-{}", uuid::Uuid::new_v4()));
        let mut store = DataStore::new(StoragePaths::new(&dir));
        store.initialize().expect("Failed to initialize");
        store
    }

    fn cleanup(store: &DataStore) {
        let _ = fs::remove_dir_all(store.paths().root());
    }

    #[test]
    fn create_and_get_order() {
        let store = test_store();
        let repo = OrderRepository::new(&store);

        let order = StoredOrder {
            id: "ord-1".to_string(),
            product_id: "prod-1".to_string(),
            buyer: "buyer@x.com".to_string(),
            seller_id: "u-seller".to_string(),
            created_at: Utc::now(),
        };
        repo.create(&order).unwrap();

        let loaded = repo.get("ord-1").unwrap();
        assert_eq!(loaded, order);

        cleanup(&store);
    }

    #[test]
    fn missing_order_is_not_found() {
        let store = test_store();
        let repo = OrderRepository::new(&store);

        let result = repo.get("missing");
        assert!(matches!(result, Err(StorageError::NotFound(_))));

        cleanup(&store);
    }
}
