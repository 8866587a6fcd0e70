// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 FarmLink

//! # Persistent Storage Module
//!
//! JSON-document persistence rooted at the data directory (`DATA_DIR`).
//!
//! ## Storage Layout
//!
//! ```text
//! /data/
//!   users/{user_id}.json            # Authoritative identity rows
//!   mirror/{authoritative_id}.json  # Derived mirror documents
//!   orders/{order_id}.json
//!   transactions/{transaction_id}.json
//!   challenges/{subject_hash}.json  # Live OTC codes / wallet nonces
//! ```
//!
//! The authoritative rows are the system of record; the mirror is derived
//! and rebuildable. The Identity Synchronizer is the only writer allowed
//! to touch both.

pub mod fs;
pub mod paths;
pub mod repository;

pub use fs::{DataStore, StorageError, StorageResult};
pub use paths::StoragePaths;
pub use repository::{
    Currency, LookupKey, MirrorDocument, MirrorKind, MirrorRepository, OrderRepository, Rail,
    SettlementOutcome, StoredOrder, StoredTransaction, StoredUser, TransactionRepository,
    UserRepository,
};
