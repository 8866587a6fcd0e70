// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 FarmLink

//! Repositories over the JSON document store.

pub mod mirror;
pub mod orders;
pub mod transactions;
pub mod users;

pub use mirror::{MirrorDocument, MirrorKind, MirrorRepository};
pub use orders::{OrderRepository, StoredOrder};
pub use transactions::{
    Currency, Rail, SettlementOutcome, StoredTransaction, TransactionRepository,
};
pub use users::{LookupKey, StoredUser, UserRepository};
