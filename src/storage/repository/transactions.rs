// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 FarmLink

//! Settlement transaction rows.
//!
//! A transaction records one settlement attempt. Its outcome is a tagged
//! variant per rail rather than a mutable status string: the ledger rail is
//! terminal at creation (`Settled`), the gateway rail starts in
//! `PendingConfirmation` and is advanced by an out-of-core confirmation
//! callback through [`TransactionRepository::advance`], which enforces that
//! a terminal outcome never regresses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use super::super::{DataStore, StorageError, StorageResult};

/// Settlement currency.
///
/// `Avax` is the ledger-native unit (the only currency the ledger rail
/// accepts); `Kes` and `Usd` are the fiat codes the card gateway supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Avax,
    Kes,
    Usd,
}

impl Currency {
    /// True for the ledger-native unit.
    pub fn is_ledger_native(&self) -> bool {
        matches!(self, Currency::Avax)
    }

    /// True for gateway-supported fiat codes.
    pub fn is_fiat(&self) -> bool {
        matches!(self, Currency::Kes | Currency::Usd)
    }

    /// ISO-style code for gateway requests and event payloads.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Avax => "AVAX",
            Currency::Kes => "KES",
            Currency::Usd => "USD",
        }
    }
}

/// Settlement rail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Rail {
    /// Synchronous value transfer on the distributed ledger
    LedgerTransfer,
    /// Asynchronous charge through the card gateway
    GatewayCharge,
}

/// Outcome of a settlement attempt.
///
/// `Settled` and `Failed` are terminal; `PendingConfirmation` may advance
/// to either but never back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SettlementOutcome {
    /// Value moved; reference is the ledger transaction id or the
    /// gateway's confirmed reference
    Settled { reference: String },
    /// Charge initiated; reference is the gateway reference awaiting the
    /// confirmation callback
    PendingConfirmation { reference: String },
    /// Settlement definitively failed
    Failed { reason: String },
}

impl SettlementOutcome {
    /// True once the outcome can no longer change.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SettlementOutcome::Settled { .. } | SettlementOutcome::Failed { .. }
        )
    }

    /// The external reference, if the attempt produced one.
    pub fn reference(&self) -> Option<&str> {
        match self {
            SettlementOutcome::Settled { reference }
            | SettlementOutcome::PendingConfirmation { reference } => Some(reference),
            SettlementOutcome::Failed { .. } => None,
        }
    }
}

/// One settlement transaction row.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct StoredTransaction {
    /// Transaction id (UUID)
    pub id: String,
    /// The order this settles
    pub order_id: String,
    /// Buyer subject (contact or wallet address)
    pub buyer: String,
    /// Seller's authoritative user id
    pub seller_id: String,
    /// Amount in the given currency
    pub amount: f64,
    /// Settlement currency
    pub currency: Currency,
    /// Rail the settlement ran over
    pub rail: Rail,
    /// Tagged settlement outcome
    pub outcome: SettlementOutcome,
    /// Set when value moved but persistence or mirroring failed partway;
    /// flags the row for out-of-band reconciliation instead of masking the
    /// transfer as a full failure
    #[serde(default)]
    pub needs_reconciliation: bool,
    /// Free-form metadata
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
    /// When the attempt was recorded
    pub created_at: DateTime<Utc>,
    /// When the outcome last changed
    pub updated_at: DateTime<Utc>,
}

/// Repository for settlement transactions.
pub struct TransactionRepository<'a> {
    store: &'a DataStore,
}

impl<'a> TransactionRepository<'a> {
    /// Create a new TransactionRepository.
    pub fn new(store: &'a DataStore) -> Self {
        Self { store }
    }

    /// Check if a transaction exists.
    pub fn exists(&self, transaction_id: &str) -> bool {
        self.store
            .exists(self.store.paths().transaction(transaction_id))
    }

    /// Get a transaction by id.
    pub fn get(&self, transaction_id: &str) -> StorageResult<StoredTransaction> {
        let path = self.store.paths().transaction(transaction_id);
        if !self.store.exists(&path) {
            return Err(StorageError::NotFound(format!(
                "Transaction {transaction_id}"
            )));
        }
        self.store.read_json(path)
    }

    /// Create a new transaction row.
    pub fn create(&self, transaction: &StoredTransaction) -> StorageResult<()> {
        if self.exists(&transaction.id) {
            return Err(StorageError::AlreadyExists(format!(
                "Transaction {}",
                transaction.id
            )));
        }
        self.store
            .write_json(self.store.paths().transaction(&transaction.id), transaction)
    }

    /// Advance a transaction's outcome.
    ///
    /// This is the extension point for the gateway confirmation webhook.
    /// Rejects any change once the current outcome is terminal.
    pub fn advance(
        &self,
        transaction_id: &str,
        outcome: SettlementOutcome,
    ) -> StorageResult<StoredTransaction> {
        let mut transaction = self.get(transaction_id)?;

        if transaction.outcome.is_terminal() {
            return Err(StorageError::AlreadyExists(format!(
                "Transaction {transaction_id} outcome is terminal"
            )));
        }

        transaction.outcome = outcome;
        transaction.updated_at = Utc::now();
        self.store
            .write_json(self.store.paths().transaction(transaction_id), &transaction)?;
        Ok(transaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{DataStore, StoragePaths};
    use std::env;
    use std::fs;

    fn test_store() -> DataStore {
        let dir = env::temp_dir().join(format!("test-tx-repo-{}", uuid::Uuid::new_v4()));
        let mut store = DataStore::new(StoragePaths::new(&dir));
        store.initialize().expect("Failed to initialize");
        store
    }

    fn cleanup(store: &DataStore) {
        let _ = fs::remove_dir_all(store.paths().root());
    }

    fn pending_tx(id: &str) -> StoredTransaction {
        StoredTransaction {
            id: id.to_string(),
            order_id: "ord-1".to_string(),
            buyer: "buyer@x.com".to_string(),
            seller_id: "u-seller".to_string(),
            amount: 100.0,
            currency: Currency::Kes,
            rail: Rail::GatewayCharge,
            outcome: SettlementOutcome::PendingConfirmation {
                reference: "gw-ref-1".to_string(),
            },
            needs_reconciliation: false,
            metadata: Map::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn create_and_get() {
        let store = test_store();
        let repo = TransactionRepository::new(&store);

        repo.create(&pending_tx("tx-1")).unwrap();
        let loaded = repo.get("tx-1").unwrap();
        assert_eq!(loaded.outcome.reference(), Some("gw-ref-1"));

        cleanup(&store);
    }

    #[test]
    fn pending_advances_to_settled() {
        let store = test_store();
        let repo = TransactionRepository::new(&store);

        repo.create(&pending_tx("tx-1")).unwrap();
        let advanced = repo
            .advance(
                "tx-1",
                SettlementOutcome::Settled {
                    reference: "gw-ref-1".to_string(),
                },
            )
            .unwrap();
        assert!(advanced.outcome.is_terminal());

        cleanup(&store);
    }

    #[test]
    fn terminal_outcome_never_regresses() {
        let store = test_store();
        let repo = TransactionRepository::new(&store);

        let mut tx = pending_tx("tx-1");
        tx.rail = Rail::LedgerTransfer;
        tx.currency = Currency::Avax;
        tx.outcome = SettlementOutcome::Settled {
            reference: "0xabc".to_string(),
        };
        repo.create(&tx).unwrap();

        // Settled cannot go back to pending
        let result = repo.advance(
            "tx-1",
            SettlementOutcome::PendingConfirmation {
                reference: "late".to_string(),
            },
        );
        assert!(matches!(result, Err(StorageError::AlreadyExists(_))));

        // Nor flip to failed
        let result = repo.advance(
            "tx-1",
            SettlementOutcome::Failed {
                reason: "nope".to_string(),
            },
        );
        assert!(matches!(result, Err(StorageError::AlreadyExists(_))));

        let unchanged = repo.get("tx-1").unwrap();
        assert_eq!(unchanged.outcome.reference(), Some("0xabc"));

        cleanup(&store);
    }

    #[test]
    fn currency_rail_compatibility_helpers() {
        assert!(Currency::Avax.is_ledger_native());
        assert!(!Currency::Avax.is_fiat());
        assert!(Currency::Kes.is_fiat());
        assert!(Currency::Usd.is_fiat());
        assert_eq!(Currency::Kes.code(), "KES");
    }

    #[test]
    fn outcome_serializes_tagged() {
        let outcome = SettlementOutcome::Settled {
            reference: "0xabc".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["state"], "settled");
        assert_eq!(json["reference"], "0xabc");
    }
}
