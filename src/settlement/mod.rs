// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 FarmLink

//! # Payment Settlement Orchestrator
//!
//! Drives one settlement attempt across the two rails:
//!
//! - **ledger_transfer** — synchronous native transfer to the seller's
//!   wallet; terminal `settled` at creation with the ledger transaction id
//!   as reference. A network failure fails the whole call and persists
//!   nothing.
//! - **gateway_charge** — card charge initiated against the buyer's email;
//!   recorded as `pending_confirmation` with the gateway reference. The
//!   confirmation webhook advances it out-of-core.
//!
//! Transactions go through the same dual-store pattern as identities, and
//! every persisted settlement publishes a `new_transaction` event.
//!
//! Authorization: only a buyer session may settle, and only for an order
//! where they are the buyer.

use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::auth::{Role, SessionIdentity};
use crate::ledger::{LedgerError, LedgerRail};
use crate::providers::{ChargeGateway, EventPublisher, GatewayError};
use crate::storage::{
    Currency, DataStore, LookupKey, MirrorKind, MirrorRepository, OrderRepository, Rail,
    SettlementOutcome, StorageError, StoredOrder, StoredTransaction, StoredUser,
    TransactionRepository, UserRepository,
};

#[derive(Debug, thiserror::Error)]
pub enum SettlementError {
    #[error("Order not found")]
    OrderNotFound,

    #[error("Only buyers may settle orders")]
    RoleNotAllowed,

    #[error("Caller is not the buyer on this order")]
    NotOrderBuyer,

    #[error("Currency {0} is not valid on rail {1:?}")]
    CurrencyRailMismatch(&'static str, Rail),

    #[error("Seller record is missing")]
    SellerNotFound,

    #[error("Seller has no ledger wallet on file")]
    SellerWalletMissing,

    #[error("Buyer has no contact email for the gateway charge")]
    BuyerEmailMissing,

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Settlement storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Orchestrator over the two settlement rails.
pub struct SettlementEngine {
    store: Arc<DataStore>,
    ledger: Arc<dyn LedgerRail>,
    gateway: Arc<dyn ChargeGateway>,
    events: Arc<dyn EventPublisher>,
}

impl SettlementEngine {
    pub fn new(
        store: Arc<DataStore>,
        ledger: Arc<dyn LedgerRail>,
        gateway: Arc<dyn ChargeGateway>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            store,
            ledger,
            gateway,
            events,
        }
    }

    /// Settle an order. Returns the persisted transaction.
    pub async fn settle(
        &self,
        caller: &SessionIdentity,
        order_id: &str,
        amount: f64,
        currency: Currency,
        rail: Rail,
    ) -> Result<StoredTransaction, SettlementError> {
        if caller.role != Role::Buyer {
            return Err(SettlementError::RoleNotAllowed);
        }

        let order = match OrderRepository::new(&self.store).get(order_id) {
            Ok(order) => order,
            Err(StorageError::NotFound(_)) => return Err(SettlementError::OrderNotFound),
            Err(e) => return Err(e.into()),
        };
        if order.buyer != caller.subject {
            return Err(SettlementError::NotOrderBuyer);
        }

        let seller = match UserRepository::new(&self.store).get(&order.seller_id) {
            Ok(seller) => seller,
            Err(StorageError::NotFound(_)) => return Err(SettlementError::SellerNotFound),
            Err(e) => return Err(e.into()),
        };

        let mut metadata = Map::new();
        let outcome = match rail {
            Rail::LedgerTransfer => {
                self.run_ledger_transfer(&seller, amount, currency).await?
            }
            Rail::GatewayCharge => {
                self.run_gateway_charge(caller, amount, currency, &mut metadata)
                    .await?
            }
        };

        let now = chrono::Utc::now();
        let mut transaction = StoredTransaction {
            id: Uuid::new_v4().to_string(),
            order_id: order.id.clone(),
            buyer: order.buyer.clone(),
            seller_id: order.seller_id.clone(),
            amount,
            currency,
            rail,
            outcome,
            needs_reconciliation: false,
            metadata,
            created_at: now,
            updated_at: now,
        };

        self.persist(&mut transaction)?;
        self.publish_settled(&transaction, &order).await;

        info!(
            transaction_id = %transaction.id,
            order_id = %order.id,
            rail = ?rail,
            "Settlement recorded"
        );
        Ok(transaction)
    }

    async fn run_ledger_transfer(
        &self,
        seller: &StoredUser,
        amount: f64,
        currency: Currency,
    ) -> Result<SettlementOutcome, SettlementError> {
        if !currency.is_ledger_native() {
            return Err(SettlementError::CurrencyRailMismatch(
                currency.code(),
                Rail::LedgerTransfer,
            ));
        }
        let wallet = seller
            .wallet_address
            .as_deref()
            .ok_or(SettlementError::SellerWalletMissing)?;

        let reference = self.ledger.transfer(wallet, amount).await?;
        Ok(SettlementOutcome::Settled { reference })
    }

    async fn run_gateway_charge(
        &self,
        caller: &SessionIdentity,
        amount: f64,
        currency: Currency,
        metadata: &mut Map<String, Value>,
    ) -> Result<SettlementOutcome, SettlementError> {
        if !currency.is_fiat() {
            return Err(SettlementError::CurrencyRailMismatch(
                currency.code(),
                Rail::GatewayCharge,
            ));
        }
        let email = self.resolve_buyer_email(caller)?;

        let initiation = self.gateway.initiate_charge(&email, amount, currency).await?;
        if let Some(url) = initiation.authorization_url {
            metadata.insert("authorization_url".to_string(), Value::String(url));
        }
        Ok(SettlementOutcome::PendingConfirmation {
            reference: initiation.reference,
        })
    }

    /// The email the gateway charges against: the caller's subject when
    /// they logged in by email, otherwise the email on their identity row.
    fn resolve_buyer_email(&self, caller: &SessionIdentity) -> Result<String, SettlementError> {
        if caller.claim == crate::auth::ClaimType::Email {
            return Ok(caller.subject.clone());
        }

        let key = match caller.claim {
            crate::auth::ClaimType::Phone => LookupKey::Phone(caller.subject.clone()),
            crate::auth::ClaimType::Wallet => LookupKey::Wallet(caller.subject.clone()),
            crate::auth::ClaimType::Email => unreachable!(),
        };
        match UserRepository::new(&self.store).find_by_lookup(&key) {
            Ok(user) => user.email.ok_or(SettlementError::BuyerEmailMissing),
            Err(StorageError::NotFound(_)) => Err(SettlementError::BuyerEmailMissing),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist the transaction through the dual-store pattern.
    ///
    /// By this point value may already have moved on an external rail, so
    /// an authoritative write failure is retried once with the row flagged
    /// for reconciliation instead of being reported as a failed settlement.
    fn persist(&self, transaction: &mut StoredTransaction) -> Result<(), SettlementError> {
        let transactions = TransactionRepository::new(&self.store);

        if let Err(first) = transactions.create(transaction) {
            transaction.needs_reconciliation = true;
            error!(
                transaction_id = %transaction.id,
                reference = ?transaction.outcome.reference(),
                error = %first,
                "Transaction persist failed after rail execution; retrying flagged for reconciliation"
            );
            if let Err(second) = transactions.create(transaction) {
                error!(
                    transaction_id = %transaction.id,
                    reference = ?transaction.outcome.reference(),
                    error = %second,
                    "Transaction persist retry failed; settlement reference only exists in logs"
                );
            }
        }

        let mirror = MirrorRepository::new(&self.store);
        let view = serde_json::to_value(&transaction).unwrap_or(Value::Null);
        if let Err(e) = mirror.upsert(&transaction.id, MirrorKind::Transaction, view) {
            warn!(
                transaction_id = %transaction.id,
                error = %e,
                "Transaction mirror upsert failed; mirror is stale"
            );
        }

        Ok(())
    }

    /// Best-effort settlement event; a relay failure never fails the
    /// settlement that triggered it.
    async fn publish_settled(&self, transaction: &StoredTransaction, order: &StoredOrder) {
        let payload = json!({
            "transaction_id": transaction.id,
            "order_id": order.id,
            "product_id": order.product_id,
            "amount": transaction.amount,
            "currency": transaction.currency.code(),
            "rail": transaction.rail,
            "outcome": transaction.outcome,
        });
        if let Err(e) = self.events.publish("new_transaction", payload).await {
            warn!(
                transaction_id = %transaction.id,
                error = %e,
                "Settlement event publish failed"
            );
        }
    }
}
