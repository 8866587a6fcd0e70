// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 FarmLink

//! In-process doubles for the external collaborators, used by orchestrator
//! and handler tests. Each double records the calls it receives and can be
//! switched into a failing mode.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::ledger::{LedgerError, LedgerRail};
use crate::storage::Currency;

use super::events::{EventError, EventPublisher};
use super::gateway::{ChargeGateway, ChargeInitiation, GatewayError};
use super::messaging::{MessagingError, MessagingGateway};

/// Ledger double. Returns `tx_hash` on success, `TransferFailed` when
/// unset.
pub struct MockLedger {
    pub tx_hash: Option<String>,
    pub transfers: Mutex<Vec<(String, f64)>>,
}

impl MockLedger {
    pub fn succeeding(tx_hash: &str) -> Self {
        Self {
            tx_hash: Some(tx_hash.to_string()),
            transfers: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            tx_hash: None,
            transfers: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl LedgerRail for MockLedger {
    async fn transfer(&self, to_address: &str, amount: f64) -> Result<String, LedgerError> {
        self.transfers
            .lock()
            .unwrap()
            .push((to_address.to_string(), amount));
        match &self.tx_hash {
            Some(hash) => Ok(hash.clone()),
            None => Err(LedgerError::TransferFailed("simulated failure".to_string())),
        }
    }
}

/// Gateway double. Returns `reference` on success, `Declined` when unset.
pub struct MockGateway {
    pub reference: Option<String>,
    pub charges: Mutex<Vec<(String, f64, Currency)>>,
}

impl MockGateway {
    pub fn succeeding(reference: &str) -> Self {
        Self {
            reference: Some(reference.to_string()),
            charges: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reference: None,
            charges: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ChargeGateway for MockGateway {
    async fn initiate_charge(
        &self,
        email: &str,
        amount: f64,
        currency: Currency,
    ) -> Result<ChargeInitiation, GatewayError> {
        self.charges
            .lock()
            .unwrap()
            .push((email.to_string(), amount, currency));
        match &self.reference {
            Some(reference) => Ok(ChargeInitiation {
                reference: reference.clone(),
                authorization_url: Some("https://checkout.example/abc".to_string()),
            }),
            None => Err(GatewayError::Declined("simulated decline".to_string())),
        }
    }
}

/// Messenger double recording every dispatched secret.
#[derive(Default)]
pub struct MockMessenger {
    pub emails: Mutex<Vec<(String, String)>>,
    pub sms: Mutex<Vec<(String, String)>>,
    pub fail: bool,
}

impl MockMessenger {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    /// The last OTC code dispatched on either channel, extracted from the
    /// message body.
    pub fn last_code(&self) -> Option<String> {
        let extract = |body: &str| {
            body.split_whitespace()
                .map(|w| w.trim_matches(|c: char| !c.is_ascii_digit()))
                .find(|w| w.len() == 6 && w.chars().all(|c| c.is_ascii_digit()))
                .map(str::to_string)
        };
        self.emails
            .lock()
            .unwrap()
            .last()
            .and_then(|(_, body)| extract(body))
            .or_else(|| {
                self.sms
                    .lock()
                    .unwrap()
                    .last()
                    .and_then(|(_, body)| extract(body))
            })
    }
}

#[async_trait]
impl MessagingGateway for MockMessenger {
    async fn send_email(&self, to: &str, _subject: &str, body: &str) -> Result<(), MessagingError> {
        if self.fail {
            return Err(MessagingError::Dispatch("simulated failure".to_string()));
        }
        self.emails
            .lock()
            .unwrap()
            .push((to.to_string(), body.to_string()));
        Ok(())
    }

    async fn send_sms(&self, to: &str, body: &str) -> Result<(), MessagingError> {
        if self.fail {
            return Err(MessagingError::Dispatch("simulated failure".to_string()));
        }
        self.sms
            .lock()
            .unwrap()
            .push((to.to_string(), body.to_string()));
        Ok(())
    }
}

/// Publisher double recording published events.
#[derive(Default)]
pub struct MockPublisher {
    pub events: Mutex<Vec<(String, Value)>>,
}

#[async_trait]
impl EventPublisher for MockPublisher {
    async fn publish(&self, event: &str, payload: Value) -> Result<(), EventError> {
        self.events
            .lock()
            .unwrap()
            .push((event.to_string(), payload));
        Ok(())
    }
}
