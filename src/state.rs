// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 FarmLink

//! Shared application state handed to every handler.

use std::sync::Arc;

use crate::challenge::ChallengeStore;
use crate::identity::IdentitySynchronizer;
use crate::providers::MessagingGateway;
use crate::settlement::SettlementEngine;
use crate::storage::DataStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DataStore>,
    pub challenges: Arc<ChallengeStore>,
    pub tokens: Arc<crate::auth::TokenSigner>,
    pub identity: Arc<IdentitySynchronizer>,
    pub settlement: Arc<SettlementEngine>,
    pub messenger: Arc<dyn MessagingGateway>,
}
