// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 FarmLink

//! # Challenge Sweeper
//!
//! Background task that periodically deletes expired challenge documents.
//! Expiry is also enforced lazily at verify time; the sweep only keeps the
//! challenges directory from accumulating documents nobody will ever
//! verify again.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken` for graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::ChallengeStore;

/// Default interval between sweeps.
const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Background sweeper for expired challenges.
pub struct ChallengeSweeper {
    challenges: Arc<ChallengeStore>,
    sweep_interval: Duration,
}

impl ChallengeSweeper {
    /// Create a new sweeper over the given challenge store.
    pub fn new(challenges: Arc<ChallengeStore>) -> Self {
        Self {
            challenges,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }

    /// Run the sweep loop until the cancellation token is triggered.
    ///
    /// Should be spawned as a background task:
    /// ```rust,ignore
    /// tokio::spawn(sweeper.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.sweep_interval.as_secs(),
            "Challenge sweeper starting"
        );

        loop {
            if shutdown.is_cancelled() {
                info!("Challenge sweeper shutting down");
                return;
            }

            match self.challenges.sweep_expired().await {
                Ok(0) => {}
                Ok(removed) => debug!(removed, "Challenge sweeper: removed expired challenges"),
                Err(e) => warn!(error = %e, "Challenge sweeper: sweep failed"),
            }

            tokio::select! {
                _ = tokio::time::sleep(self.sweep_interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Challenge sweeper shutting down");
                    return;
                }
            }
        }
    }
}
