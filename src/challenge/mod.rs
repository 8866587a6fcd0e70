// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 FarmLink

//! # Challenge Store
//!
//! Short-lived, single-use secrets keyed by contact or wallet address:
//! the 6-digit one-time codes sent over email/SMS and the opaque nonces
//! a wallet signs. Challenges live as documents under the data directory
//! so they survive a process restart.
//!
//! ## Contract
//!
//! - At most one live challenge per subject key; reissuing overwrites the
//!   prior one even if it was unconsumed and unexpired (last code wins).
//! - A challenge is deleted the instant it is successfully consumed.
//! - Expired challenges are treated as absent: rejected and removed at
//!   verify time, and garbage-collected by the background [`sweeper`].
//! - Consumption is atomic: two requests racing with the correct secret
//!   resolve to exactly one winner; the loser sees `ExpiredOrInvalid`.

pub mod sweeper;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::CHALLENGE_TTL_SECS;
use crate::storage::{DataStore, StorageError};

/// Length of the opaque nonce a wallet is asked to sign.
const NONCE_LEN: usize = 32;

/// Error type for challenge verification.
///
/// Wrong secret, expired challenge and no challenge at all are deliberately
/// collapsed into one variant so callers cannot leak which it was.
#[derive(Debug, thiserror::Error)]
pub enum ChallengeError {
    #[error("Challenge invalid or expired")]
    ExpiredOrInvalid,
    #[error("Challenge storage error: {0}")]
    Storage(#[from] StorageError),
}

/// One live challenge document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredChallenge {
    /// Contact string or wallet address this secret is bound to
    subject_key: String,
    /// The 6-digit code or nonce token
    secret: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    /// Pending-registration fields captured at issuance so verification
    /// can complete registration without re-asking
    payload: Value,
}

impl StoredChallenge {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Store for single-use authentication secrets.
pub struct ChallengeStore {
    store: Arc<DataStore>,
    ttl: Duration,
    /// Serializes verify-and-delete so concurrent attempts for the same
    /// secret resolve to exactly one winner
    consume_lock: Mutex<()>,
}

impl ChallengeStore {
    /// Create a store with the standard 300-second TTL.
    pub fn new(store: Arc<DataStore>) -> Self {
        Self::with_ttl(store, Duration::from_secs(CHALLENGE_TTL_SECS))
    }

    /// Create a store with a custom TTL (useful for testing expiry).
    pub fn with_ttl(store: Arc<DataStore>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            consume_lock: Mutex::new(()),
        }
    }

    /// Issue a 6-digit one-time code for a contact.
    ///
    /// Overwrites any prior challenge for the same subject key.
    pub async fn issue_code(&self, subject_key: &str, payload: Value) -> Result<String, ChallengeError> {
        let code = format!("{:06}", OsRng.gen_range(0..1_000_000u32));
        self.put(subject_key, code.clone(), payload).await?;
        Ok(code)
    }

    /// Issue an opaque nonce for a wallet address to sign.
    ///
    /// Overwrites any prior challenge for the same subject key.
    pub async fn issue_nonce(&self, subject_key: &str, payload: Value) -> Result<String, ChallengeError> {
        let nonce: String = OsRng
            .sample_iter(&Alphanumeric)
            .take(NONCE_LEN)
            .map(char::from)
            .collect();
        self.put(subject_key, nonce.clone(), payload).await?;
        Ok(nonce)
    }

    async fn put(&self, subject_key: &str, secret: String, payload: Value) -> Result<(), ChallengeError> {
        let now = Utc::now();
        let challenge = StoredChallenge {
            subject_key: subject_key.to_string(),
            secret,
            issued_at: now,
            expires_at: now
                + chrono::Duration::from_std(self.ttl)
                    .unwrap_or_else(|_| chrono::Duration::seconds(CHALLENGE_TTL_SECS as i64)),
            payload,
        };

        let _guard = self.consume_lock.lock().await;
        self.store
            .write_json(self.store.paths().challenge(subject_key), &challenge)?;
        Ok(())
    }

    /// Verify a supplied secret and consume the challenge on success.
    ///
    /// Returns the payload captured at issuance. A wrong secret leaves the
    /// challenge in place; a successful match deletes it, so a replay of
    /// the same secret fails.
    pub async fn verify(&self, subject_key: &str, supplied: &str) -> Result<Value, ChallengeError> {
        self.verify_with(subject_key, |secret| secret == supplied)
            .await
    }

    /// Verify with a caller-supplied check over the stored secret.
    ///
    /// The wallet flow uses this to run signature recovery against the
    /// issued nonce inside the consume critical section.
    pub async fn verify_with<F>(&self, subject_key: &str, check: F) -> Result<Value, ChallengeError>
    where
        F: FnOnce(&str) -> bool,
    {
        let _guard = self.consume_lock.lock().await;

        let path = self.store.paths().challenge(subject_key);
        let challenge: StoredChallenge = match self.store.read_json(&path) {
            Ok(c) => c,
            Err(StorageError::NotFound(_)) => return Err(ChallengeError::ExpiredOrInvalid),
            Err(e) => return Err(ChallengeError::Storage(e)),
        };

        if challenge.is_expired(Utc::now()) {
            match self.store.delete(&path) {
                Ok(()) | Err(StorageError::NotFound(_)) => {}
                Err(e) => return Err(ChallengeError::Storage(e)),
            }
            debug!(subject = %subject_key, "Expired challenge removed at verify");
            return Err(ChallengeError::ExpiredOrInvalid);
        }

        if !check(&challenge.secret) {
            return Err(ChallengeError::ExpiredOrInvalid);
        }

        // Another process sharing the data directory may consume the
        // document between our read and this delete. That loser's secret
        // was already spent, so report it as invalid, not as a store fault.
        match self.store.delete(&path) {
            Ok(()) => Ok(challenge.payload),
            Err(StorageError::NotFound(_)) => Err(ChallengeError::ExpiredOrInvalid),
            Err(e) => Err(ChallengeError::Storage(e)),
        }
    }

    /// Delete every expired challenge document. Returns the number removed.
    pub async fn sweep_expired(&self) -> Result<usize, ChallengeError> {
        let _guard = self.consume_lock.lock().await;

        let dir = self.store.paths().challenges_dir();
        let now = Utc::now();
        let mut removed = 0;

        for stem in self.store.list_files(&dir, "json")? {
            let path = dir.join(format!("{stem}.json"));
            match self.store.read_json::<StoredChallenge>(&path) {
                Ok(challenge) if challenge.is_expired(now) => {
                    self.store.delete(&path)?;
                    removed += 1;
                }
                Ok(_) => {}
                // Raced with a concurrent consume; nothing to do
                Err(StorageError::NotFound(_)) => {}
                Err(e) => return Err(ChallengeError::Storage(e)),
            }
        }

        Ok(removed)
    }
}
