// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 FarmLink

//! Authoritative identity rows.
//!
//! This repository is the system of record for identities. Each row is one
//! JSON file under `users/`. Email, phone and wallet address are unique
//! across rows; `find_by_lookup` returns a distinguishable `NotFound` so
//! callers can branch on "absent" versus a real storage failure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::auth::{ClaimType, Role};

use super::super::{DataStore, StorageError, StorageResult};

/// The primary lookup key an identity was registered under.
///
/// Exactly one of email, phone or wallet address identifies a principal
/// for a given registration path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupKey {
    Email(String),
    Phone(String),
    Wallet(String),
}

impl LookupKey {
    /// The raw key string (contact or address).
    pub fn as_str(&self) -> &str {
        match self {
            LookupKey::Email(s) | LookupKey::Phone(s) | LookupKey::Wallet(s) => s,
        }
    }

    /// The claim type a session verified against this key carries.
    pub fn claim_type(&self) -> ClaimType {
        match self {
            LookupKey::Email(_) => ClaimType::Email,
            LookupKey::Phone(_) => ClaimType::Phone,
            LookupKey::Wallet(_) => ClaimType::Wallet,
        }
    }
}

/// Authoritative identity row.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct StoredUser {
    /// Authoritative id (UUID)
    pub id: String,
    /// Email, if registered via email or password
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Phone number, if registered via SMS
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Wallet address, if registered via wallet signature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    /// Ledger network tag for the wallet address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    /// Display name
    pub name: String,
    /// Marketplace role
    pub role: Role,
    /// Farmer-specific: location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Farmer-specific: certification data
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub certifications: Map<String, Value>,
    /// Credibility score, starts at 0.0
    #[serde(default)]
    pub credibility_score: f64,
    /// Argon2id digest; absent for wallet-only and OTC-only identities.
    /// Never exposed through the API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    /// Free-form application metadata
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
    /// When the identity was created
    pub created_at: DateTime<Utc>,
}

impl StoredUser {
    /// True if this row is registered under the given lookup key.
    fn matches(&self, key: &LookupKey) -> bool {
        match key {
            LookupKey::Email(email) => self.email.as_deref() == Some(email),
            LookupKey::Phone(phone) => self.phone.as_deref() == Some(phone),
            LookupKey::Wallet(address) => self.wallet_address.as_deref() == Some(address),
        }
    }
}

/// Repository for authoritative identity rows.
pub struct UserRepository<'a> {
    store: &'a DataStore,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository.
    pub fn new(store: &'a DataStore) -> Self {
        Self { store }
    }

    /// Check if an identity row exists.
    pub fn exists(&self, user_id: &str) -> bool {
        self.store.exists(self.store.paths().user(user_id))
    }

    /// Get an identity row by authoritative id.
    pub fn get(&self, user_id: &str) -> StorageResult<StoredUser> {
        let path = self.store.paths().user(user_id);
        if !self.store.exists(&path) {
            return Err(StorageError::NotFound(format!("User {user_id}")));
        }
        self.store.read_json(path)
    }

    /// Find an identity row by its primary lookup key.
    pub fn find_by_lookup(&self, key: &LookupKey) -> StorageResult<StoredUser> {
        let ids = self
            .store
            .list_files(self.store.paths().users_dir(), "json")?;

        for id in ids {
            if let Ok(user) = self.get(&id) {
                if user.matches(key) {
                    return Ok(user);
                }
            }
        }

        Err(StorageError::NotFound(format!(
            "User with lookup key {}",
            key.as_str()
        )))
    }

    /// True if any row already claims the given email or phone.
    pub fn contact_taken(&self, email: Option<&str>, phone: Option<&str>) -> StorageResult<bool> {
        if let Some(email) = email {
            if self.find_by_lookup(&LookupKey::Email(email.to_string())).is_ok() {
                return Ok(true);
            }
        }
        if let Some(phone) = phone {
            if self.find_by_lookup(&LookupKey::Phone(phone.to_string())).is_ok() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Create a new identity row (insert-if-absent).
    ///
    /// Rejects duplicates of id or of any unique key the row carries. The
    /// uniqueness scan and the write run under the store's write guard so
    /// two concurrent creates with the same key admit exactly one row.
    pub fn create(&self, user: &StoredUser) -> StorageResult<()> {
        let _guard = self.store.write_guard();

        if self.exists(&user.id) {
            return Err(StorageError::AlreadyExists(format!("User {}", user.id)));
        }

        let unique_keys = [
            user.email.clone().map(LookupKey::Email),
            user.phone.clone().map(LookupKey::Phone),
            user.wallet_address.clone().map(LookupKey::Wallet),
        ];
        for key in unique_keys.into_iter().flatten() {
            if self.find_by_lookup(&key).is_ok() {
                return Err(StorageError::AlreadyExists(format!(
                    "User with key {}",
                    key.as_str()
                )));
            }
        }

        self.store.write_json(self.store.paths().user(&user.id), user)
    }

    /// Update an existing identity row.
    pub fn update(&self, user: &StoredUser) -> StorageResult<()> {
        let _guard = self.store.write_guard();

        if !self.exists(&user.id) {
            return Err(StorageError::NotFound(format!("User {}", user.id)));
        }
        self.store.write_json(self.store.paths().user(&user.id), user)
    }
}
