// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 FarmLink

//! # Identity Synchronizer
//!
//! The only writer allowed to touch both identity stores. Every identity
//! mutation goes authoritative-first: the row under `users/` is written,
//! and only then is the mirror document upserted, keyed by the
//! authoritative id so a later contact change still lands on the same
//! document.
//!
//! The two writes are not atomic across stores. If the mirror write fails
//! after a successful authoritative write the operation still reports
//! success and the mirror is stale until the next upsert for the same id
//! self-heals it. If the authoritative write fails, the mirror is never
//! touched.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::Role;
use crate::storage::{
    DataStore, LookupKey, MirrorKind, MirrorRepository, StorageError, StorageResult, StoredUser,
    UserRepository,
};

/// Fields an authentication flow may set on an identity.
///
/// `None` means "leave as-is" on an existing row and "absent" on a new one.
#[derive(Debug, Clone, Default)]
pub struct IdentityFields {
    pub name: Option<String>,
    pub role: Option<Role>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub certifications: Option<Map<String, Value>>,
    pub password_hash: Option<String>,
    pub network: Option<String>,
    pub metadata: Option<Map<String, Value>>,
}

/// Dual-store writer for identities.
pub struct IdentitySynchronizer {
    store: Arc<DataStore>,
}

impl IdentitySynchronizer {
    /// Create a synchronizer over the shared data store.
    pub fn new(store: Arc<DataStore>) -> Self {
        Self { store }
    }

    /// Create or update the identity registered under a lookup key.
    ///
    /// New rows get a fresh authoritative id and default the role to
    /// `buyer` when none is given. Existing rows take only the fields that
    /// are present; a role carried by a re-verification replaces the
    /// stored one.
    pub fn upsert(&self, key: &LookupKey, fields: IdentityFields) -> StorageResult<StoredUser> {
        let users = UserRepository::new(&self.store);

        let user = match users.find_by_lookup(key) {
            Ok(mut existing) => {
                apply_fields(&mut existing, fields);
                users.update(&existing)?;
                existing
            }
            Err(StorageError::NotFound(_)) => {
                let mut user = StoredUser {
                    id: Uuid::new_v4().to_string(),
                    email: None,
                    phone: None,
                    wallet_address: None,
                    network: None,
                    name: key.as_str().to_string(),
                    role: fields.role.unwrap_or(Role::Buyer),
                    location: None,
                    certifications: Map::new(),
                    credibility_score: 0.0,
                    password_hash: None,
                    metadata: Map::new(),
                    created_at: chrono::Utc::now(),
                };
                match key {
                    LookupKey::Email(email) => user.email = Some(email.clone()),
                    LookupKey::Phone(phone) => user.phone = Some(phone.clone()),
                    LookupKey::Wallet(address) => user.wallet_address = Some(address.clone()),
                }
                apply_fields(
                    &mut user,
                    IdentityFields {
                        role: None,
                        ..fields
                    },
                );
                users.create(&user)?;
                info!(user_id = %user.id, role = %user.role, "Identity created");
                user
            }
            Err(e) => return Err(e),
        };

        self.sync_mirror(&user);
        Ok(user)
    }

    /// Refresh the mirror document for an identity row.
    ///
    /// Best effort: a mirror failure is logged and swallowed, since the
    /// authoritative row is already the state of record and the next
    /// upsert for the same id heals the mirror.
    pub fn sync_mirror(&self, user: &StoredUser) {
        let mirror = MirrorRepository::new(&self.store);
        if let Err(e) = mirror.upsert(&user.id, MirrorKind::Identity, mirror_view(user)) {
            warn!(user_id = %user.id, error = %e, "Mirror upsert failed; mirror is stale");
        }
    }
}

/// The denormalized identity body the mirror carries. The password digest
/// never leaves the authoritative store.
fn mirror_view(user: &StoredUser) -> Value {
    let mut view = serde_json::to_value(user).unwrap_or(Value::Null);
    if let Some(map) = view.as_object_mut() {
        map.remove("password_hash");
    }
    view
}

fn apply_fields(user: &mut StoredUser, fields: IdentityFields) {
    if let Some(name) = fields.name {
        user.name = name;
    }
    if let Some(role) = fields.role {
        user.role = role;
    }
    if let Some(phone) = fields.phone {
        user.phone = Some(phone);
    }
    if let Some(location) = fields.location {
        user.location = Some(location);
    }
    if let Some(certifications) = fields.certifications {
        user.certifications = certifications;
    }
    if let Some(password_hash) = fields.password_hash {
        user.password_hash = Some(password_hash);
    }
    if let Some(network) = fields.network {
        user.network = Some(network);
    }
    if let Some(metadata) = fields.metadata {
        user.metadata = metadata;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoragePaths;
    use std::env;
    use std::fs;

    fn test_store() -> Arc<DataStore> {
        let dir = env::temp_dir().join(format!("test-identity-{}", uuid::Uuid::new_v4()));
        let mut store = DataStore::new(StoragePaths::new(&dir));
        store.initialize().expect("Failed to initialize");
        Arc::new(store)
    }

    fn cleanup(store: &DataStore) {
        let _ = fs::remove_dir_all(store.paths().root());
    }

    #[test]
    fn upsert_creates_row_and_mirror() {
        let store = test_store();
        let sync = IdentitySynchronizer::new(store.clone());

        let user = sync
            .upsert(
                &LookupKey::Email("a@x.com".to_string()),
                IdentityFields {
                    name: Some("Amina".to_string()),
                    role: Some(Role::Farmer),
                    location: Some("Kiambu".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(user.email.as_deref(), Some("a@x.com"));
        assert_eq!(user.role, Role::Farmer);

        let mirror = MirrorRepository::new(&store);
        let doc = mirror.get(&user.id).unwrap();
        assert_eq!(doc.kind, MirrorKind::Identity);
        assert_eq!(doc.data["name"], "Amina");

        cleanup(&store);
    }

    #[test]
    fn mirror_never_carries_password_hash() {
        let store = test_store();
        let sync = IdentitySynchronizer::new(store.clone());

        let user = sync
            .upsert(
                &LookupKey::Email("a@x.com".to_string()),
                IdentityFields {
                    password_hash: Some("$argon2id$fake".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        let doc = MirrorRepository::new(&store).get(&user.id).unwrap();
        assert!(doc.data.get("password_hash").is_none());

        cleanup(&store);
    }

    #[test]
    fn upsert_existing_keeps_id_and_role() {
        let store = test_store();
        let sync = IdentitySynchronizer::new(store.clone());

        let key = LookupKey::Phone("+254700000000".to_string());
        let created = sync
            .upsert(
                &key,
                IdentityFields {
                    role: Some(Role::Farmer),
                    ..Default::default()
                },
            )
            .unwrap();

        let updated = sync
            .upsert(
                &key,
                IdentityFields {
                    name: Some("Amina".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.role, Role::Farmer);
        assert_eq!(updated.name, "Amina");

        cleanup(&store);
    }

    #[test]
    fn reverification_with_role_replaces_it() {
        let store = test_store();
        let sync = IdentitySynchronizer::new(store.clone());

        let key = LookupKey::Phone("+254700000000".to_string());
        let created = sync
            .upsert(
                &key,
                IdentityFields {
                    role: Some(Role::Buyer),
                    ..Default::default()
                },
            )
            .unwrap();

        let updated = sync
            .upsert(
                &key,
                IdentityFields {
                    role: Some(Role::Seller),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.role, Role::Seller);

        cleanup(&store);
    }

    #[test]
    fn replayed_upsert_heals_deleted_mirror() {
        let store = test_store();
        let sync = IdentitySynchronizer::new(store.clone());

        let key = LookupKey::Email("a@x.com".to_string());
        let user = sync.upsert(&key, IdentityFields::default()).unwrap();

        fs::remove_file(store.paths().mirror_doc(&user.id)).unwrap();
        assert!(MirrorRepository::new(&store).get(&user.id).is_err());

        sync.upsert(&key, IdentityFields::default()).unwrap();
        assert!(MirrorRepository::new(&store).get(&user.id).is_ok());

        cleanup(&store);
    }

    #[test]
    fn new_identity_defaults_to_buyer() {
        let store = test_store();
        let sync = IdentitySynchronizer::new(store.clone());

        let user = sync
            .upsert(
                &LookupKey::Wallet("0xabc".to_string()),
                IdentityFields::default(),
            )
            .unwrap();
        assert_eq!(user.role, Role::Buyer);
        assert_eq!(user.wallet_address.as_deref(), Some("0xabc"));

        cleanup(&store);
    }
}
