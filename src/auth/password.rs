// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 FarmLink

//! Password hashing and verification using Argon2id.
//!
//! The PHC-formatted hash string embeds the salt and work-factor
//! parameters, so the parameters can be raised later without invalidating
//! stored digests. Plaintext passwords are never stored or logged.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Error produced when a digest cannot be computed or parsed.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hash(String),

    #[error("stored password hash is malformed: {0}")]
    MalformedDigest(String),
}

/// Hash a password using Argon2id with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Verify a password against a stored PHC-formatted digest.
pub fn verify_password(password: &str, digest: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(digest)
        .map_err(|e| PasswordError::MalformedDigest(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let password = "p12345";
        let digest = hash_password(password).unwrap();

        assert!(digest.starts_with("$argon2"));
        assert!(verify_password(password, &digest).unwrap());
        assert!(!verify_password("wrongpw", &digest).unwrap());
    }

    #[test]
    fn same_password_different_salts() {
        let digest1 = hash_password("same-password").unwrap();
        let digest2 = hash_password("same-password").unwrap();

        assert_ne!(digest1, digest2);
        assert!(verify_password("same-password", &digest1).unwrap());
        assert!(verify_password("same-password", &digest2).unwrap());
    }

    #[test]
    fn malformed_digest_is_an_error() {
        let result = verify_password("password", "not-a-valid-hash");
        assert!(matches!(result, Err(PasswordError::MalformedDigest(_))));
    }
}
