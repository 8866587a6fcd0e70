// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 FarmLink

//! Authentication: roles, session tokens, password hashing, wallet proofs.
//!
//! ## Components
//!
//! - [`roles`] - Canonical marketplace role set
//! - [`claims`] - Session claims and the identity they decode to
//! - [`token`] - Session issuer (HS256, 24 h)
//! - [`password`] - Argon2id secret hasher
//! - [`wallet`] - Wallet signature verification (nonce-bound)
//! - [`extractor`] - Axum `Auth` extractor for protected routes

pub mod claims;
pub mod error;
pub mod extractor;
pub mod password;
pub mod roles;
pub mod token;
pub mod wallet;

pub use claims::{ClaimType, SessionIdentity};
pub use error::AuthError;
pub use extractor::Auth;
pub use password::{hash_password, verify_password, PasswordError};
pub use roles::Role;
pub use token::TokenSigner;
pub use wallet::{verify_wallet_proof, WalletProofError};
