// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 FarmLink

//! Session token claims and the authenticated identity they decode to.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::roles::Role;

/// Which identity proof a session was issued from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ClaimType {
    /// Password login or email OTC
    Email,
    /// SMS OTC
    Phone,
    /// Wallet signature
    Wallet,
}

impl std::fmt::Display for ClaimType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClaimType::Email => write!(f, "email"),
            ClaimType::Phone => write!(f, "phone"),
            ClaimType::Wallet => write!(f, "wallet"),
        }
    }
}

/// Claims carried inside a session JWT.
///
/// The token is opaque to its holder; these fields are the sole
/// authorization input for role checks on authenticated routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the contact (email/phone) or wallet address the session
    /// was verified against
    pub sub: String,
    /// Which proof produced this session
    pub claim: ClaimType,
    /// Role at verification time
    pub role: Role,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// Authenticated identity extracted from a validated session token.
///
/// This is the type handlers receive from the `Auth` extractor.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionIdentity {
    /// Contact or wallet address the session belongs to
    pub subject: String,
    /// Which proof produced this session
    pub claim: ClaimType,
    /// Role at verification time
    pub role: Role,
}

impl From<SessionClaims> for SessionIdentity {
    fn from(claims: SessionClaims) -> Self {
        Self {
            subject: claims.sub,
            claim: claims.claim,
            role: claims.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_convert_to_identity() {
        let claims = SessionClaims {
            sub: "a@x.com".to_string(),
            claim: ClaimType::Email,
            role: Role::Farmer,
            iat: 1_700_000_000,
            exp: 1_700_086_400,
        };

        let identity = SessionIdentity::from(claims);
        assert_eq!(identity.subject, "a@x.com");
        assert_eq!(identity.claim, ClaimType::Email);
        assert_eq!(identity.role, Role::Farmer);
    }

    #[test]
    fn claim_type_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ClaimType::Wallet).unwrap(),
            r#""wallet""#
        );
    }
}
