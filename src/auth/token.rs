// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 FarmLink

//! Session token issuance and validation.
//!
//! Tokens are HS256 JWTs signed with `SESSION_JWT_SECRET` and valid for
//! 24 hours. They are stateless: there is no server-side revocation list.
//! All four authentication protocols converge here, so a session has the
//! same shape regardless of which proof produced it.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::claims::{ClaimType, SessionClaims, SessionIdentity};
use super::error::AuthError;
use super::roles::Role;
use crate::config::{SESSION_JWT_SECRET_ENV, SESSION_TTL_SECS};

/// Signs and validates session tokens.
///
/// Construction fails only on a missing signing secret, which is a
/// startup-time fatal error, never a per-request one.
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenSigner {
    /// Build a signer from `SESSION_JWT_SECRET`.
    pub fn from_env() -> Result<Self, AuthError> {
        let secret = std::env::var(SESSION_JWT_SECRET_ENV)
            .map_err(|_| AuthError::MissingSigningSecret)?;
        if secret.is_empty() {
            return Err(AuthError::MissingSigningSecret);
        }
        Ok(Self::from_secret(secret.as_bytes()))
    }

    /// Build a signer from raw secret bytes (used directly by tests).
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Mint a session token for a verified identity claim.
    pub fn issue(
        &self,
        subject: &str,
        claim: ClaimType,
        role: Role,
    ) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: subject.to_string(),
            claim,
            role,
            iat: now,
            exp: now + SESSION_TTL_SECS,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InternalError(e.to_string()))
    }

    /// Validate a token and return the identity it carries.
    pub fn validate(&self, token: &str) -> Result<SessionIdentity, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 60;

        let data = decode::<SessionClaims>(token, &self.decoding_key, &validation).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::MalformedToken,
            },
        )?;

        Ok(data.claims.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::from_secret(b"test-session-secret")
    }

    #[test]
    fn issue_and_validate_round_trip() {
        let signer = signer();
        let token = signer.issue("a@x.com", ClaimType::Email, Role::Farmer).unwrap();

        let identity = signer.validate(&token).unwrap();
        assert_eq!(identity.subject, "a@x.com");
        assert_eq!(identity.claim, ClaimType::Email);
        assert_eq!(identity.role, Role::Farmer);
    }

    #[test]
    fn token_shape_is_uniform_across_claim_types() {
        let signer = signer();
        for (subject, claim) in [
            ("a@x.com", ClaimType::Email),
            ("+254700000000", ClaimType::Phone),
            ("0x742d35cc6634c0532925a3b844bc9e7595f4ab12", ClaimType::Wallet),
        ] {
            let token = signer.issue(subject, claim, Role::Buyer).unwrap();
            let identity = signer.validate(&token).unwrap();
            assert_eq!(identity.subject, subject);
            assert_eq!(identity.claim, claim);
            assert_eq!(identity.role, Role::Buyer);
        }
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = signer().issue("a@x.com", ClaimType::Email, Role::Buyer).unwrap();

        let other = TokenSigner::from_secret(b"another-secret");
        let result = other.validate(&token);
        assert!(matches!(result, Err(AuthError::InvalidSignature)));
    }

    #[test]
    fn garbage_token_is_malformed() {
        let result = signer().validate("not-a-jwt");
        assert!(matches!(result, Err(AuthError::MalformedToken)));
    }
}
