// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 FarmLink

//! Marketplace roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Marketplace roles.
///
/// This is the canonical role set; registration and challenge issuance
/// reject anything else. Only `Buyer` may initiate settlement, and only
/// for orders where they are the buyer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Produces and lists goods; requires location and certification data
    Farmer,
    /// Purchases goods; the only role allowed to settle orders
    Buyer,
    /// Resells goods
    Seller,
    /// Handles shipment and delivery
    Logistics,
    /// Full administrative access
    Admin,
}

impl Role {
    /// Parse role from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Role> {
        match s.to_lowercase().as_str() {
            "farmer" => Some(Role::Farmer),
            "buyer" => Some(Role::Buyer),
            "seller" => Some(Role::Seller),
            "logistics" => Some(Role::Logistics),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Farmer => write!(f, "farmer"),
            Role::Buyer => write!(f, "buyer"),
            Role::Seller => write!(f, "seller"),
            Role::Logistics => write!(f, "logistics"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_canonical_set() {
        assert_eq!(Role::parse("farmer"), Some(Role::Farmer));
        assert_eq!(Role::parse("BUYER"), Some(Role::Buyer));
        assert_eq!(Role::parse("Seller"), Some(Role::Seller));
        assert_eq!(Role::parse("logistics"), Some(Role::Logistics));
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
    }

    #[test]
    fn parse_rejects_unknown_roles() {
        assert_eq!(Role::parse("agent"), None);
        assert_eq!(Role::parse("supplier"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn display_round_trips() {
        for role in [
            Role::Farmer,
            Role::Buyer,
            Role::Seller,
            Role::Logistics,
            Role::Admin,
        ] {
            assert_eq!(Role::parse(&role.to_string()), Some(role));
        }
    }
}
