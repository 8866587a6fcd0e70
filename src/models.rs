// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 FarmLink

//! API request and response models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::auth::Role;
use crate::storage::{Currency, Rail, StoredUser};

/// Public view of an identity. The password digest never appears here.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    pub name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub certifications: Map<String, Value>,
    pub credibility_score: f64,
    pub created_at: DateTime<Utc>,
}

impl From<StoredUser> for UserProfile {
    fn from(user: StoredUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
            phone: user.phone,
            wallet_address: user.wallet_address,
            network: user.network,
            name: user.name,
            role: user.role,
            location: user.location,
            certifications: user.certifications,
            credibility_score: user.credibility_score,
            created_at: user.created_at,
        }
    }
}

/// Successful authentication: a session token plus the identity it is for.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

/// Password registration request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    /// One of the canonical marketplace roles
    pub role: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub certifications: Option<Map<String, Value>>,
}

/// Password login request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Delivery channel for one-time codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OtcChannel {
    Email,
    Sms,
}

/// Request to send a one-time code.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SendOtcRequest {
    /// Email address or phone number, matching the channel
    pub contact: String,
    pub channel: OtcChannel,
    /// Role for a pending registration completed at verify time
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub certifications: Option<Map<String, Value>>,
}

/// Request to verify a one-time code.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct VerifyOtcRequest {
    pub contact: String,
    pub code: String,
    pub channel: OtcChannel,
}

/// Issued wallet nonce.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NonceResponse {
    pub address: String,
    /// Token the wallet must embed in the message it signs
    pub nonce: String,
    pub expires_in_secs: u64,
}

/// Wallet signature verification request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct VerifyWalletRequest {
    pub address: String,
    /// Hex-encoded signature over `message`
    pub signature: String,
    /// Signed message; must embed the issued nonce verbatim
    pub message: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub certifications: Option<Map<String, Value>>,
}

/// Settlement request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SettleRequest {
    pub order_id: String,
    pub amount: f64,
    pub currency: Currency,
    pub rail: Rail,
}

/// Generic acknowledgment body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub storage: String,
}
