// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 FarmLink

//! Paystack integration for the gateway-charge settlement rail.
//!
//! A charge is initiated against the buyer's email and comes back with a
//! gateway reference; the actual capture is confirmed by an out-of-band
//! webhook, so the transaction stays `pending_confirmation` in-core.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::info;

use crate::config::{PAYSTACK_API_BASE_URL_ENV, PAYSTACK_SECRET_KEY_ENV};
use crate::storage::Currency;

use super::{env_or_default, required_env_present};

const DEFAULT_API_BASE_URL: &str = "https://api.paystack.co";

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Gateway configuration missing: {0}")]
    MissingConfig(String),

    #[error("Gateway rejected the charge: {0}")]
    Declined(String),

    #[error("Gateway request failed: {0}")]
    Request(String),

    #[error("Gateway response was invalid: {0}")]
    InvalidResponse(String),

    #[error("Unsupported charge amount: {0}")]
    InvalidAmount(String),
}

/// Result of initiating a charge.
#[derive(Debug, Clone)]
pub struct ChargeInitiation {
    /// Gateway reference the confirmation webhook will carry
    pub reference: String,
    /// Hosted payment page the buyer completes the charge on
    pub authorization_url: Option<String>,
}

/// The card-charge seam the settlement engine depends on.
#[async_trait]
pub trait ChargeGateway: Send + Sync {
    /// Initiate a charge against the buyer's email. Returns the gateway
    /// reference; the charge itself completes asynchronously.
    async fn initiate_charge(
        &self,
        email: &str,
        amount: f64,
        currency: Currency,
    ) -> Result<ChargeInitiation, GatewayError>;
}

/// Paystack HTTP client.
#[derive(Debug, Clone)]
pub struct PaystackClient {
    api_base_url: String,
    secret_key: String,
    http: Client,
}

impl PaystackClient {
    /// True if the gateway credentials are present in the environment.
    pub fn is_configured() -> bool {
        required_env_present(PAYSTACK_SECRET_KEY_ENV)
    }

    pub fn from_env() -> Result<Self, GatewayError> {
        let api_base_url = env_or_default(PAYSTACK_API_BASE_URL_ENV, DEFAULT_API_BASE_URL);
        let secret_key = std::env::var(PAYSTACK_SECRET_KEY_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| GatewayError::MissingConfig(PAYSTACK_SECRET_KEY_ENV.to_string()))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| GatewayError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_base_url,
            secret_key,
            http,
        })
    }
}

#[async_trait]
impl ChargeGateway for PaystackClient {
    async fn initiate_charge(
        &self,
        email: &str,
        amount: f64,
        currency: Currency,
    ) -> Result<ChargeInitiation, GatewayError> {
        let payload = json!({
            "email": email,
            "amount": to_minor_units(amount)?,
            "currency": currency.code(),
        });

        let response = self
            .http
            .post(format!("{}/transaction/initialize", self.api_base_url))
            .bearer_auth(&self.secret_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        if !status.is_success() || body.get("status").and_then(Value::as_bool) != Some(true) {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("charge initialization rejected");
            return Err(GatewayError::Declined(message.to_string()));
        }

        let reference = body
            .pointer("/data/reference")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                GatewayError::InvalidResponse("missing reference in response".to_string())
            })?
            .to_string();

        let authorization_url = body
            .pointer("/data/authorization_url")
            .and_then(Value::as_str)
            .map(str::to_string);

        info!(
            reference = %reference,
            currency = currency.code(),
            "Gateway charge initiated"
        );

        Ok(ChargeInitiation {
            reference,
            authorization_url,
        })
    }
}

/// Convert a major-unit amount to the gateway's minor units (cents).
fn to_minor_units(amount: f64) -> Result<u64, GatewayError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(GatewayError::InvalidAmount(format!(
            "amount must be positive, got {amount}"
        )));
    }
    let minor = (amount * 100.0).round();
    if minor > u64::MAX as f64 {
        return Err(GatewayError::InvalidAmount(format!("amount overflow: {amount}")));
    }
    Ok(minor as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minor_units_round_to_cents() {
        assert_eq!(to_minor_units(100.0).unwrap(), 10_000);
        assert_eq!(to_minor_units(0.01).unwrap(), 1);
        assert_eq!(to_minor_units(12.345).unwrap(), 1_235);
    }

    #[test]
    fn minor_units_reject_nonpositive() {
        assert!(matches!(
            to_minor_units(0.0),
            Err(GatewayError::InvalidAmount(_))
        ));
        assert!(matches!(
            to_minor_units(-5.0),
            Err(GatewayError::InvalidAmount(_))
        ));
        assert!(matches!(
            to_minor_units(f64::INFINITY),
            Err(GatewayError::InvalidAmount(_))
        ));
    }
}
