// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 FarmLink

//! OTC dispatch over email (SendGrid) and SMS (Twilio).
//!
//! The orchestrator never sees the transport; it hands the code to this
//! seam and reports success to the caller without revealing the secret.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::info;

use crate::config::{
    EMAIL_FROM_ENV, SENDGRID_API_KEY_ENV, TWILIO_ACCOUNT_SID_ENV, TWILIO_AUTH_TOKEN_ENV,
    TWILIO_PHONE_NUMBER_ENV,
};

use super::env_or_default;

const SENDGRID_SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";
const TWILIO_API_BASE_URL: &str = "https://api.twilio.com/2010-04-01";
const DEFAULT_EMAIL_FROM: &str = "no-reply@farmlink.africa";

#[derive(Debug, thiserror::Error)]
pub enum MessagingError {
    #[error("Messaging channel not configured: {0}")]
    MissingConfig(String),

    #[error("Message dispatch failed: {0}")]
    Dispatch(String),
}

/// The OTC delivery seam.
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), MessagingError>;

    async fn send_sms(&self, to: &str, body: &str) -> Result<(), MessagingError>;
}

#[derive(Debug, Clone)]
struct EmailConfig {
    api_key: String,
    from: String,
}

#[derive(Debug, Clone)]
struct SmsConfig {
    account_sid: String,
    auth_token: String,
    from_number: String,
}

/// SendGrid + Twilio messenger. Either channel may be unconfigured, in
/// which case dispatch on that channel fails with `MissingConfig` while
/// the other keeps working.
#[derive(Debug, Clone)]
pub struct SendgridTwilioMessenger {
    email: Option<EmailConfig>,
    sms: Option<SmsConfig>,
    http: Client,
}

impl SendgridTwilioMessenger {
    pub fn from_env() -> Result<Self, MessagingError> {
        let email = std::env::var(SENDGRID_API_KEY_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|api_key| EmailConfig {
                api_key,
                from: env_or_default(EMAIL_FROM_ENV, DEFAULT_EMAIL_FROM),
            });

        let sms = match (
            std::env::var(TWILIO_ACCOUNT_SID_ENV).ok().filter(|v| !v.is_empty()),
            std::env::var(TWILIO_AUTH_TOKEN_ENV).ok().filter(|v| !v.is_empty()),
            std::env::var(TWILIO_PHONE_NUMBER_ENV).ok().filter(|v| !v.is_empty()),
        ) {
            (Some(account_sid), Some(auth_token), Some(from_number)) => Some(SmsConfig {
                account_sid,
                auth_token,
                from_number,
            }),
            _ => None,
        };

        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| MessagingError::Dispatch(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { email, sms, http })
    }
}

#[async_trait]
impl MessagingGateway for SendgridTwilioMessenger {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), MessagingError> {
        let config = self
            .email
            .as_ref()
            .ok_or_else(|| MessagingError::MissingConfig("email".to_string()))?;

        let payload = json!({
            "personalizations": [{ "to": [{ "email": to }] }],
            "from": { "email": config.from },
            "subject": subject,
            "content": [{ "type": "text/plain", "value": body }],
        });

        let response = self
            .http
            .post(SENDGRID_SEND_URL)
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| MessagingError::Dispatch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MessagingError::Dispatch(format!(
                "email provider returned {}",
                response.status()
            )));
        }

        info!(to = %to, "OTC email dispatched");
        Ok(())
    }

    async fn send_sms(&self, to: &str, body: &str) -> Result<(), MessagingError> {
        let config = self
            .sms
            .as_ref()
            .ok_or_else(|| MessagingError::MissingConfig("sms".to_string()))?;

        let url = format!(
            "{TWILIO_API_BASE_URL}/Accounts/{}/Messages.json",
            config.account_sid
        );
        let form = [
            ("To", to),
            ("From", config.from_number.as_str()),
            ("Body", body),
        ];

        let response = self
            .http
            .post(url)
            .basic_auth(&config.account_sid, Some(&config.auth_token))
            .form(&form)
            .send()
            .await
            .map_err(|e| MessagingError::Dispatch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MessagingError::Dispatch(format!(
                "sms provider returned {}",
                response.status()
            )));
        }

        info!(to = %to, "OTC SMS dispatched");
        Ok(())
    }
}
