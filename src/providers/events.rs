// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 FarmLink

//! Realtime event publishing.
//!
//! Settlement emits a `new_transaction` event so connected clients see
//! payments land without polling. Publishing is best effort: a failed
//! publish is logged and never fails the settlement that triggered it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::REALTIME_PUBLISH_URL_ENV;

#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("Event publish failed: {0}")]
    Publish(String),
}

/// The realtime-update seam.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &str, payload: Value) -> Result<(), EventError>;
}

/// HTTP publisher posting events to the realtime relay.
///
/// With no `REALTIME_PUBLISH_URL` configured, publish is a no-op.
#[derive(Debug, Clone)]
pub struct HttpEventPublisher {
    publish_url: Option<String>,
    http: Client,
}

impl HttpEventPublisher {
    pub fn from_env() -> Result<Self, EventError> {
        let publish_url = std::env::var(REALTIME_PUBLISH_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty());

        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| EventError::Publish(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { publish_url, http })
    }
}

#[async_trait]
impl EventPublisher for HttpEventPublisher {
    async fn publish(&self, event: &str, payload: Value) -> Result<(), EventError> {
        let Some(url) = &self.publish_url else {
            debug!(event = %event, "Realtime relay not configured; event skipped");
            return Ok(());
        };

        let body = json!({ "event": event, "payload": payload });
        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| EventError::Publish(e.to_string()))?;

        if !response.status().is_success() {
            return Err(EventError::Publish(format!(
                "relay returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}
