// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 FarmLink

//! External collaborators: card gateway, OTC messaging, realtime events.
//!
//! Each collaborator is a trait seam with one HTTP-backed implementation,
//! so the orchestrators can be exercised against in-process doubles.

pub mod events;
pub mod gateway;
pub mod messaging;

#[cfg(test)]
pub mod testing;

pub use events::{EventPublisher, HttpEventPublisher};
pub use gateway::{ChargeGateway, ChargeInitiation, GatewayError, PaystackClient};
pub use messaging::{MessagingError, MessagingGateway, SendgridTwilioMessenger};

/// Read an environment variable with a default fallback.
pub(crate) fn env_or_default(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// True if the variable is present and non-empty.
pub(crate) fn required_env_present(key: &str) -> bool {
    std::env::var(key)
        .map(|v| !v.trim().is_empty())
        .unwrap_or(false)
}
