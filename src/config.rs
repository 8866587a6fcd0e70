// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 FarmLink

//! # Runtime Configuration Constants
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Root directory for persistent storage | `/data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `SESSION_JWT_SECRET` | HS256 secret for session tokens | Required; startup fails without it |
//! | `LEDGER_RPC_URL` | JSON-RPC endpoint of the settlement ledger | Required for the ledger rail |
//! | `LEDGER_OPERATOR_KEY` | Hex private key of the custodial operator account | Required for the ledger rail |
//! | `LEDGER_CHAIN_NAME` | Human-readable ledger name for event payloads | `avalanche-fuji` |
//! | `PAYSTACK_SECRET_KEY` | Card gateway API secret | Required for the gateway rail |
//! | `PAYSTACK_API_BASE_URL` | Card gateway base URL | `https://api.paystack.co` |
//! | `SENDGRID_API_KEY` | Email dispatch API key | Required for email OTC |
//! | `EMAIL_FROM` | Sender address for OTC emails | `no-reply@farmlink.africa` |
//! | `TWILIO_ACCOUNT_SID` | SMS dispatch account SID | Required for SMS OTC |
//! | `TWILIO_AUTH_TOKEN` | SMS dispatch auth token | Required for SMS OTC |
//! | `TWILIO_PHONE_NUMBER` | SMS sender number | Required for SMS OTC |
//! | `REALTIME_PUBLISH_URL` | Realtime event publish endpoint | Optional; events are skipped without it |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

/// Environment variable name for the persistent data directory path.
///
/// All authoritative rows, mirror documents, orders, transactions and live
/// challenges are stored under this directory. Multi-replica deployments
/// must point it at shared storage so a challenge issued on one replica can
/// be verified on another.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Environment variable name for the session token signing secret.
///
/// Missing secret is a startup-time fatal error: the process refuses to
/// start rather than mint unverifiable tokens.
pub const SESSION_JWT_SECRET_ENV: &str = "SESSION_JWT_SECRET";

/// Session token validity window in seconds (24 hours).
pub const SESSION_TTL_SECS: i64 = 24 * 60 * 60;

/// Challenge (OTC code / wallet nonce) time-to-live in seconds.
pub const CHALLENGE_TTL_SECS: u64 = 300;

/// Environment variable name for the ledger JSON-RPC endpoint.
pub const LEDGER_RPC_URL_ENV: &str = "LEDGER_RPC_URL";

/// Environment variable name for the custodial operator private key.
pub const LEDGER_OPERATOR_KEY_ENV: &str = "LEDGER_OPERATOR_KEY";

/// Environment variable name for the ledger chain selector.
pub const LEDGER_CHAIN_NAME_ENV: &str = "LEDGER_CHAIN_NAME";

/// Environment variable name for the card gateway API secret.
pub const PAYSTACK_SECRET_KEY_ENV: &str = "PAYSTACK_SECRET_KEY";

/// Environment variable name for the card gateway base URL.
pub const PAYSTACK_API_BASE_URL_ENV: &str = "PAYSTACK_API_BASE_URL";

/// Environment variable name for the email dispatch API key.
pub const SENDGRID_API_KEY_ENV: &str = "SENDGRID_API_KEY";

/// Environment variable name for the OTC email sender address.
pub const EMAIL_FROM_ENV: &str = "EMAIL_FROM";

/// Environment variable names for SMS dispatch credentials.
pub const TWILIO_ACCOUNT_SID_ENV: &str = "TWILIO_ACCOUNT_SID";
pub const TWILIO_AUTH_TOKEN_ENV: &str = "TWILIO_AUTH_TOKEN";
pub const TWILIO_PHONE_NUMBER_ENV: &str = "TWILIO_PHONE_NUMBER";

/// Environment variable name for the realtime event publish endpoint.
pub const REALTIME_PUBLISH_URL_ENV: &str = "REALTIME_PUBLISH_URL";
