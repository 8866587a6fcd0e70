// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 FarmLink

//! Authentication handlers: the four protocols converging on the session
//! issuer.
//!
//! Credential failures share one message per protocol. A caller probing
//! `/auth/login` or `/auth/otc/verify` learns nothing about whether the
//! account exists, the code was wrong, or the challenge expired.

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::{
    auth::{hash_password, verify_password, verify_wallet_proof, ClaimType, Role},
    challenge::ChallengeError,
    config::CHALLENGE_TTL_SECS,
    error::ApiError,
    identity::IdentityFields,
    models::{
        AuthResponse, LoginRequest, MessageResponse, NonceResponse, OtcChannel, RegisterRequest,
        SendOtcRequest, VerifyOtcRequest, VerifyWalletRequest,
    },
    state::AppState,
    storage::{LookupKey, StorageError, UserRepository},
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const INVALID_OR_EXPIRED_CODE: &str = "Invalid or expired code";
const INVALID_WALLET_PROOF: &str = "Invalid signature or expired nonce";

#[utoipa::path(
    post,
    path = "/v1/auth/register",
    request_body = RegisterRequest,
    tag = "Auth",
    responses(
        (status = 200, body = AuthResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email or phone already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let role = parse_role(&request.role)?;
    ensure_role_fields(role, request.location.as_deref(), request.certifications.as_ref())?;

    let email = request.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::bad_request("A valid email is required"));
    }
    if request.password.len() < 6 {
        return Err(ApiError::bad_request(
            "Password must be at least 6 characters",
        ));
    }

    let users = UserRepository::new(&state.store);
    if users
        .contact_taken(Some(&email), request.phone.as_deref())
        .map_err(|e| ApiError::internal(format!("Identity lookup failed: {e}")))?
    {
        return Err(ApiError::conflict(
            "An account with this email or phone already exists",
        ));
    }

    let password_hash =
        hash_password(&request.password).map_err(|e| ApiError::internal(e.to_string()))?;

    let fields = IdentityFields {
        name: Some(request.name),
        role: Some(role),
        phone: request.phone,
        location: request.location,
        certifications: request.certifications,
        password_hash: Some(password_hash),
        ..Default::default()
    };

    let user = state
        .identity
        .upsert(&LookupKey::Email(email.clone()), fields)
        .map_err(|e| match e {
            StorageError::AlreadyExists(_) => {
                ApiError::conflict("An account with this email or phone already exists")
            }
            other => ApiError::internal(format!("Failed to create identity: {other}")),
        })?;

    let token = state.tokens.issue(&email, ClaimType::Email, user.role)?;
    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    tag = "Auth",
    responses(
        (status = 200, body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = request.email.trim().to_lowercase();

    let user = UserRepository::new(&state.store)
        .find_by_lookup(&LookupKey::Email(email.clone()))
        .map_err(|e| match e {
            StorageError::NotFound(_) => ApiError::unauthorized(INVALID_CREDENTIALS),
            other => ApiError::internal(format!("Identity lookup failed: {other}")),
        })?;

    let digest = user
        .password_hash
        .as_deref()
        .ok_or_else(|| ApiError::unauthorized(INVALID_CREDENTIALS))?;
    let matches = verify_password(&request.password, digest)
        .map_err(|e| ApiError::internal(e.to_string()))?;
    if !matches {
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    state.identity.sync_mirror(&user);

    let token = state.tokens.issue(&email, ClaimType::Email, user.role)?;
    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

#[utoipa::path(
    post,
    path = "/v1/auth/otc/send",
    request_body = SendOtcRequest,
    tag = "Auth",
    responses(
        (status = 200, body = MessageResponse),
        (status = 400, description = "Invalid input"),
        (status = 502, description = "Code dispatch failed")
    )
)]
pub async fn send_otc(
    State(state): State<AppState>,
    Json(request): Json<SendOtcRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    // Email contacts are lowercased so the challenge subject and the
    // identity lookup key agree with the registration path.
    let contact = match request.channel {
        OtcChannel::Email => request.contact.trim().to_lowercase(),
        OtcChannel::Sms => request.contact.trim().to_string(),
    };
    if contact.is_empty() {
        return Err(ApiError::bad_request("A contact is required"));
    }
    if request.channel == OtcChannel::Email && !contact.contains('@') {
        return Err(ApiError::bad_request(
            "The email channel requires an email address",
        ));
    }

    let role = match &request.role {
        Some(raw) => {
            let role = parse_role(raw)?;
            ensure_role_fields(role, request.location.as_deref(), request.certifications.as_ref())?;
            Some(role)
        }
        None => None,
    };

    let payload = json!({
        "role": role.map(|r| r.to_string()),
        "name": request.name,
        "location": request.location,
        "certifications": request.certifications,
    });

    let code = state
        .challenges
        .issue_code(&contact, payload)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to issue challenge: {e}")))?;

    let body = format!(
        "Your FarmLink verification code is {code}. It expires in 5 minutes."
    );
    let dispatch = match request.channel {
        OtcChannel::Email => {
            state
                .messenger
                .send_email(&contact, "Your FarmLink verification code", &body)
                .await
        }
        OtcChannel::Sms => state.messenger.send_sms(&contact, &body).await,
    };
    if let Err(e) = dispatch {
        warn!(channel = ?request.channel, error = %e, "OTC dispatch failed");
        return Err(ApiError::bad_gateway("Failed to send verification code"));
    }

    Ok(Json(MessageResponse {
        message: "Verification code sent".to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/v1/auth/otc/verify",
    request_body = VerifyOtcRequest,
    tag = "Auth",
    responses(
        (status = 200, body = AuthResponse),
        (status = 401, description = "Invalid or expired code")
    )
)]
pub async fn verify_otc(
    State(state): State<AppState>,
    Json(request): Json<VerifyOtcRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let contact = match request.channel {
        OtcChannel::Email => request.contact.trim().to_lowercase(),
        OtcChannel::Sms => request.contact.trim().to_string(),
    };

    let payload = state
        .challenges
        .verify(&contact, &request.code)
        .await
        .map_err(|e| match e {
            ChallengeError::ExpiredOrInvalid => ApiError::unauthorized(INVALID_OR_EXPIRED_CODE),
            ChallengeError::Storage(cause) => {
                ApiError::internal(format!("Challenge store failed: {cause}"))
            }
        })?;

    let key = match request.channel {
        OtcChannel::Email => LookupKey::Email(contact.clone()),
        OtcChannel::Sms => LookupKey::Phone(contact.clone()),
    };
    let user = state
        .identity
        .upsert(&key, fields_from_payload(&payload))
        .map_err(|e| ApiError::internal(format!("Failed to upsert identity: {e}")))?;

    let token = state.tokens.issue(&contact, key.claim_type(), user.role)?;
    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

#[utoipa::path(
    get,
    path = "/v1/auth/wallet/nonce/{address}",
    params(("address" = String, Path, description = "Wallet address requesting a login nonce")),
    tag = "Auth",
    responses(
        (status = 200, body = NonceResponse),
        (status = 400, description = "Invalid address")
    )
)]
pub async fn wallet_nonce(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<NonceResponse>, ApiError> {
    use std::str::FromStr;
    let address = address.trim().to_lowercase();
    if alloy::primitives::Address::from_str(&address).is_err() {
        return Err(ApiError::bad_request("Invalid wallet address"));
    }

    let nonce = state
        .challenges
        .issue_nonce(&address, Value::Null)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to issue nonce: {e}")))?;

    Ok(Json(NonceResponse {
        address,
        nonce,
        expires_in_secs: CHALLENGE_TTL_SECS,
    }))
}

#[utoipa::path(
    post,
    path = "/v1/auth/wallet/verify",
    request_body = VerifyWalletRequest,
    tag = "Auth",
    responses(
        (status = 200, body = AuthResponse),
        (status = 401, description = "Invalid signature or expired nonce")
    )
)]
pub async fn verify_wallet(
    State(state): State<AppState>,
    Json(request): Json<VerifyWalletRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let address = request.address.trim().to_lowercase();

    // Role validation happens before the proof check so a bad request
    // does not consume the nonce.
    let role = match &request.role {
        Some(raw) => {
            let role = parse_role(raw)?;
            ensure_role_fields(role, request.location.as_deref(), request.certifications.as_ref())?;
            Some(role)
        }
        None => None,
    };

    // The signature check runs inside the consume critical section so the
    // nonce can only be spent by a proof that actually binds it.
    state
        .challenges
        .verify_with(&address, |nonce| {
            match verify_wallet_proof(&address, &request.signature, &request.message, nonce) {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "Wallet proof rejected");
                    false
                }
            }
        })
        .await
        .map_err(|e| match e {
            ChallengeError::ExpiredOrInvalid => ApiError::unauthorized(INVALID_WALLET_PROOF),
            ChallengeError::Storage(cause) => {
                ApiError::internal(format!("Challenge store failed: {cause}"))
            }
        })?;

    let network = crate::ledger::ChainConfig::from_env()
        .map(|chain| chain.name)
        .unwrap_or_else(|_| "avalanche-fuji".to_string());
    let fields = IdentityFields {
        name: request.name,
        role,
        location: request.location,
        certifications: request.certifications,
        network: Some(network),
        ..Default::default()
    };
    let user = state
        .identity
        .upsert(&LookupKey::Wallet(address.clone()), fields)
        .map_err(|e| ApiError::internal(format!("Failed to upsert identity: {e}")))?;

    let token = state.tokens.issue(&address, ClaimType::Wallet, user.role)?;
    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

fn parse_role(raw: &str) -> Result<Role, ApiError> {
    Role::parse(raw).ok_or_else(|| ApiError::bad_request(format!("Unknown role: {raw}")))
}

/// Farmer registrations must carry a location and certification data.
fn ensure_role_fields(
    role: Role,
    location: Option<&str>,
    certifications: Option<&Map<String, Value>>,
) -> Result<(), ApiError> {
    if role == Role::Farmer {
        if location.map(str::trim).filter(|l| !l.is_empty()).is_none() {
            return Err(ApiError::bad_request("Farmer role requires a location"));
        }
        if certifications.filter(|c| !c.is_empty()).is_none() {
            return Err(ApiError::bad_request(
                "Farmer role requires certification data",
            ));
        }
    }
    Ok(())
}

/// Rebuild the pending-registration fields captured at challenge issuance.
fn fields_from_payload(payload: &Value) -> IdentityFields {
    IdentityFields {
        name: payload
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string),
        role: payload
            .get("role")
            .and_then(Value::as_str)
            .and_then(Role::parse),
        location: payload
            .get("location")
            .and_then(Value::as_str)
            .map(str::to_string),
        certifications: payload
            .get("certifications")
            .and_then(Value::as_object)
            .cloned(),
        ..Default::default()
    }
}
