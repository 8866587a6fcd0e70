// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 FarmLink

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        AuthResponse, HealthResponse, LoginRequest, MessageResponse, NonceResponse,
        RegisterRequest, SendOtcRequest, SettleRequest, UserProfile, VerifyOtcRequest,
        VerifyWalletRequest,
    },
    state::AppState,
    storage::{Currency, Rail, SettlementOutcome, StoredTransaction},
};

pub mod auth;
pub mod health;
pub mod payments;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/health", get(health::health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/otc/send", post(auth::send_otc))
        .route("/auth/otc/verify", post(auth::verify_otc))
        .route("/auth/wallet/nonce/{address}", get(auth::wallet_nonce))
        .route("/auth/wallet/verify", post(auth::verify_wallet))
        .route("/payments/settle", post(payments::settle))
        .with_state(state);

    Router::new()
        .nest("/v1", v1_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        auth::register,
        auth::login,
        auth::send_otc,
        auth::verify_otc,
        auth::wallet_nonce,
        auth::verify_wallet,
        payments::settle
    ),
    components(
        schemas(
            HealthResponse,
            UserProfile,
            AuthResponse,
            RegisterRequest,
            LoginRequest,
            SendOtcRequest,
            VerifyOtcRequest,
            NonceResponse,
            VerifyWalletRequest,
            MessageResponse,
            SettleRequest,
            StoredTransaction,
            SettlementOutcome,
            Currency,
            Rail
        )
    ),
    tags(
        (name = "Health", description = "Liveness and storage checks"),
        (name = "Auth", description = "Registration, login, OTC and wallet authentication"),
        (name = "Payments", description = "Order settlement")
    )
)]
struct ApiDoc;
