// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 FarmLink

//! Settlement handler.

use axum::{extract::State, Json};
use tracing::error;

use crate::{
    auth::Auth,
    error::ApiError,
    ledger::LedgerError,
    models::SettleRequest,
    providers::GatewayError,
    settlement::SettlementError,
    state::AppState,
    storage::StoredTransaction,
};

#[utoipa::path(
    post,
    path = "/v1/payments/settle",
    request_body = SettleRequest,
    tag = "Payments",
    responses(
        (status = 200, body = StoredTransaction),
        (status = 400, description = "Currency not valid on the chosen rail"),
        (status = 403, description = "Caller is not the order's buyer"),
        (status = 404, description = "Order not found"),
        (status = 422, description = "Seller cannot receive on this rail"),
        (status = 502, description = "Rail execution failed")
    )
)]
pub async fn settle(
    Auth(caller): Auth,
    State(state): State<AppState>,
    Json(request): Json<SettleRequest>,
) -> Result<Json<StoredTransaction>, ApiError> {
    if !request.amount.is_finite() || request.amount <= 0.0 {
        return Err(ApiError::bad_request("Amount must be positive"));
    }

    let transaction = state
        .settlement
        .settle(
            &caller,
            &request.order_id,
            request.amount,
            request.currency,
            request.rail,
        )
        .await
        .map_err(|e| match e {
            SettlementError::OrderNotFound => ApiError::not_found("Order not found"),
            SettlementError::RoleNotAllowed | SettlementError::NotOrderBuyer => {
                ApiError::forbidden("Only the order's buyer may settle it")
            }
            SettlementError::CurrencyRailMismatch(..) => {
                ApiError::bad_request(e.to_string())
            }
            SettlementError::SellerNotFound
            | SettlementError::SellerWalletMissing
            | SettlementError::BuyerEmailMissing => ApiError::unprocessable(e.to_string()),
            SettlementError::Ledger(LedgerError::NotConfigured) => {
                ApiError::service_unavailable("Ledger rail is not configured")
            }
            SettlementError::Gateway(GatewayError::MissingConfig(_)) => {
                ApiError::service_unavailable("Card gateway is not configured")
            }
            SettlementError::Ledger(cause) => {
                error!(order_id = %request.order_id, error = %cause, "Ledger settlement failed");
                ApiError::bad_gateway("Settlement failed on the ledger rail")
            }
            SettlementError::Gateway(cause) => {
                error!(order_id = %request.order_id, error = %cause, "Gateway settlement failed");
                ApiError::bad_gateway("Settlement failed on the card gateway")
            }
            SettlementError::Storage(cause) => {
                ApiError::internal(format!("Settlement persistence failed: {cause}"))
            }
        })?;

    Ok(Json(transaction))
}
