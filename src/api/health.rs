// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 FarmLink

//! Liveness and storage health.

use axum::{extract::State, Json};
use tracing::error;

use crate::{error::ApiError, models::HealthResponse, state::AppState};

#[utoipa::path(
    get,
    path = "/v1/health",
    tag = "Health",
    responses(
        (status = 200, body = HealthResponse),
        (status = 503, description = "Storage is not writable")
    )
)]
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    if let Err(e) = state.store.health_check() {
        error!(error = %e, "Storage health check failed");
        return Err(ApiError::service_unavailable("Storage is unavailable"));
    }

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        storage: "ok".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::test_state;

    #[tokio::test]
    async fn health_reports_ok_on_writable_storage() {
        let (state, _tmp) = test_state();
        let Json(response) = health(State(state)).await.expect("healthy");
        assert_eq!(response.status, "ok");
        assert_eq!(response.storage, "ok");
    }
}
