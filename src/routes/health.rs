//! Health check endpoints for liveness and readiness probes.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::errors::ApiResponse;
use crate::middleware::context::RequestContext;
use crate::AppState;

/// Readiness probe detail.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub storage: String,
}

/// Liveness probe: returns OK if the process is running.
pub async fn live() -> &'static str {
    "OK"
}

/// Readiness probe: checks that the customer store answers.
pub async fn ready(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> (StatusCode, Json<ApiResponse<HealthStatus>>) {
    match state.customers.ping().await {
        Ok(()) => (
            StatusCode::OK,
            ApiResponse::success(
                &ctx,
                HealthStatus {
                    status: "ok".to_string(),
                    storage: "connected".to_string(),
                },
            ),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Storage health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                ApiResponse::success(
                    &ctx,
                    HealthStatus {
                        status: "unavailable".to_string(),
                        storage: "error".to_string(),
                    },
                ),
            )
        }
    }
}
