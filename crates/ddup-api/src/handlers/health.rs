//! Health check handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::dto::response::{ApiResponse, HealthResponse, ReadinessResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

/// GET /api/health/ready
///
/// Pings storage; answers 503 while it is unreachable.
pub async fn ready(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<ReadinessResponse>>) {
    let driver = state.config.database.driver.to_string();

    match state.stores.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::ok(ReadinessResponse {
                status: "ok".to_string(),
                driver,
                storage: "connected".to_string(),
            })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    success: false,
                    data: ReadinessResponse {
                        status: "unavailable".to_string(),
                        driver,
                        storage: "unreachable".to_string(),
                    },
                }),
            )
        }
    }
}
