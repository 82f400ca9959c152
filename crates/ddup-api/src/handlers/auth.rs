//! Auth handlers: register, login, logout, refresh, me.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use ddup_auth::gatekeeper::AUTH_REQUIRED_MESSAGE;
use ddup_core::AppError;
use ddup_entity::user::UserSummary;

use crate::dto::request::{LoginRequest, RegisterBody};
use crate::dto::response::{ApiResponse, LoginResponse, MessageResponse};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, RawToken, ValidatedJson};
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterBody>,
) -> ApiResult<(StatusCode, Json<ApiResponse<UserSummary>>)> {
    let user = state.user_service.register(req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(user))))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<ApiResponse<LoginResponse>>> {
    let result = state
        .session_service
        .login(&req.username, &req.password)
        .await?;

    Ok(Json(ApiResponse::ok(result.into())))
}

/// POST /api/auth/logout
///
/// Succeeds for unknown, expired, or already revoked tokens, and when no
/// token is sent at all.
pub async fn logout(
    State(state): State<AppState>,
    RawToken(token): RawToken,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    if let Some(token) = token {
        state.session_service.logout(&token).await?;
    }

    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Logged out successfully",
    ))))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    RawToken(token): RawToken,
) -> ApiResult<Json<ApiResponse<LoginResponse>>> {
    let token = token.ok_or_else(|| AppError::unauthorized(AUTH_REQUIRED_MESSAGE))?;
    let result = state.session_service.refresh(&token).await?;

    Ok(Json(ApiResponse::ok(result.into())))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<UserSummary>>> {
    let user = state.user_service.me(&auth).await?;
    Ok(Json(ApiResponse::ok(user)))
}
