//! User self-service handlers.

use axum::Json;
use axum::extract::{Path, State};

use ddup_auth::Gatekeeper;
use ddup_core::types::UserId;

use crate::dto::request::ChangePasswordRequest;
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// PUT /api/users/{user_id}/password
///
/// Only the account owner may change the password.
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<UserId>,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    Gatekeeper::require_subject(&auth.identity(), user_id)?;

    state
        .user_service
        .change_password(user_id, &req.old_password, &req.new_password)
        .await?;

    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Password changed successfully",
    ))))
}
