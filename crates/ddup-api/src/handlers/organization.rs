//! Organization and membership handlers.
//!
//! Role checks happen in the organization service; handlers only pass the
//! caller's context along.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use ddup_core::types::{OrganizationId, UserId};
use ddup_entity::organization::{Organization, OrganizationMember};

use crate::dto::request::{
    AddMemberRequest, CreateOrganizationBody, UpdateMemberRoleRequest, UpdateOrganizationBody,
};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /api/orgs
pub async fn create_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateOrganizationBody>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Organization>>)> {
    let org = state.org_service.create(&auth, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(org))))
}

/// GET /api/orgs
pub async fn list_organizations(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<Vec<Organization>>>> {
    let orgs = state.org_service.list_mine(&auth).await?;
    Ok(Json(ApiResponse::ok(orgs)))
}

/// GET /api/orgs/{org_id}
pub async fn get_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<OrganizationId>,
) -> ApiResult<Json<ApiResponse<Organization>>> {
    let org = state.org_service.get(&auth, org_id).await?;
    Ok(Json(ApiResponse::ok(org)))
}

/// PUT /api/orgs/{org_id}
pub async fn update_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<OrganizationId>,
    ValidatedJson(req): ValidatedJson<UpdateOrganizationBody>,
) -> ApiResult<Json<ApiResponse<Organization>>> {
    let org = state.org_service.update(&auth, org_id, req.into()).await?;
    Ok(Json(ApiResponse::ok(org)))
}

/// DELETE /api/orgs/{org_id}
pub async fn delete_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<OrganizationId>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.org_service.delete(&auth, org_id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Organization deleted",
    ))))
}

/// GET /api/orgs/{org_id}/members
pub async fn list_members(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<OrganizationId>,
) -> ApiResult<Json<ApiResponse<Vec<OrganizationMember>>>> {
    let members = state.org_service.list_members(&auth, org_id).await?;
    Ok(Json(ApiResponse::ok(members)))
}

/// POST /api/orgs/{org_id}/members
pub async fn add_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<OrganizationId>,
    ValidatedJson(req): ValidatedJson<AddMemberRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<OrganizationMember>>)> {
    let member = state
        .org_service
        .add_member(&auth, org_id, req.user_id, req.role)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(member))))
}

/// PUT /api/orgs/{org_id}/members/{user_id}
pub async fn update_member_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, user_id)): Path<(OrganizationId, UserId)>,
    ValidatedJson(req): ValidatedJson<UpdateMemberRoleRequest>,
) -> ApiResult<Json<ApiResponse<OrganizationMember>>> {
    let member = state
        .org_service
        .update_member_role(&auth, org_id, user_id, req.role)
        .await?;
    Ok(Json(ApiResponse::ok(member)))
}

/// DELETE /api/orgs/{org_id}/members/{user_id}
pub async fn remove_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, user_id)): Path<(OrganizationId, UserId)>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state
        .org_service
        .remove_member(&auth, org_id, user_id)
        .await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Member removed"))))
}
