//! Organization member handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use planner_core::types::{OrganizationId, UserId};
use planner_entity::organization::{Invitation, Membership};

use crate::dto::request::{InviteMemberRequest, UpdateMemberRoleRequest};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson, parse_id};
use crate::state::AppState;

/// GET /api/organizations/{id}/members
pub async fn list_members(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<Membership>>, ApiError> {
    let id: OrganizationId = parse_id(&id)?;
    let members = state.members.list_members(&auth, id).await?;
    Ok(Json(members))
}

/// POST /api/organizations/{id}/members
pub async fn invite_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<InviteMemberRequest>,
) -> Result<(StatusCode, Json<Invitation>), ApiError> {
    let id: OrganizationId = parse_id(&id)?;
    let invitation = state
        .invitations
        .invite(&auth, id, &req.email, req.role)
        .await?;
    Ok((StatusCode::CREATED, Json(invitation)))
}

/// PUT /api/organizations/{id}/members/{user_id}
pub async fn update_member_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, user_id)): Path<(String, String)>,
    ValidatedJson(req): ValidatedJson<UpdateMemberRoleRequest>,
) -> Result<Json<Membership>, ApiError> {
    let id: OrganizationId = parse_id(&id)?;
    let user_id: UserId = parse_id(&user_id)?;
    let membership = state
        .members
        .update_role(&auth, id, user_id, req.role)
        .await?;
    Ok(Json(membership))
}

/// DELETE /api/organizations/{id}/members/{user_id}
pub async fn remove_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, user_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let id: OrganizationId = parse_id(&id)?;
    let user_id: UserId = parse_id(&user_id)?;
    state.members.remove_member(&auth, id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
