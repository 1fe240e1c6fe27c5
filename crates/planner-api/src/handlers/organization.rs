//! Organization CRUD handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use planner_core::types::OrganizationId;
use planner_entity::organization::{Organization, OrganizationWithRole};

use crate::dto::request::{CreateOrganizationRequest, UpdateOrganizationRequest};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson, parse_id};
use crate::state::AppState;

/// GET /api/organizations
pub async fn list_organizations(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<OrganizationWithRole>>, ApiError> {
    let organizations = state.organizations.list(&auth).await?;
    Ok(Json(organizations))
}

/// POST /api/organizations
pub async fn create_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateOrganizationRequest>,
) -> Result<(StatusCode, Json<Organization>), ApiError> {
    let organization = state.organizations.create(&auth, &req.name).await?;
    Ok((StatusCode::CREATED, Json(organization)))
}

/// GET /api/organizations/{id}
pub async fn get_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<OrganizationWithRole>, ApiError> {
    let id: OrganizationId = parse_id(&id)?;
    let organization = state.organizations.get(&auth, id).await?;
    Ok(Json(organization))
}

/// PUT /api/organizations/{id}
pub async fn update_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateOrganizationRequest>,
) -> Result<Json<Organization>, ApiError> {
    let id: OrganizationId = parse_id(&id)?;
    let organization = state.organizations.update(&auth, id, &req.name).await?;
    Ok(Json(organization))
}

/// DELETE /api/organizations/{id}
pub async fn delete_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: OrganizationId = parse_id(&id)?;
    state.organizations.delete(&auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
