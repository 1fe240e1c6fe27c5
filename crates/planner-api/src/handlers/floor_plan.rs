//! Floor plan CRUD, bulk save, and sharing handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use planner_core::types::FloorPlanId;
use planner_entity::floor_plan::{FloorPlan, FloorPlanDetail, FloorPlanSummary};
use planner_service::floor_plan::DeleteOutcome;

use crate::dto::request::{
    CreateFloorPlanRequest, SaveFloorPlanRequest, ShareFloorPlanRequest, UpdateFloorPlanRequest,
};
use crate::dto::response::{SaveResponse, StatusResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson, parse_id};
use crate::state::AppState;

/// GET /api/floor-plans
pub async fn list_floor_plans(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<FloorPlanSummary>>, ApiError> {
    let plans = state.floor_plans.list(&auth).await?;
    Ok(Json(plans))
}

/// POST /api/floor-plans
pub async fn create_floor_plan(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateFloorPlanRequest>,
) -> Result<(StatusCode, Json<FloorPlan>), ApiError> {
    let plan = state
        .floor_plans
        .create(&auth, req.name, req.organization_id)
        .await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

/// GET /api/floor-plans/{id}
pub async fn get_floor_plan(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<FloorPlanDetail>, ApiError> {
    let id: FloorPlanId = parse_id(&id)?;
    let detail = state.floor_plans.get(&auth, id).await?;
    Ok(Json(detail))
}

/// PUT /api/floor-plans/{id}
pub async fn update_floor_plan(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateFloorPlanRequest>,
) -> Result<Json<FloorPlan>, ApiError> {
    let id: FloorPlanId = parse_id(&id)?;
    let plan = state.floor_plans.rename(&auth, id, &req.name).await?;
    Ok(Json(plan))
}

/// DELETE /api/floor-plans/{id}
///
/// Personal plans are deleted; shared plans are detached from their
/// organization and reported as "unshared".
pub async fn delete_floor_plan(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    let id: FloorPlanId = parse_id(&id)?;
    let status = match state.floor_plans.delete(&auth, id).await? {
        DeleteOutcome::Deleted => "deleted",
        DeleteOutcome::Detached => "unshared",
    };
    Ok(Json(StatusResponse::new(status)))
}

/// PUT /api/floor-plans/{id}/save
pub async fn save_floor_plan(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<SaveFloorPlanRequest>,
) -> Result<Json<SaveResponse>, ApiError> {
    let id: FloorPlanId = parse_id(&id)?;
    let report = state.floor_plans.bulk_save(&auth, id, req.into()).await?;
    Ok(Json(SaveResponse {
        status: "saved".to_string(),
        report,
    }))
}

/// POST /api/floor-plans/{id}/share
pub async fn share_floor_plan(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<ShareFloorPlanRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let id: FloorPlanId = parse_id(&id)?;
    state
        .floor_plans
        .share(&auth, id, req.organization_id)
        .await?;
    Ok(Json(StatusResponse::new("shared")))
}

/// DELETE /api/floor-plans/{id}/share
pub async fn unshare_floor_plan(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    let id: FloorPlanId = parse_id(&id)?;
    state.floor_plans.unshare(&auth, id).await?;
    Ok(Json(StatusResponse::new("unshared")))
}
