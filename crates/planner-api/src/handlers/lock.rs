//! Edit lease handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use planner_core::types::FloorPlanId;
use planner_entity::floor_plan::FloorPlanLease;

use crate::dto::response::LockStatusResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, parse_id};
use crate::state::AppState;

/// GET /api/floor-plans/{id}/lock
pub async fn lock_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<LockStatusResponse>, ApiError> {
    let id: FloorPlanId = parse_id(&id)?;
    let lease = state.leases.status(&auth, id).await?;
    Ok(Json(lease.into()))
}

/// POST /api/floor-plans/{id}/lock
pub async fn acquire_lock(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<FloorPlanLease>, ApiError> {
    let id: FloorPlanId = parse_id(&id)?;
    let lease = state.leases.acquire_or_refresh(&auth, id).await?;
    Ok(Json(lease))
}

/// PUT /api/floor-plans/{id}/lock
pub async fn refresh_lock(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<FloorPlanLease>, ApiError> {
    let id: FloorPlanId = parse_id(&id)?;
    let lease = state.leases.refresh(&auth, id).await?;
    Ok(Json(lease))
}

/// DELETE /api/floor-plans/{id}/lock
pub async fn release_lock(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: FloorPlanId = parse_id(&id)?;
    state.leases.release(&auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
