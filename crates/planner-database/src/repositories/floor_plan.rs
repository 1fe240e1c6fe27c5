//! Floor plan repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use planner_core::error::AppError;
use planner_core::result::AppResult;
use planner_core::types::{FloorPlanId, OrganizationId, UserId};
use planner_entity::floor_plan::{FloorPlan, FloorPlanSummary, NewFloorPlan};

use super::{db_error, is_foreign_key_violation};
use crate::store::FloorPlanStore;

const PLAN_COLUMNS: &str = "id, user_id, name, organization_id, created_at, updated_at";

/// Repository for floor plan rows.
#[derive(Debug, Clone)]
pub struct FloorPlanRepository {
    pool: PgPool,
}

impl FloorPlanRepository {
    /// Create a new floor plan repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map a write failure, turning a dangling organization reference into
/// not-found.
fn write_error(message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        if is_foreign_key_violation(&e) {
            AppError::not_found("Organization not found")
        } else {
            db_error(message)(e)
        }
    }
}

#[async_trait]
impl FloorPlanStore for FloorPlanRepository {
    async fn list_visible(&self, user: UserId) -> AppResult<Vec<FloorPlanSummary>> {
        sqlx::query_as::<_, FloorPlanSummary>(
            "SELECT fp.id, fp.user_id, fp.name, fp.organization_id, fp.created_at, fp.updated_at, \
                    o.name AS organization_name, \
                    (fp.organization_id IS NULL) AS is_personal \
             FROM floor_plans fp \
             LEFT JOIN organizations o ON o.id = fp.organization_id \
             WHERE fp.user_id = $1 \
                OR fp.organization_id IN ( \
                    SELECT organization_id FROM organization_members WHERE user_id = $1 \
                ) \
             ORDER BY fp.updated_at DESC",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list floor plans"))
    }

    async fn create(&self, plan: NewFloorPlan) -> AppResult<FloorPlan> {
        sqlx::query_as::<_, FloorPlan>(&format!(
            "INSERT INTO floor_plans (id, user_id, name, organization_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $5) \
             RETURNING {PLAN_COLUMNS}"
        ))
        .bind(FloorPlanId::new())
        .bind(plan.user_id)
        .bind(&plan.name)
        .bind(plan.organization_id)
        .bind(plan.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(write_error("Failed to create floor plan"))
    }

    async fn find(&self, id: FloorPlanId) -> AppResult<Option<FloorPlan>> {
        sqlx::query_as::<_, FloorPlan>(&format!(
            "SELECT {PLAN_COLUMNS} FROM floor_plans WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find floor plan"))
    }

    async fn rename(
        &self,
        id: FloorPlanId,
        name: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<FloorPlan>> {
        sqlx::query_as::<_, FloorPlan>(&format!(
            "UPDATE floor_plans SET name = $2, updated_at = $3 WHERE id = $1 \
             RETURNING {PLAN_COLUMNS}"
        ))
        .bind(id)
        .bind(name)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to rename floor plan"))
    }

    async fn delete(&self, id: FloorPlanId) -> AppResult<bool> {
        // Lease and collection rows go with it through ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM floor_plans WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete floor plan"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_organization(
        &self,
        id: FloorPlanId,
        organization: Option<OrganizationId>,
        now: DateTime<Utc>,
    ) -> AppResult<Option<FloorPlan>> {
        sqlx::query_as::<_, FloorPlan>(&format!(
            "UPDATE floor_plans SET organization_id = $2, updated_at = $3 WHERE id = $1 \
             RETURNING {PLAN_COLUMNS}"
        ))
        .bind(id)
        .bind(organization)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(write_error("Failed to update floor plan organization"))
    }
}
