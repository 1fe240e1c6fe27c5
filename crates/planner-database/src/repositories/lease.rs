//! Edit lease repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use planner_core::result::AppResult;
use planner_core::types::{FloorPlanId, UserId};
use planner_entity::Principal;
use planner_entity::floor_plan::FloorPlanLease;

use super::db_error;
use crate::store::LeaseStore;

const LEASE_COLUMNS: &str = "floor_plan_id, user_id, user_email, locked_at, expires_at";

/// Repository for `floor_plan_locks`.
///
/// Every mutation is a single conditional statement; the row-level
/// conflict resolution of the upsert is the only arbiter between racing
/// acquirers.
#[derive(Debug, Clone)]
pub struct LeaseRepository {
    pool: PgPool,
}

impl LeaseRepository {
    /// Create a new lease repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeaseStore for LeaseRepository {
    async fn find_active(
        &self,
        plan: FloorPlanId,
        now: DateTime<Utc>,
    ) -> AppResult<Option<FloorPlanLease>> {
        sqlx::query_as::<_, FloorPlanLease>(&format!(
            "SELECT {LEASE_COLUMNS} FROM floor_plan_locks \
             WHERE floor_plan_id = $1 AND expires_at > $2"
        ))
        .bind(plan)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to read lease"))
    }

    async fn acquire(
        &self,
        plan: FloorPlanId,
        holder: &Principal,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Option<FloorPlanLease>> {
        // The update branch only fires for the same holder or an expired
        // row; otherwise nothing is returned.
        sqlx::query_as::<_, FloorPlanLease>(&format!(
            "INSERT INTO floor_plan_locks (floor_plan_id, user_id, user_email, locked_at, expires_at) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (floor_plan_id) DO UPDATE \
             SET user_id = EXCLUDED.user_id, \
                 user_email = EXCLUDED.user_email, \
                 locked_at = EXCLUDED.locked_at, \
                 expires_at = EXCLUDED.expires_at \
             WHERE floor_plan_locks.user_id = EXCLUDED.user_id \
                OR floor_plan_locks.expires_at <= EXCLUDED.locked_at \
             RETURNING {LEASE_COLUMNS}"
        ))
        .bind(plan)
        .bind(holder.id)
        .bind(holder.email.as_deref())
        .bind(now)
        .bind(expires_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to acquire lease"))
    }

    async fn refresh(
        &self,
        plan: FloorPlanId,
        holder: UserId,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Option<FloorPlanLease>> {
        sqlx::query_as::<_, FloorPlanLease>(&format!(
            "UPDATE floor_plan_locks SET locked_at = $3, expires_at = $4 \
             WHERE floor_plan_id = $1 AND user_id = $2 AND expires_at > $3 \
             RETURNING {LEASE_COLUMNS}"
        ))
        .bind(plan)
        .bind(holder)
        .bind(now)
        .bind(expires_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to refresh lease"))
    }

    async fn release(&self, plan: FloorPlanId, holder: UserId) -> AppResult<bool> {
        let result =
            sqlx::query("DELETE FROM floor_plan_locks WHERE floor_plan_id = $1 AND user_id = $2")
                .bind(plan)
                .bind(holder)
                .execute(&self.pool)
                .await
                .map_err(db_error("Failed to release lease"))?;
        Ok(result.rows_affected() > 0)
    }
}
