//! Entity collection repository: the SQL side of diff-sync.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use tracing::debug;

use planner_core::error::AppError;
use planner_core::result::AppResult;
use planner_core::types::FloorPlanId;
use planner_entity::floor_plan::{CollectionBatch, EntityCollection};

use super::db_error;
use crate::store::CollectionStore;

/// Repository for the per-plan sub-entity tables.
///
/// Table identifiers come only from [`EntityCollection::table_name`]; item
/// ids and payloads are always bound parameters.
#[derive(Debug, Clone)]
pub struct CollectionRepository {
    pool: PgPool,
}

impl CollectionRepository {
    /// Create a new collection repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Reconcile one table against its batch: delete absent ids, then upsert.
async fn reconcile(
    conn: &mut PgConnection,
    plan: FloorPlanId,
    batch: &CollectionBatch,
) -> AppResult<()> {
    let table = batch.collection.table_name();
    let ids = batch.ids();

    let removed = if ids.is_empty() {
        sqlx::query(&format!("DELETE FROM {table} WHERE floor_plan_id = $1"))
            .bind(plan)
            .execute(&mut *conn)
            .await
    } else {
        sqlx::query(&format!(
            "DELETE FROM {table} WHERE floor_plan_id = $1 AND NOT (id = ANY($2))"
        ))
        .bind(plan)
        .bind(&ids)
        .execute(&mut *conn)
        .await
    }
    .map_err(db_error("Failed to delete removed items"))?
    .rows_affected();

    let upsert = format!(
        "INSERT INTO {table} (floor_plan_id, id, position, data) VALUES ($1, $2, $3, $4) \
         ON CONFLICT (floor_plan_id, id) \
         DO UPDATE SET position = EXCLUDED.position, data = EXCLUDED.data"
    );
    for (position, item) in batch.items.iter().enumerate() {
        let position = i32::try_from(position)
            .map_err(|_| AppError::validation("Too many items in collection"))?;
        sqlx::query(&upsert)
            .bind(plan)
            .bind(item.id)
            .bind(position)
            .bind(&item.data)
            .execute(&mut *conn)
            .await
            .map_err(db_error("Failed to upsert item"))?;
    }

    debug!(
        floor_plan_id = %plan,
        collection = %batch.collection,
        removed,
        upserted = batch.items.len(),
        "Collection reconciled"
    );
    Ok(())
}

#[async_trait]
impl CollectionStore for CollectionRepository {
    async fn load(
        &self,
        plan: FloorPlanId,
        collection: EntityCollection,
    ) -> AppResult<Vec<serde_json::Value>> {
        sqlx::query_scalar::<_, serde_json::Value>(&format!(
            "SELECT data FROM {} WHERE floor_plan_id = $1 ORDER BY position, id",
            collection.table_name()
        ))
        .bind(plan)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load collection"))
    }

    async fn replace_all(
        &self,
        plan: FloorPlanId,
        batches: &[CollectionBatch],
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        // Lock the plan row first so concurrent saves of the same plan
        // queue behind each other instead of interleaving.
        let exists = sqlx::query_scalar::<_, FloorPlanId>(
            "SELECT id FROM floor_plans WHERE id = $1 FOR UPDATE",
        )
        .bind(plan)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to lock floor plan"))?;
        if exists.is_none() {
            return Err(AppError::not_found("Floor plan not found"));
        }

        for batch in batches {
            reconcile(&mut tx, plan, batch).await?;
        }

        sqlx::query("UPDATE floor_plans SET updated_at = $2 WHERE id = $1")
            .bind(plan)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to touch floor plan"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit bulk save"))?;

        Ok(())
    }
}
