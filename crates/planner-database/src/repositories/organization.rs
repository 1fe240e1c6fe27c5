//! Organization repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use planner_core::result::AppResult;
use planner_core::types::{OrganizationId, UserId};
use planner_entity::Principal;
use planner_entity::organization::{Organization, OrganizationWithRole, Role};

use super::db_error;
use crate::store::OrganizationStore;

/// Repository for organization lifecycle operations.
#[derive(Debug, Clone)]
pub struct OrganizationRepository {
    pool: PgPool,
}

impl OrganizationRepository {
    /// Create a new organization repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrganizationStore for OrganizationRepository {
    async fn list_for_user(&self, user: UserId) -> AppResult<Vec<OrganizationWithRole>> {
        sqlx::query_as::<_, OrganizationWithRole>(
            "SELECT o.id, o.name, o.created_by, o.created_at, o.updated_at, m.role \
             FROM organizations o \
             JOIN organization_members m ON m.organization_id = o.id \
             WHERE m.user_id = $1 \
             ORDER BY o.name",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list organizations"))
    }

    async fn create_with_owner(
        &self,
        name: &str,
        owner: &Principal,
        now: DateTime<Utc>,
    ) -> AppResult<Organization> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let organization = sqlx::query_as::<_, Organization>(
            "INSERT INTO organizations (id, name, created_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $4) \
             RETURNING id, name, created_by, created_at, updated_at",
        )
        .bind(OrganizationId::new())
        .bind(name)
        .bind(owner.id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to create organization"))?;

        sqlx::query(
            "INSERT INTO organization_members (organization_id, user_id, email, role, joined_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(organization.id)
        .bind(owner.id)
        .bind(owner.email.as_deref())
        .bind(Role::Owner)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to add organization owner"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit organization"))?;

        Ok(organization)
    }

    async fn find(&self, id: OrganizationId) -> AppResult<Option<Organization>> {
        sqlx::query_as::<_, Organization>(
            "SELECT id, name, created_by, created_at, updated_at FROM organizations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find organization"))
    }

    async fn rename(
        &self,
        id: OrganizationId,
        name: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Organization>> {
        sqlx::query_as::<_, Organization>(
            "UPDATE organizations SET name = $2, updated_at = $3 WHERE id = $1 \
             RETURNING id, name, created_by, created_at, updated_at",
        )
        .bind(id)
        .bind(name)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to rename organization"))
    }

    async fn delete_detaching(&self, id: OrganizationId, now: DateTime<Utc>) -> AppResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let detached = sqlx::query(
            "UPDATE floor_plans SET organization_id = NULL, updated_at = $2 \
             WHERE organization_id = $1",
        )
        .bind(id)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to detach floor plans"))?
        .rows_affected();

        sqlx::query("DELETE FROM organization_members WHERE organization_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete memberships"))?;

        sqlx::query("DELETE FROM organization_invitations WHERE organization_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete invitations"))?;

        let deleted = sqlx::query("DELETE FROM organizations WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete organization"))?
            .rows_affected();

        if deleted == 0 {
            // Dropping the transaction rolls back the no-op statements above.
            return Ok(false);
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit organization deletion"))?;

        debug!(organization_id = %id, detached, "Organization deleted");
        Ok(true)
    }
}
