//! Membership repository implementation.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

use planner_core::result::AppResult;
use planner_core::types::{OrganizationId, UserId};
use planner_entity::organization::{Membership, MembershipChange, Role};

use super::db_error;
use crate::store::MembershipStore;

const MEMBER_COLUMNS: &str = "organization_id, user_id, email, role, joined_at";

/// Repository for organization memberships.
#[derive(Debug, Clone)]
pub struct MembershipRepository {
    pool: PgPool,
}

impl MembershipRepository {
    /// Create a new membership repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Lock the organization's owner rows and the target row, returning the
/// number of owners and the target membership.
///
/// Locking every owner row serializes concurrent demotions and removals of
/// owners, so two of them cannot both observe "another owner exists".
async fn lock_for_change(
    conn: &mut PgConnection,
    organization: OrganizationId,
    user: UserId,
) -> AppResult<(usize, Option<Membership>)> {
    let owners: Vec<UserId> = sqlx::query_scalar(
        "SELECT user_id FROM organization_members \
         WHERE organization_id = $1 AND role = 'owner' \
         FOR UPDATE",
    )
    .bind(organization)
    .fetch_all(&mut *conn)
    .await
    .map_err(db_error("Failed to lock owners"))?;

    let target = sqlx::query_as::<_, Membership>(&format!(
        "SELECT {MEMBER_COLUMNS} FROM organization_members \
         WHERE organization_id = $1 AND user_id = $2 \
         FOR UPDATE"
    ))
    .bind(organization)
    .bind(user)
    .fetch_optional(&mut *conn)
    .await
    .map_err(db_error("Failed to lock membership"))?;

    Ok((owners.len(), target))
}

#[async_trait]
impl MembershipStore for MembershipRepository {
    async fn role_of(
        &self,
        organization: OrganizationId,
        user: UserId,
    ) -> AppResult<Option<Role>> {
        sqlx::query_scalar::<_, Role>(
            "SELECT role FROM organization_members WHERE organization_id = $1 AND user_id = $2",
        )
        .bind(organization)
        .bind(user)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to look up role"))
    }

    async fn list_members(&self, organization: OrganizationId) -> AppResult<Vec<Membership>> {
        sqlx::query_as::<_, Membership>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM organization_members \
             WHERE organization_id = $1 ORDER BY joined_at, user_id"
        ))
        .bind(organization)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list members"))
    }

    async fn update_role(
        &self,
        organization: OrganizationId,
        user: UserId,
        role: Role,
        actor: Role,
    ) -> AppResult<MembershipChange> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let (owners, target) = lock_for_change(&mut tx, organization, user).await?;
        let Some(current) = target else {
            return Ok(MembershipChange::NotFound);
        };
        if !actor.may_reassign(current.role, role) {
            return Ok(MembershipChange::Forbidden);
        }
        if current.role == Role::Owner && role != Role::Owner && owners <= 1 {
            return Ok(MembershipChange::LastOwner);
        }

        let updated = sqlx::query_as::<_, Membership>(&format!(
            "UPDATE organization_members SET role = $3 \
             WHERE organization_id = $1 AND user_id = $2 \
             RETURNING {MEMBER_COLUMNS}"
        ))
        .bind(organization)
        .bind(user)
        .bind(role)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to update role"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit role change"))?;

        Ok(MembershipChange::Applied(updated))
    }

    async fn remove(
        &self,
        organization: OrganizationId,
        user: UserId,
        actor: Role,
    ) -> AppResult<MembershipChange> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let (owners, target) = lock_for_change(&mut tx, organization, user).await?;
        let Some(current) = target else {
            return Ok(MembershipChange::NotFound);
        };
        if !actor.may_remove(current.role) {
            return Ok(MembershipChange::Forbidden);
        }
        if current.role == Role::Owner && owners <= 1 {
            return Ok(MembershipChange::LastOwner);
        }

        sqlx::query("DELETE FROM organization_members WHERE organization_id = $1 AND user_id = $2")
            .bind(organization)
            .bind(user)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to remove member"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit member removal"))?;

        Ok(MembershipChange::Applied(current))
    }
}
