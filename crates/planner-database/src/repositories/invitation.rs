//! Invitation repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use planner_core::result::AppResult;
use planner_core::types::InvitationId;
use planner_entity::Principal;
use planner_entity::organization::{
    Invitation, InvitationAcceptance, Membership, NewInvitation,
};

use super::db_error;
use crate::store::InvitationStore;

const INVITATION_COLUMNS: &str =
    "id, organization_id, email, role, token, invited_by, created_at, expires_at";

/// Repository for organization invitations.
#[derive(Debug, Clone)]
pub struct InvitationRepository {
    pool: PgPool,
}

impl InvitationRepository {
    /// Create a new invitation repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvitationStore for InvitationRepository {
    async fn create(&self, invitation: NewInvitation) -> AppResult<Invitation> {
        sqlx::query_as::<_, Invitation>(&format!(
            "INSERT INTO organization_invitations \
             (id, organization_id, email, role, token, invited_by, created_at, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {INVITATION_COLUMNS}"
        ))
        .bind(InvitationId::new())
        .bind(invitation.organization_id)
        .bind(&invitation.email)
        .bind(invitation.role)
        .bind(&invitation.token)
        .bind(invitation.invited_by)
        .bind(invitation.created_at)
        .bind(invitation.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to create invitation"))
    }

    async fn accept(
        &self,
        token: &str,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> AppResult<InvitationAcceptance> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        // A concurrent acceptance of the same token blocks here and then
        // finds the row gone.
        let invitation = sqlx::query_as::<_, Invitation>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM organization_invitations \
             WHERE token = $1 FOR UPDATE"
        ))
        .bind(token)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to find invitation"))?;

        let Some(invitation) = invitation else {
            return Ok(InvitationAcceptance::NotFound);
        };

        sqlx::query("DELETE FROM organization_invitations WHERE id = $1")
            .bind(invitation.id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to consume invitation"))?;

        if invitation.is_expired(now) {
            tx.commit()
                .await
                .map_err(db_error("Failed to commit expired invitation cleanup"))?;
            return Ok(InvitationAcceptance::Expired);
        }

        let inserted = sqlx::query_as::<_, Membership>(
            "INSERT INTO organization_members (organization_id, user_id, email, role, joined_at) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (organization_id, user_id) DO NOTHING \
             RETURNING organization_id, user_id, email, role, joined_at",
        )
        .bind(invitation.organization_id)
        .bind(principal.id)
        .bind(principal.email.as_deref())
        .bind(invitation.role)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to add member"))?;

        let outcome = match inserted {
            Some(membership) => InvitationAcceptance::Joined(membership),
            None => {
                let existing = sqlx::query_as::<_, Membership>(
                    "SELECT organization_id, user_id, email, role, joined_at \
                     FROM organization_members WHERE organization_id = $1 AND user_id = $2",
                )
                .bind(invitation.organization_id)
                .bind(principal.id)
                .fetch_one(&mut *tx)
                .await
                .map_err(db_error("Failed to load existing membership"))?;
                InvitationAcceptance::AlreadyMember(existing)
            }
        };

        tx.commit()
            .await
            .map_err(db_error("Failed to commit invitation acceptance"))?;

        Ok(outcome)
    }
}
