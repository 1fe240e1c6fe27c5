//! Organization invitation model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use planner_core::types::{InvitationId, OrganizationId, UserId};

use super::membership::Membership;
use super::role::Role;

/// A single-use invitation into an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    /// Unique identifier.
    pub id: InvitationId,
    /// Target organization.
    pub organization_id: OrganizationId,
    /// Invited email address.
    pub email: String,
    /// Role granted on acceptance.
    pub role: Role,
    /// Bearer token presented on acceptance.
    pub token: String,
    /// Principal that created the invitation.
    pub invited_by: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
}

impl Invitation {
    /// Whether the invitation can no longer be accepted at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Input for creating an invitation.
#[derive(Debug, Clone)]
pub struct NewInvitation {
    /// Target organization.
    pub organization_id: OrganizationId,
    /// Invited email, already normalized.
    pub email: String,
    /// Role granted on acceptance.
    pub role: Role,
    /// Random token.
    pub token: String,
    /// Inviting principal.
    pub invited_by: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
}

/// Outcome of accepting an invitation token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvitationAcceptance {
    /// A new membership was created and the invitation consumed.
    Joined(Membership),
    /// The caller was already a member; the invitation was consumed and the
    /// existing membership left untouched.
    AlreadyMember(Membership),
    /// The invitation had expired; it was deleted and nothing else changed.
    Expired,
    /// No invitation with that token exists (never issued or already used).
    NotFound,
}
