//! Organization membership model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use planner_core::types::{OrganizationId, UserId};

use super::role::Role;

/// One (organization, principal) pair with exactly one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    /// Organization.
    pub organization_id: OrganizationId,
    /// Member principal.
    pub user_id: UserId,
    /// Email captured from the member's token when they joined.
    pub email: Option<String>,
    /// Role in the organization.
    pub role: Role,
    /// When the membership was created.
    pub joined_at: DateTime<Utc>,
}

/// Outcome of a guarded role change or removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipChange {
    /// The mutation was applied. Carries the membership as it now stands
    /// (or as it stood before removal).
    Applied(Membership),
    /// No membership exists for that pair.
    NotFound,
    /// Refused because the target is the organization's last owner.
    LastOwner,
    /// Refused because the actor's role may not touch the target's owner role.
    Forbidden,
}
