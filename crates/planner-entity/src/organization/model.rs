//! Organization entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use planner_core::types::{OrganizationId, UserId};

use super::role::Role;

/// An organization that floor plans can be shared to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    /// Unique identifier.
    pub id: OrganizationId,
    /// Display name.
    pub name: String,
    /// Principal that created the organization.
    pub created_by: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// An organization together with the caller's role in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationWithRole {
    /// The organization.
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub organization: Organization,
    /// The caller's role.
    pub role: Role,
}
