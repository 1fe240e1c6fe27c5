//! Floor plan entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use planner_core::types::{FloorPlanId, OrganizationId, UserId};

use super::lease::FloorPlanLease;

/// A floor plan, either personal or shared to one organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FloorPlan {
    /// Unique identifier.
    pub id: FloorPlanId,
    /// Creator of the plan.
    pub user_id: UserId,
    /// Display name.
    pub name: String,
    /// Organization the plan is shared to; `None` means personal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<OrganizationId>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time, bumped by every bulk save.
    pub updated_at: DateTime<Utc>,
}

impl FloorPlan {
    /// Whether only the creator has access.
    pub fn is_personal(&self) -> bool {
        self.organization_id.is_none()
    }

    /// Whether `user` created this plan.
    pub fn is_created_by(&self, user: UserId) -> bool {
        self.user_id == user
    }
}

/// Input for creating a floor plan.
#[derive(Debug, Clone)]
pub struct NewFloorPlan {
    /// Creator.
    pub user_id: UserId,
    /// Name, already validated.
    pub name: String,
    /// Optional organization to create the plan in.
    pub organization_id: Option<OrganizationId>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// List entry: a plan plus the name of the organization it is shared to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FloorPlanSummary {
    /// The plan.
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub plan: FloorPlan,
    /// Organization name when shared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
    /// `true` when the plan has no organization.
    pub is_personal: bool,
}

/// A plan with all of its content and current lock state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorPlanDetail {
    /// The plan.
    #[serde(flatten)]
    pub plan: FloorPlan,
    /// Table payloads.
    pub tables: Vec<serde_json::Value>,
    /// Guest payloads.
    pub guests: Vec<serde_json::Value>,
    /// Label payloads.
    pub labels: Vec<serde_json::Value>,
    /// Active edit lease, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock: Option<FloorPlanLease>,
    /// Organization name when shared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
}
