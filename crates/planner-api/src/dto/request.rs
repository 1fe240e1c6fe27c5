//! Request DTOs with validation.
//!
//! Field names are camelCase to match the editor client.

use serde::{Deserialize, Serialize};
use validator::Validate;

use planner_core::types::OrganizationId;
use planner_entity::organization::Role;
use planner_service::Snapshot;

/// Create floor plan body. Both fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFloorPlanRequest {
    /// Plan name; blank falls back to the default name.
    pub name: Option<String>,
    /// Organization to create the plan in.
    pub organization_id: Option<OrganizationId>,
}

/// Rename floor plan body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFloorPlanRequest {
    /// New name.
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
}

/// Share floor plan body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShareFloorPlanRequest {
    /// Target organization.
    pub organization_id: OrganizationId,
}

/// Create organization body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganizationRequest {
    /// Organization name.
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
}

/// Rename organization body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrganizationRequest {
    /// New name.
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
}

/// Invite member body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InviteMemberRequest {
    /// Invitee email.
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    /// Role granted on acceptance; defaults to member.
    #[serde(default = "default_invite_role")]
    pub role: Role,
}

fn default_invite_role() -> Role {
    Role::Member
}

/// Change member role body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemberRoleRequest {
    /// New role.
    pub role: Role,
}

/// Bulk save body: the full contents of each collection.
///
/// A missing array means the collection is now empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveFloorPlanRequest {
    /// Table payloads.
    #[serde(default)]
    pub tables: Vec<serde_json::Value>,
    /// Guest payloads.
    #[serde(default)]
    pub guests: Vec<serde_json::Value>,
    /// Label payloads.
    #[serde(default)]
    pub labels: Vec<serde_json::Value>,
}

impl From<SaveFloorPlanRequest> for Snapshot {
    fn from(req: SaveFloorPlanRequest) -> Self {
        Snapshot {
            tables: req.tables,
            guests: req.guests,
            labels: req.labels,
        }
    }
}
