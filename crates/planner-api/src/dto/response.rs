//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use planner_entity::floor_plan::FloorPlanLease;
use planner_entity::organization::Membership;
use planner_service::SyncReport;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// "ok" or "degraded".
    pub status: String,
    /// Crate version.
    pub version: String,
    /// "connected", "unreachable", or "memory".
    pub database: String,
    /// When the verification key was last loaded.
    pub key_loaded_at: DateTime<Utc>,
    /// Seconds since the verification key was last loaded.
    pub key_age_seconds: i64,
}

/// Bare `{"status": ...}` acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Outcome keyword.
    pub status: String,
}

impl StatusResponse {
    /// Builds an acknowledgement.
    pub fn new(status: &str) -> Self {
        Self {
            status: status.to_string(),
        }
    }
}

/// Lock status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockStatusResponse {
    /// Whether an unexpired lease exists.
    pub locked: bool,
    /// The lease, when locked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock: Option<FloorPlanLease>,
}

impl From<Option<FloorPlanLease>> for LockStatusResponse {
    fn from(lock: Option<FloorPlanLease>) -> Self {
        Self {
            locked: lock.is_some(),
            lock,
        }
    }
}

/// Bulk save result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    /// Always "saved".
    pub status: String,
    /// Stored counts and server-assigned ids.
    #[serde(flatten)]
    pub report: SyncReport,
}

/// Invitation acceptance result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptInvitationResponse {
    /// "joined" or "already_member".
    pub status: String,
    /// The caller's membership.
    pub membership: Membership,
}
