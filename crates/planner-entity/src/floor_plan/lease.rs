//! Edit lease on a floor plan.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use planner_core::types::{FloorPlanId, UserId};

/// The exclusive, time-bounded edit claim on one floor plan.
///
/// A row whose `expires_at` is not after "now" is treated as absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FloorPlanLease {
    /// The locked plan.
    pub floor_plan_id: FloorPlanId,
    /// Current holder.
    pub user_id: UserId,
    /// Holder's email for display, if their token carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    /// When the lease was last acquired or refreshed.
    pub locked_at: DateTime<Utc>,
    /// Absolute expiry instant.
    pub expires_at: DateTime<Utc>,
}

impl FloorPlanLease {
    /// Whether the lease is still in force at `now`.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    /// Whether `user` holds this lease.
    pub fn is_held_by(&self, user: UserId) -> bool {
        self.user_id == user
    }
}
