//! Domain limits for floor plans, leases, and invitations.

use serde::{Deserialize, Serialize};

/// Tunables for the lease lock manager, diff-sync, and organizations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// How long an acquired or refreshed edit lease stays valid.
    #[serde(default = "default_lease_duration")]
    pub lease_duration_minutes: u64,
    /// Ceiling on items per entity collection in one bulk save.
    #[serde(default = "default_max_items")]
    pub max_items_per_collection: usize,
    /// Days until an organization invitation expires.
    #[serde(default = "default_invitation_ttl")]
    pub invitation_ttl_days: i64,
    /// Maximum floor plan name length in characters.
    #[serde(default = "default_max_name_length")]
    pub max_name_length: usize,
    /// Maximum organization name length in characters.
    #[serde(default = "default_max_organization_name_length")]
    pub max_organization_name_length: usize,
}

impl PlannerConfig {
    /// Lease duration as a chrono duration.
    pub fn lease_duration(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.lease_duration_minutes as i64)
    }

    /// Invitation lifetime as a chrono duration.
    pub fn invitation_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.invitation_ttl_days)
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            lease_duration_minutes: default_lease_duration(),
            max_items_per_collection: default_max_items(),
            invitation_ttl_days: default_invitation_ttl(),
            max_name_length: default_max_name_length(),
            max_organization_name_length: default_max_organization_name_length(),
        }
    }
}

fn default_lease_duration() -> u64 {
    15
}

fn default_max_items() -> usize {
    500
}

fn default_invitation_ttl() -> i64 {
    7
}

fn default_max_name_length() -> usize {
    200
}

fn default_max_organization_name_length() -> usize {
    100
}
