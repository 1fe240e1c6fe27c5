//! The authenticated caller.

use serde::{Deserialize, Serialize};

use planner_core::types::UserId;

/// Identity asserted by a verified bearer token.
///
/// Only `id` is trusted for authorization decisions. Email and display
/// name are informational and never used to resolve access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    /// Stable subject identifier.
    pub id: UserId,
    /// Email claim, if present.
    pub email: Option<String>,
    /// Display name claim, if present.
    pub display_name: Option<String>,
}

impl Principal {
    /// A principal with only a subject identifier.
    pub fn anonymous(id: UserId) -> Self {
        Self {
            id,
            email: None,
            display_name: None,
        }
    }
}
