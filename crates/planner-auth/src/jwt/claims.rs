//! Claims carried by identity service tokens.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use planner_core::types::UserId;
use planner_entity::Principal;

/// Token payload issued by the identity service.
///
/// Any role claim the issuer adds is ignored; roles come from organization
/// membership, looked up per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's stable identifier.
    pub sub: Uuid,
    /// Email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Expiration (Unix timestamp, seconds).
    pub exp: i64,
    /// Issued at (Unix timestamp, seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

impl Claims {
    /// Convert verified claims into the caller's identity.
    pub fn into_principal(self) -> Principal {
        Principal {
            id: UserId::from_uuid(self.sub),
            email: self.email.filter(|e| !e.is_empty()),
            display_name: self.name.filter(|n| !n.is_empty()),
        }
    }
}
