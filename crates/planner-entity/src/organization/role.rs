//! Organization role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of a principal inside one organization.
///
/// Ordered by privilege: Owner > Admin > Member > Viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "org_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full control, including deleting the organization.
    Owner,
    /// Manages members and organization settings.
    Admin,
    /// Edits shared floor plans.
    Member,
    /// Read-only access to shared floor plans.
    Viewer,
}

impl Role {
    /// All roles, most privileged first.
    pub const ALL: [Role; 4] = [Role::Owner, Role::Admin, Role::Member, Role::Viewer];

    /// Return the privilege level (higher = more privileged).
    pub fn privilege_level(&self) -> u8 {
        match self {
            Self::Owner => 4,
            Self::Admin => 3,
            Self::Member => 2,
            Self::Viewer => 1,
        }
    }

    /// Owner or admin.
    pub fn can_manage_members(&self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }

    /// Anything but viewer.
    pub fn can_edit(&self) -> bool {
        !matches!(self, Self::Viewer)
    }

    /// Whether this role may be handed out through an invitation.
    pub fn is_invitable(&self) -> bool {
        !matches!(self, Self::Owner)
    }

    /// Whether an actor with this role may move a member from `from` to `to`.
    /// Granting or revoking the owner role is reserved to owners.
    pub fn may_reassign(&self, from: Role, to: Role) -> bool {
        *self == Self::Owner || (from != Self::Owner && to != Self::Owner)
    }

    /// Whether an actor with this role may remove a member holding `target`.
    pub fn may_remove(&self, target: Role) -> bool {
        *self == Self::Owner || target != Self::Owner
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Member => "member",
            Self::Viewer => "viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = planner_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "owner" => Ok(Self::Owner),
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            "viewer" => Ok(Self::Viewer),
            _ => Err(planner_core::AppError::validation(format!(
                "Invalid role: '{s}'. Expected one of: owner, admin, member, viewer"
            ))),
        }
    }
}
