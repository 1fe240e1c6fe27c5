//! Organizations, memberships, roles, and invitations.

pub mod invitation;
pub mod membership;
pub mod model;
pub mod role;

pub use invitation::{Invitation, InvitationAcceptance, NewInvitation};
pub use membership::{Membership, MembershipChange};
pub use model::{Organization, OrganizationWithRole};
pub use role::Role;
