//! Organizations, their members, and invitations.

pub mod invitation;
pub mod member;
pub mod service;

pub use invitation::{AcceptedInvitation, InvitationService};
pub use member::MemberService;
pub use service::OrganizationService;
