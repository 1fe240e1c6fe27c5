//! # planner-service
//!
//! Business logic service layer for the table planner. Each service
//! orchestrates the store traits and the authorization engine to implement
//! one area of the API.
//!
//! Services follow constructor injection: all dependencies are provided at
//! construction time via `Arc` references.

pub mod context;
pub mod floor_plan;
pub mod organization;

pub use context::RequestContext;
pub use floor_plan::{FloorPlanService, LeaseService, Snapshot, SyncEngine, SyncReport};
pub use organization::{InvitationService, MemberService, OrganizationService};

#[cfg(test)]
mod tests;
