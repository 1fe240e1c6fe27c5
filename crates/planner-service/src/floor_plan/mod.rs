//! Floor plans: CRUD, sharing, edit leases, and bulk save.

pub mod lease;
pub mod service;
pub mod sync;

pub use lease::LeaseService;
pub use service::{DeleteOutcome, FloorPlanService};
pub use sync::{AssignedId, Snapshot, SyncEngine, SyncReport};
