//! Floor plans, their edit leases, and their sub-entity collections.

pub mod collection;
pub mod lease;
pub mod model;

pub use collection::{CollectionBatch, CollectionItem, EntityCollection};
pub use lease::FloorPlanLease;
pub use model::{FloorPlan, FloorPlanDetail, FloorPlanSummary, NewFloorPlan};
