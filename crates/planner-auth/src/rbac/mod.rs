//! Role-based authorization over organizations and floor plans.

pub mod engine;

pub use engine::{AuthorizationEngine, PlanAccess, resolve_plan_access};
