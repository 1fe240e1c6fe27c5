//! # planner-entity
//!
//! Domain entity models. Every struct here is either a database row or a
//! domain value object. Row types additionally derive `sqlx::FromRow`.
//! JSON field names are camelCase to match the editor client.

pub mod floor_plan;
pub mod organization;
pub mod principal;

pub use principal::Principal;
