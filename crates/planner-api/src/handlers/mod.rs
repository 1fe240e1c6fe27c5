//! Route handlers organized by domain.

pub mod floor_plan;
pub mod health;
pub mod invitation;
pub mod lock;
pub mod member;
pub mod organization;
