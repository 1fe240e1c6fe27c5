//! sqlx-backed implementations of the store traits.

pub mod collection;
pub mod floor_plan;
pub mod invitation;
pub mod lease;
pub mod membership;
pub mod organization;

pub use collection::CollectionRepository;
pub use floor_plan::FloorPlanRepository;
pub use invitation::InvitationRepository;
pub use lease::LeaseRepository;
pub use membership::MembershipRepository;
pub use organization::OrganizationRepository;

use planner_core::error::{AppError, ErrorKind};

/// Map a sqlx error into a database `AppError` with context.
pub(crate) fn db_error(message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, message, e)
}

/// Whether the error is a foreign key violation (SQLSTATE 23503).
pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == "23503")
}
