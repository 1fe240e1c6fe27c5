//! # planner-auth
//!
//! Authentication and authorization for the table planner.
//!
//! ## Modules
//!
//! - `keys`: the verification key cache, key sources, and the background refresher
//! - `jwt`: bearer token claims and verification against the cached key
//! - `rbac`: the authorization engine answering view/edit/manage questions

pub mod jwt;
pub mod keys;
pub mod rbac;

#[cfg(test)]
pub(crate) mod test_keys;

pub use jwt::{Claims, TokenVerifier};
pub use keys::{HttpKeySource, KeyCache, KeyRefresher, KeySource, StaticKeySource, VerificationKey};
pub use rbac::{AuthorizationEngine, PlanAccess, resolve_plan_access};
