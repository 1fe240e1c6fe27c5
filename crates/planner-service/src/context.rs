//! Request context carrying the authenticated principal.

use chrono::{DateTime, Utc};

use planner_core::types::UserId;
use planner_entity::Principal;

/// Context for the current authenticated request.
///
/// Built by the auth extractor and passed into service methods so every
/// operation knows who is acting and uses one consistent clock reading.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The verified caller.
    pub principal: Principal,
    /// When the request was received. Lease expiry is evaluated against this.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a context stamped with the current time.
    pub fn new(principal: Principal) -> Self {
        Self::at(principal, Utc::now())
    }

    /// Creates a context with an explicit clock reading.
    pub fn at(principal: Principal, request_time: DateTime<Utc>) -> Self {
        Self {
            principal,
            request_time,
        }
    }

    /// The caller's id.
    pub fn user_id(&self) -> UserId {
        self.principal.id
    }
}
