//! In-memory store using a Tokio mutex for single-node deployments and tests.
//!
//! All six store traits are implemented on one [`MemoryStore`]. Each trait
//! method runs under a single guard on the shared state, which gives it the
//! same all-or-nothing behavior the Postgres repositories get from a
//! transaction.

mod floor_plan;
mod organization;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use planner_core::types::{FloorPlanId, OrganizationId, UserId};
use planner_entity::floor_plan::{CollectionItem, EntityCollection, FloorPlan, FloorPlanLease};
use planner_entity::organization::{Invitation, Membership, Organization, Role};

/// Tables of the in-memory store.
#[derive(Debug, Default)]
struct MemoryState {
    organizations: HashMap<OrganizationId, Organization>,
    memberships: HashMap<(OrganizationId, UserId), Membership>,
    /// Keyed by token.
    invitations: HashMap<String, Invitation>,
    floor_plans: HashMap<FloorPlanId, FloorPlan>,
    leases: HashMap<FloorPlanId, FloorPlanLease>,
    /// Items in submission order.
    collections: HashMap<(FloorPlanId, EntityCollection), Vec<CollectionItem>>,
}

impl MemoryState {
    fn owner_count(&self, organization: OrganizationId) -> usize {
        self.memberships
            .values()
            .filter(|m| m.organization_id == organization && m.role == Role::Owner)
            .count()
    }

    fn remove_plan_children(&mut self, plan: FloorPlanId) {
        self.leases.remove(&plan);
        for collection in EntityCollection::ALL {
            self.collections.remove(&(plan, collection));
        }
    }
}

/// Process-local implementation of every store trait.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    async fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().await
    }
}

#[cfg(test)]
mod tests;
