//! Store traits the services depend on.
//!
//! Each trait has a PostgreSQL repository in [`crate::repositories`] and an
//! implementation on [`crate::MemoryStore`]. Every method that touches more
//! than one row does so atomically: a transaction for Postgres, a single
//! lock guard for memory.
//!
//! Absence is part of the return type (`Option`, `bool`, or an outcome
//! enum) and is never reported through the error channel.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use planner_core::result::AppResult;
use planner_core::types::{FloorPlanId, OrganizationId, UserId};
use planner_entity::Principal;
use planner_entity::floor_plan::{
    CollectionBatch, EntityCollection, FloorPlan, FloorPlanLease, FloorPlanSummary, NewFloorPlan,
};
use planner_entity::organization::{
    Invitation, InvitationAcceptance, Membership, MembershipChange, NewInvitation, Organization,
    OrganizationWithRole, Role,
};

use crate::memory::MemoryStore;
use crate::repositories::{
    CollectionRepository, FloorPlanRepository, InvitationRepository, LeaseRepository,
    MembershipRepository, OrganizationRepository,
};

/// Organizations and their lifecycle.
#[async_trait]
pub trait OrganizationStore: Send + Sync + Debug {
    /// Organizations `user` belongs to, with their role in each.
    async fn list_for_user(&self, user: UserId) -> AppResult<Vec<OrganizationWithRole>>;

    /// Create an organization and make `owner` its first owner.
    async fn create_with_owner(
        &self,
        name: &str,
        owner: &Principal,
        now: DateTime<Utc>,
    ) -> AppResult<Organization>;

    /// Look up an organization.
    async fn find(&self, id: OrganizationId) -> AppResult<Option<Organization>>;

    /// Rename an organization.
    async fn rename(
        &self,
        id: OrganizationId,
        name: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Organization>>;

    /// Detach every floor plan, drop memberships and invitations, then the
    /// organization itself. Returns `false` when it did not exist.
    async fn delete_detaching(&self, id: OrganizationId, now: DateTime<Utc>) -> AppResult<bool>;
}

/// Membership rows and the last-owner guard.
#[async_trait]
pub trait MembershipStore: Send + Sync + Debug {
    /// Current role of `user` in `organization`, read live.
    async fn role_of(&self, organization: OrganizationId, user: UserId)
    -> AppResult<Option<Role>>;

    /// All members of an organization, oldest first.
    async fn list_members(&self, organization: OrganizationId) -> AppResult<Vec<Membership>>;

    /// Change a member's role on behalf of an actor holding `actor`.
    ///
    /// The owner-role rule and the last-owner rule are both checked against
    /// the target's role as read inside the same atomic step as the write.
    async fn update_role(
        &self,
        organization: OrganizationId,
        user: UserId,
        role: Role,
        actor: Role,
    ) -> AppResult<MembershipChange>;

    /// Remove a member on behalf of an actor holding `actor`, unless the
    /// target is an owner the actor may not remove or the last owner.
    async fn remove(
        &self,
        organization: OrganizationId,
        user: UserId,
        actor: Role,
    ) -> AppResult<MembershipChange>;
}

/// Single-use organization invitations.
#[async_trait]
pub trait InvitationStore: Send + Sync + Debug {
    /// Persist a new invitation.
    async fn create(&self, invitation: NewInvitation) -> AppResult<Invitation>;

    /// Consume `token` and create the membership in one atomic step.
    async fn accept(
        &self,
        token: &str,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> AppResult<InvitationAcceptance>;
}

/// Floor plan rows.
#[async_trait]
pub trait FloorPlanStore: Send + Sync + Debug {
    /// Plans `user` created plus plans shared to any of their organizations.
    async fn list_visible(&self, user: UserId) -> AppResult<Vec<FloorPlanSummary>>;

    /// Insert a new plan.
    async fn create(&self, plan: NewFloorPlan) -> AppResult<FloorPlan>;

    /// Look up a plan.
    async fn find(&self, id: FloorPlanId) -> AppResult<Option<FloorPlan>>;

    /// Rename a plan.
    async fn rename(
        &self,
        id: FloorPlanId,
        name: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<FloorPlan>>;

    /// Hard-delete a plan with its lease and content.
    async fn delete(&self, id: FloorPlanId) -> AppResult<bool>;

    /// Share to an organization, or make personal again with `None`.
    async fn set_organization(
        &self,
        id: FloorPlanId,
        organization: Option<OrganizationId>,
        now: DateTime<Utc>,
    ) -> AppResult<Option<FloorPlan>>;
}

/// Sub-entity collections of a floor plan.
#[async_trait]
pub trait CollectionStore: Send + Sync + Debug {
    /// Stored payloads of one collection, in submission order.
    async fn load(
        &self,
        plan: FloorPlanId,
        collection: EntityCollection,
    ) -> AppResult<Vec<serde_json::Value>>;

    /// Make each collection in `batches` exactly match its items, then bump
    /// the plan's `updated_at`, all or nothing. Collections not named in
    /// `batches` are left alone.
    async fn replace_all(
        &self,
        plan: FloorPlanId,
        batches: &[CollectionBatch],
        now: DateTime<Utc>,
    ) -> AppResult<()>;
}

/// Edit leases. Expiry is evaluated lazily against the `now` passed in.
#[async_trait]
pub trait LeaseStore: Send + Sync + Debug {
    /// The lease on `plan` if one exists and has not expired.
    async fn find_active(
        &self,
        plan: FloorPlanId,
        now: DateTime<Utc>,
    ) -> AppResult<Option<FloorPlanLease>>;

    /// Insert a lease, or overwrite the existing row only if `holder`
    /// already holds it or it has expired. `None` means someone else holds
    /// an active lease.
    async fn acquire(
        &self,
        plan: FloorPlanId,
        holder: &Principal,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Option<FloorPlanLease>>;

    /// Extend an active lease held by `holder`. `None` when there is no such
    /// lease.
    async fn refresh(
        &self,
        plan: FloorPlanId,
        holder: UserId,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Option<FloorPlanLease>>;

    /// Delete the lease row if `holder` owns it.
    async fn release(&self, plan: FloorPlanId, holder: UserId) -> AppResult<bool>;
}

/// Every store the services need, behind trait objects.
#[derive(Debug, Clone)]
pub struct Stores {
    /// Organizations.
    pub organizations: Arc<dyn OrganizationStore>,
    /// Memberships.
    pub memberships: Arc<dyn MembershipStore>,
    /// Invitations.
    pub invitations: Arc<dyn InvitationStore>,
    /// Floor plans.
    pub floor_plans: Arc<dyn FloorPlanStore>,
    /// Entity collections.
    pub collections: Arc<dyn CollectionStore>,
    /// Edit leases.
    pub leases: Arc<dyn LeaseStore>,
}

impl Stores {
    /// Stores backed by PostgreSQL repositories sharing one pool.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            organizations: Arc::new(OrganizationRepository::new(pool.clone())),
            memberships: Arc::new(MembershipRepository::new(pool.clone())),
            invitations: Arc::new(InvitationRepository::new(pool.clone())),
            floor_plans: Arc::new(FloorPlanRepository::new(pool.clone())),
            collections: Arc::new(CollectionRepository::new(pool.clone())),
            leases: Arc::new(LeaseRepository::new(pool)),
        }
    }

    /// Stores backed by one shared in-memory state.
    pub fn memory(store: MemoryStore) -> Self {
        let store = Arc::new(store);
        Self {
            organizations: store.clone(),
            memberships: store.clone(),
            invitations: store.clone(),
            floor_plans: store.clone(),
            collections: store.clone(),
            leases: store,
        }
    }
}
