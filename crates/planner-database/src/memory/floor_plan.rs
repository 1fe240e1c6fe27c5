//! Floor plan, collection, and lease stores in memory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use planner_core::error::AppError;
use planner_core::result::AppResult;
use planner_core::types::{FloorPlanId, OrganizationId, UserId};
use planner_entity::Principal;
use planner_entity::floor_plan::{
    CollectionBatch, EntityCollection, FloorPlan, FloorPlanLease, FloorPlanSummary, NewFloorPlan,
};

use super::MemoryStore;
use crate::store::{CollectionStore, FloorPlanStore, LeaseStore};

#[async_trait]
impl FloorPlanStore for MemoryStore {
    async fn list_visible(&self, user: UserId) -> AppResult<Vec<FloorPlanSummary>> {
        let state = self.lock().await;
        let mut plans: Vec<FloorPlanSummary> = state
            .floor_plans
            .values()
            .filter(|plan| {
                plan.user_id == user
                    || plan
                        .organization_id
                        .is_some_and(|org| state.memberships.contains_key(&(org, user)))
            })
            .map(|plan| FloorPlanSummary {
                plan: plan.clone(),
                organization_name: plan
                    .organization_id
                    .and_then(|org| state.organizations.get(&org))
                    .map(|org| org.name.clone()),
                is_personal: plan.is_personal(),
            })
            .collect();
        plans.sort_by(|a, b| b.plan.updated_at.cmp(&a.plan.updated_at));
        Ok(plans)
    }

    async fn create(&self, plan: NewFloorPlan) -> AppResult<FloorPlan> {
        let mut state = self.lock().await;
        if let Some(org) = plan.organization_id {
            if !state.organizations.contains_key(&org) {
                return Err(AppError::not_found("Organization not found"));
            }
        }
        let stored = FloorPlan {
            id: FloorPlanId::new(),
            user_id: plan.user_id,
            name: plan.name,
            organization_id: plan.organization_id,
            created_at: plan.created_at,
            updated_at: plan.created_at,
        };
        state.floor_plans.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find(&self, id: FloorPlanId) -> AppResult<Option<FloorPlan>> {
        Ok(self.lock().await.floor_plans.get(&id).cloned())
    }

    async fn rename(
        &self,
        id: FloorPlanId,
        name: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<FloorPlan>> {
        let mut state = self.lock().await;
        Ok(state.floor_plans.get_mut(&id).map(|plan| {
            plan.name = name.to_string();
            plan.updated_at = now;
            plan.clone()
        }))
    }

    async fn delete(&self, id: FloorPlanId) -> AppResult<bool> {
        let mut state = self.lock().await;
        if state.floor_plans.remove(&id).is_none() {
            return Ok(false);
        }
        state.remove_plan_children(id);
        Ok(true)
    }

    async fn set_organization(
        &self,
        id: FloorPlanId,
        organization: Option<OrganizationId>,
        now: DateTime<Utc>,
    ) -> AppResult<Option<FloorPlan>> {
        let mut state = self.lock().await;
        if let Some(org) = organization {
            if !state.organizations.contains_key(&org) {
                return Err(AppError::not_found("Organization not found"));
            }
        }
        Ok(state.floor_plans.get_mut(&id).map(|plan| {
            plan.organization_id = organization;
            plan.updated_at = now;
            plan.clone()
        }))
    }
}

#[async_trait]
impl CollectionStore for MemoryStore {
    async fn load(
        &self,
        plan: FloorPlanId,
        collection: EntityCollection,
    ) -> AppResult<Vec<serde_json::Value>> {
        let state = self.lock().await;
        Ok(state
            .collections
            .get(&(plan, collection))
            .map(|items| items.iter().map(|item| item.data.clone()).collect())
            .unwrap_or_default())
    }

    async fn replace_all(
        &self,
        plan: FloorPlanId,
        batches: &[CollectionBatch],
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut state = self.lock().await;
        if !state.floor_plans.contains_key(&plan) {
            return Err(AppError::not_found("Floor plan not found"));
        }
        for batch in batches {
            state
                .collections
                .insert((plan, batch.collection), batch.items.clone());
        }
        if let Some(stored) = state.floor_plans.get_mut(&plan) {
            stored.updated_at = now;
        }
        Ok(())
    }
}

#[async_trait]
impl LeaseStore for MemoryStore {
    async fn find_active(
        &self,
        plan: FloorPlanId,
        now: DateTime<Utc>,
    ) -> AppResult<Option<FloorPlanLease>> {
        let state = self.lock().await;
        Ok(state
            .leases
            .get(&plan)
            .filter(|lease| lease.is_active(now))
            .cloned())
    }

    async fn acquire(
        &self,
        plan: FloorPlanId,
        holder: &Principal,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Option<FloorPlanLease>> {
        let mut state = self.lock().await;
        if let Some(existing) = state.leases.get(&plan) {
            if !existing.is_held_by(holder.id) && existing.is_active(now) {
                return Ok(None);
            }
        }
        let lease = FloorPlanLease {
            floor_plan_id: plan,
            user_id: holder.id,
            user_email: holder.email.clone(),
            locked_at: now,
            expires_at,
        };
        state.leases.insert(plan, lease.clone());
        Ok(Some(lease))
    }

    async fn refresh(
        &self,
        plan: FloorPlanId,
        holder: UserId,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Option<FloorPlanLease>> {
        let mut state = self.lock().await;
        Ok(state
            .leases
            .get_mut(&plan)
            .filter(|lease| lease.is_held_by(holder) && lease.is_active(now))
            .map(|lease| {
                lease.locked_at = now;
                lease.expires_at = expires_at;
                lease.clone()
            }))
    }

    async fn release(&self, plan: FloorPlanId, holder: UserId) -> AppResult<bool> {
        let mut state = self.lock().await;
        let owned = state
            .leases
            .get(&plan)
            .is_some_and(|lease| lease.is_held_by(holder));
        if owned {
            state.leases.remove(&plan);
        }
        Ok(owned)
    }
}
