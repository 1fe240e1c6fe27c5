//! Floor plan service.

use std::sync::Arc;

use tracing::info;

use planner_auth::AuthorizationEngine;
use planner_core::error::AppError;
use planner_core::result::AppResult;
use planner_core::types::{FloorPlanId, OrganizationId};
use planner_database::store::{CollectionStore, FloorPlanStore, OrganizationStore};
use planner_entity::floor_plan::{
    EntityCollection, FloorPlan, FloorPlanDetail, FloorPlanSummary, NewFloorPlan,
};

use super::lease::{LeaseService, held_by_other};
use super::sync::{Snapshot, SyncEngine, SyncReport};
use crate::context::RequestContext;

/// Name given to plans created without one.
pub const DEFAULT_PLAN_NAME: &str = "Untitled Floor Plan";

/// What a delete request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// A personal plan was removed with its content.
    Deleted,
    /// A shared plan was detached from its organization and is personal again.
    Detached,
}

/// Floor plan use cases.
#[derive(Debug, Clone)]
pub struct FloorPlanService {
    floor_plans: Arc<dyn FloorPlanStore>,
    collections: Arc<dyn CollectionStore>,
    organizations: Arc<dyn OrganizationStore>,
    authz: AuthorizationEngine,
    leases: LeaseService,
    sync: SyncEngine,
    max_name_length: usize,
}

impl FloorPlanService {
    /// Creates a new floor plan service.
    pub fn new(
        floor_plans: Arc<dyn FloorPlanStore>,
        collections: Arc<dyn CollectionStore>,
        organizations: Arc<dyn OrganizationStore>,
        authz: AuthorizationEngine,
        leases: LeaseService,
        sync: SyncEngine,
        max_name_length: usize,
    ) -> Self {
        Self {
            floor_plans,
            collections,
            organizations,
            authz,
            leases,
            sync,
            max_name_length,
        }
    }

    /// Plans the caller created or can see through an organization.
    pub async fn list(&self, ctx: &RequestContext) -> AppResult<Vec<FloorPlanSummary>> {
        self.floor_plans.list_visible(ctx.user_id()).await
    }

    /// Create a plan, optionally inside an organization the caller can edit in.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        name: Option<String>,
        organization: Option<OrganizationId>,
    ) -> AppResult<FloorPlan> {
        let name = match name.as_deref().map(str::trim) {
            Some(n) if !n.is_empty() => self.check_name(n)?,
            _ => DEFAULT_PLAN_NAME.to_string(),
        };

        if let Some(org) = organization {
            let role = self.authz.role_in_organization(ctx.user_id(), org).await?;
            if !role.is_some_and(|r| r.can_edit()) {
                return Err(AppError::authorization(
                    "You cannot create floor plans in this organization",
                ));
            }
        }

        let plan = self
            .floor_plans
            .create(NewFloorPlan {
                user_id: ctx.user_id(),
                name,
                organization_id: organization,
                created_at: ctx.request_time,
            })
            .await?;

        info!(plan_id = %plan.id, user = %ctx.user_id(), "Floor plan created");
        Ok(plan)
    }

    /// A plan with its content and lock state.
    pub async fn get(&self, ctx: &RequestContext, plan: FloorPlanId) -> AppResult<FloorPlanDetail> {
        let found = self.authz.require_view(ctx.user_id(), plan).await?;

        let tables = self.collections.load(plan, EntityCollection::Tables).await?;
        let guests = self.collections.load(plan, EntityCollection::Guests).await?;
        let labels = self.collections.load(plan, EntityCollection::Labels).await?;
        let lock = self.leases.active(plan, ctx.request_time).await?;
        let organization_name = match found.organization_id {
            Some(org) => self.organizations.find(org).await?.map(|o| o.name),
            None => None,
        };

        Ok(FloorPlanDetail {
            plan: found,
            tables,
            guests,
            labels,
            lock,
            organization_name,
        })
    }

    /// Rename a plan the caller can edit.
    pub async fn rename(
        &self,
        ctx: &RequestContext,
        plan: FloorPlanId,
        name: &str,
    ) -> AppResult<FloorPlan> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Name is required"));
        }
        let name = self.check_name(name)?;
        self.authz.require_edit(ctx.user_id(), plan).await?;

        self.floor_plans
            .rename(plan, &name, ctx.request_time)
            .await?
            .ok_or_else(|| AppError::not_found("Floor plan not found"))
    }

    /// Delete a personal plan, or detach a shared one from its organization.
    ///
    /// A plan the caller cannot see is refused the same way as a missing one.
    pub async fn delete(&self, ctx: &RequestContext, plan: FloorPlanId) -> AppResult<DeleteOutcome> {
        let user = ctx.user_id();
        let found = self.authz.require_view(user, plan).await?;

        match found.organization_id {
            None => {
                if !found.is_created_by(user) {
                    return Err(AppError::authorization(
                        "Only the creator can delete this floor plan",
                    ));
                }
                if !self.floor_plans.delete(plan).await? {
                    return Err(AppError::not_found("Floor plan not found"));
                }
                info!(plan_id = %plan, %user, "Floor plan deleted");
                Ok(DeleteOutcome::Deleted)
            }
            Some(org) => {
                let allowed = found.is_created_by(user)
                    || self
                        .authz
                        .role_in_organization(user, org)
                        .await?
                        .is_some_and(|r| r.can_manage_members());
                if !allowed {
                    return Err(AppError::authorization(
                        "Only the creator or an organization admin can remove this floor plan",
                    ));
                }
                self.floor_plans
                    .set_organization(plan, None, ctx.request_time)
                    .await?
                    .ok_or_else(|| AppError::not_found("Floor plan not found"))?;
                info!(plan_id = %plan, organization_id = %org, %user, "Floor plan detached");
                Ok(DeleteOutcome::Detached)
            }
        }
    }

    /// Replace the plan's tables, guests, and labels with `snapshot`.
    pub async fn bulk_save(
        &self,
        ctx: &RequestContext,
        plan: FloorPlanId,
        snapshot: Snapshot,
    ) -> AppResult<SyncReport> {
        self.sync.check_size(&snapshot)?;
        self.authz.require_edit(ctx.user_id(), plan).await?;

        if let Some(lease) = self.leases.active(plan, ctx.request_time).await? {
            if !lease.is_held_by(ctx.user_id()) {
                return Err(held_by_other(lease));
            }
        }

        let report = self.sync.reconcile(plan, snapshot, ctx.request_time).await?;
        info!(
            plan_id = %plan,
            user = %ctx.user_id(),
            tables = report.tables,
            guests = report.guests,
            labels = report.labels,
            "Floor plan saved"
        );
        Ok(report)
    }

    /// Share a plan the caller created into an organization they belong to.
    pub async fn share(
        &self,
        ctx: &RequestContext,
        plan: FloorPlanId,
        organization: OrganizationId,
    ) -> AppResult<FloorPlan> {
        if organization.is_nil() {
            return Err(AppError::validation("Organization id is required"));
        }
        let found = self.authz.require_view(ctx.user_id(), plan).await?;
        if !found.is_created_by(ctx.user_id()) {
            return Err(AppError::authorization(
                "Only the creator can share this floor plan",
            ));
        }
        if !self
            .authz
            .can_share_to_organization(ctx.user_id(), organization)
            .await?
        {
            return Err(AppError::authorization(
                "You are not a member of this organization",
            ));
        }

        let shared = self
            .floor_plans
            .set_organization(plan, Some(organization), ctx.request_time)
            .await?
            .ok_or_else(|| AppError::not_found("Floor plan not found"))?;
        info!(plan_id = %plan, organization_id = %organization, "Floor plan shared");
        Ok(shared)
    }

    /// Make a shared plan personal again. Creator only.
    pub async fn unshare(&self, ctx: &RequestContext, plan: FloorPlanId) -> AppResult<FloorPlan> {
        let found = self.authz.require_view(ctx.user_id(), plan).await?;
        if !found.is_created_by(ctx.user_id()) {
            return Err(AppError::authorization(
                "Only the creator can unshare this floor plan",
            ));
        }
        if found.is_personal() {
            return Err(AppError::validation("Floor plan is not shared"));
        }

        let personal = self
            .floor_plans
            .set_organization(plan, None, ctx.request_time)
            .await?
            .ok_or_else(|| AppError::not_found("Floor plan not found"))?;
        info!(plan_id = %plan, "Floor plan unshared");
        Ok(personal)
    }

    fn check_name(&self, name: &str) -> AppResult<String> {
        if name.chars().count() > self.max_name_length {
            return Err(AppError::validation(format!(
                "Name must be at most {} characters",
                self.max_name_length
            )));
        }
        Ok(name.to_string())
    }
}

