//! Authorization engine.
//!
//! Every decision is a fresh read of membership state; nothing is cached,
//! so a role change takes effect on the caller's next request.

use std::sync::Arc;

use tracing::debug;

use planner_core::error::AppError;
use planner_core::result::AppResult;
use planner_core::types::{FloorPlanId, OrganizationId, UserId};
use planner_database::store::{FloorPlanStore, MembershipStore};
use planner_entity::floor_plan::FloorPlan;
use planner_entity::organization::Role;

/// What a principal may do with one floor plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PlanAccess {
    /// No access at all.
    None,
    /// Read-only.
    View,
    /// Read and write.
    Edit,
}

impl PlanAccess {
    /// Whether the plan may be read.
    pub fn can_view(self) -> bool {
        self >= Self::View
    }

    /// Whether the plan may be modified.
    pub fn can_edit(self) -> bool {
        self == Self::Edit
    }
}

/// Resolve access to `plan` for `user`, given the user's role in the plan's
/// organization (ignored for personal plans).
pub fn resolve_plan_access(user: UserId, plan: &FloorPlan, role: Option<Role>) -> PlanAccess {
    if plan.is_created_by(user) {
        return PlanAccess::Edit;
    }
    if plan.is_personal() {
        return PlanAccess::None;
    }
    match role {
        Some(role) if role.can_edit() => PlanAccess::Edit,
        Some(_) => PlanAccess::View,
        None => PlanAccess::None,
    }
}

/// Answers capability questions for a principal against stored state.
#[derive(Debug, Clone)]
pub struct AuthorizationEngine {
    memberships: Arc<dyn MembershipStore>,
    floor_plans: Arc<dyn FloorPlanStore>,
}

impl AuthorizationEngine {
    /// Create an engine reading from the given stores.
    pub fn new(memberships: Arc<dyn MembershipStore>, floor_plans: Arc<dyn FloorPlanStore>) -> Self {
        Self {
            memberships,
            floor_plans,
        }
    }

    /// The user's role in an organization, if any.
    pub async fn role_in_organization(
        &self,
        user: UserId,
        organization: OrganizationId,
    ) -> AppResult<Option<Role>> {
        self.memberships.role_of(organization, user).await
    }

    /// Any role at all.
    pub async fn can_access_organization(
        &self,
        user: UserId,
        organization: OrganizationId,
    ) -> AppResult<bool> {
        Ok(self.role_in_organization(user, organization).await?.is_some())
    }

    /// Owner or admin.
    pub async fn can_manage_members(
        &self,
        user: UserId,
        organization: OrganizationId,
    ) -> AppResult<bool> {
        Ok(self
            .role_in_organization(user, organization)
            .await?
            .is_some_and(|r| r.can_manage_members()))
    }

    /// Sharing into an organization only requires membership.
    pub async fn can_share_to_organization(
        &self,
        user: UserId,
        organization: OrganizationId,
    ) -> AppResult<bool> {
        self.can_access_organization(user, organization).await
    }

    /// Access to an already loaded plan.
    pub async fn plan_access(&self, user: UserId, plan: &FloorPlan) -> AppResult<PlanAccess> {
        // Creators and personal plans never need a membership read.
        let role = match plan.organization_id {
            Some(org) if !plan.is_created_by(user) => self.role_in_organization(user, org).await?,
            _ => None,
        };
        Ok(resolve_plan_access(user, plan, role))
    }

    /// Whether `user` may read the plan. A missing plan is simply not viewable.
    pub async fn can_view_floor_plan(&self, user: UserId, plan: FloorPlanId) -> AppResult<bool> {
        Ok(self.access_by_id(user, plan).await?.1.can_view())
    }

    /// Whether `user` may modify the plan.
    pub async fn can_edit_floor_plan(&self, user: UserId, plan: FloorPlanId) -> AppResult<bool> {
        Ok(self.access_by_id(user, plan).await?.1.can_edit())
    }

    /// Load the plan if `user` may read it.
    ///
    /// A missing plan is reported as forbidden so its existence is not
    /// revealed.
    pub async fn require_view(&self, user: UserId, plan: FloorPlanId) -> AppResult<FloorPlan> {
        match self.access_by_id(user, plan).await? {
            (Some(found), access) if access.can_view() => Ok(found),
            _ => {
                debug!(%user, %plan, "View denied");
                Err(AppError::authorization(
                    "You do not have access to this floor plan",
                ))
            }
        }
    }

    /// Load the plan if `user` may modify it.
    pub async fn require_edit(&self, user: UserId, plan: FloorPlanId) -> AppResult<FloorPlan> {
        match self.access_by_id(user, plan).await? {
            (Some(found), access) if access.can_edit() => Ok(found),
            _ => {
                debug!(%user, %plan, "Edit denied");
                Err(AppError::authorization(
                    "You do not have permission to edit this floor plan",
                ))
            }
        }
    }

    /// The user's role, or forbidden when they are not a member.
    pub async fn require_member(
        &self,
        user: UserId,
        organization: OrganizationId,
    ) -> AppResult<Role> {
        self.role_in_organization(user, organization)
            .await?
            .ok_or_else(|| AppError::authorization("You are not a member of this organization"))
    }

    /// The user's role, or forbidden unless it is owner or admin.
    pub async fn require_member_manager(
        &self,
        user: UserId,
        organization: OrganizationId,
    ) -> AppResult<Role> {
        let role = self.require_member(user, organization).await?;
        if !role.can_manage_members() {
            return Err(AppError::authorization(
                "Only owners and admins can manage members",
            ));
        }
        Ok(role)
    }

    /// The user's role, or forbidden unless it is owner.
    pub async fn require_owner(
        &self,
        user: UserId,
        organization: OrganizationId,
    ) -> AppResult<Role> {
        let role = self.require_member(user, organization).await?;
        if role != Role::Owner {
            return Err(AppError::authorization("Only owners can do this"));
        }
        Ok(role)
    }

    async fn access_by_id(
        &self,
        user: UserId,
        plan: FloorPlanId,
    ) -> AppResult<(Option<FloorPlan>, PlanAccess)> {
        let Some(found) = self.floor_plans.find(plan).await? else {
            return Ok((None, PlanAccess::None));
        };
        let access = self.plan_access(user, &found).await?;
        Ok((Some(found), access))
    }
}
