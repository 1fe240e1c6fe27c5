//! Membership management and the last-owner rule.

use std::sync::Arc;

use tracing::info;

use planner_auth::AuthorizationEngine;
use planner_core::error::AppError;
use planner_core::result::AppResult;
use planner_core::types::{OrganizationId, UserId};
use planner_database::store::MembershipStore;
use planner_entity::organization::{Membership, MembershipChange, Role};

use crate::context::RequestContext;

/// Lists, re-roles, and removes organization members.
#[derive(Debug, Clone)]
pub struct MemberService {
    memberships: Arc<dyn MembershipStore>,
    authz: AuthorizationEngine,
}

impl MemberService {
    /// Creates a new member service.
    pub fn new(memberships: Arc<dyn MembershipStore>, authz: AuthorizationEngine) -> Self {
        Self { memberships, authz }
    }

    /// Members of an organization the caller belongs to.
    pub async fn list_members(
        &self,
        ctx: &RequestContext,
        organization: OrganizationId,
    ) -> AppResult<Vec<Membership>> {
        self.authz.require_member(ctx.user_id(), organization).await?;
        self.memberships.list_members(organization).await
    }

    /// Change a member's role.
    ///
    /// Owners and admins may change roles; only an owner may grant or take
    /// away the owner role. The last owner can never be demoted. Both rules
    /// are enforced by the store against the member's role at write time.
    pub async fn update_role(
        &self,
        ctx: &RequestContext,
        organization: OrganizationId,
        member: UserId,
        role: Role,
    ) -> AppResult<Membership> {
        let actor = self
            .authz
            .require_member_manager(ctx.user_id(), organization)
            .await?;

        let change = self
            .memberships
            .update_role(organization, member, role, actor)
            .await?;
        let updated = applied(change, "Only owners can grant or revoke the owner role")?;
        info!(
            organization_id = %organization,
            member = %member,
            to = %role,
            "Member role changed"
        );
        Ok(updated)
    }

    /// Remove a member. Only an owner may remove an owner, and never the last one.
    pub async fn remove_member(
        &self,
        ctx: &RequestContext,
        organization: OrganizationId,
        member: UserId,
    ) -> AppResult<Membership> {
        let actor = self
            .authz
            .require_member_manager(ctx.user_id(), organization)
            .await?;

        let change = self.memberships.remove(organization, member, actor).await?;
        let removed = applied(change, "Only owners can remove an owner")?;
        info!(
            organization_id = %organization,
            member = %member,
            role = %removed.role,
            "Member removed"
        );
        Ok(removed)
    }
}

fn applied(change: MembershipChange, forbidden: &str) -> AppResult<Membership> {
    match change {
        MembershipChange::Applied(membership) => Ok(membership),
        MembershipChange::NotFound => Err(AppError::not_found("Member not found")),
        MembershipChange::Forbidden => Err(AppError::authorization(forbidden)),
        MembershipChange::LastOwner => Err(AppError::validation(
            "An organization must keep at least one owner",
        )),
    }
}
