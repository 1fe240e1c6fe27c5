//! Organization, membership, and invitation stores in memory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use planner_core::result::AppResult;
use planner_core::types::{InvitationId, OrganizationId, UserId};
use planner_entity::Principal;
use planner_entity::organization::{
    Invitation, InvitationAcceptance, Membership, MembershipChange, NewInvitation, Organization,
    OrganizationWithRole, Role,
};

use super::MemoryStore;
use crate::store::{InvitationStore, MembershipStore, OrganizationStore};

#[async_trait]
impl OrganizationStore for MemoryStore {
    async fn list_for_user(&self, user: UserId) -> AppResult<Vec<OrganizationWithRole>> {
        let state = self.lock().await;
        let mut result: Vec<OrganizationWithRole> = state
            .memberships
            .values()
            .filter(|m| m.user_id == user)
            .filter_map(|m| {
                state
                    .organizations
                    .get(&m.organization_id)
                    .map(|org| OrganizationWithRole {
                        organization: org.clone(),
                        role: m.role,
                    })
            })
            .collect();
        result.sort_by(|a, b| a.organization.name.cmp(&b.organization.name));
        Ok(result)
    }

    async fn create_with_owner(
        &self,
        name: &str,
        owner: &Principal,
        now: DateTime<Utc>,
    ) -> AppResult<Organization> {
        let mut state = self.lock().await;
        let organization = Organization {
            id: OrganizationId::new(),
            name: name.to_string(),
            created_by: owner.id,
            created_at: now,
            updated_at: now,
        };
        state
            .organizations
            .insert(organization.id, organization.clone());
        state.memberships.insert(
            (organization.id, owner.id),
            Membership {
                organization_id: organization.id,
                user_id: owner.id,
                email: owner.email.clone(),
                role: Role::Owner,
                joined_at: now,
            },
        );
        Ok(organization)
    }

    async fn find(&self, id: OrganizationId) -> AppResult<Option<Organization>> {
        Ok(self.lock().await.organizations.get(&id).cloned())
    }

    async fn rename(
        &self,
        id: OrganizationId,
        name: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Organization>> {
        let mut state = self.lock().await;
        Ok(state.organizations.get_mut(&id).map(|org| {
            org.name = name.to_string();
            org.updated_at = now;
            org.clone()
        }))
    }

    async fn delete_detaching(&self, id: OrganizationId, now: DateTime<Utc>) -> AppResult<bool> {
        let mut state = self.lock().await;
        if state.organizations.remove(&id).is_none() {
            return Ok(false);
        }
        for plan in state.floor_plans.values_mut() {
            if plan.organization_id == Some(id) {
                plan.organization_id = None;
                plan.updated_at = now;
            }
        }
        state.memberships.retain(|(org, _), _| *org != id);
        state.invitations.retain(|_, inv| inv.organization_id != id);
        Ok(true)
    }
}

#[async_trait]
impl MembershipStore for MemoryStore {
    async fn role_of(
        &self,
        organization: OrganizationId,
        user: UserId,
    ) -> AppResult<Option<Role>> {
        Ok(self
            .lock()
            .await
            .memberships
            .get(&(organization, user))
            .map(|m| m.role))
    }

    async fn list_members(&self, organization: OrganizationId) -> AppResult<Vec<Membership>> {
        let state = self.lock().await;
        let mut members: Vec<Membership> = state
            .memberships
            .values()
            .filter(|m| m.organization_id == organization)
            .cloned()
            .collect();
        members.sort_by(|a, b| {
            a.joined_at
                .cmp(&b.joined_at)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        Ok(members)
    }

    async fn update_role(
        &self,
        organization: OrganizationId,
        user: UserId,
        role: Role,
        actor: Role,
    ) -> AppResult<MembershipChange> {
        let mut state = self.lock().await;
        let owners = state.owner_count(organization);
        let Some(current) = state.memberships.get_mut(&(organization, user)) else {
            return Ok(MembershipChange::NotFound);
        };
        if !actor.may_reassign(current.role, role) {
            return Ok(MembershipChange::Forbidden);
        }
        if current.role == Role::Owner && role != Role::Owner && owners <= 1 {
            return Ok(MembershipChange::LastOwner);
        }
        current.role = role;
        Ok(MembershipChange::Applied(current.clone()))
    }

    async fn remove(
        &self,
        organization: OrganizationId,
        user: UserId,
        actor: Role,
    ) -> AppResult<MembershipChange> {
        let mut state = self.lock().await;
        let owners = state.owner_count(organization);
        let Some(current) = state.memberships.get(&(organization, user)) else {
            return Ok(MembershipChange::NotFound);
        };
        if !actor.may_remove(current.role) {
            return Ok(MembershipChange::Forbidden);
        }
        if current.role == Role::Owner && owners <= 1 {
            return Ok(MembershipChange::LastOwner);
        }
        match state.memberships.remove(&(organization, user)) {
            Some(removed) => Ok(MembershipChange::Applied(removed)),
            None => Ok(MembershipChange::NotFound),
        }
    }
}

#[async_trait]
impl InvitationStore for MemoryStore {
    async fn create(&self, invitation: NewInvitation) -> AppResult<Invitation> {
        let mut state = self.lock().await;
        let stored = Invitation {
            id: InvitationId::new(),
            organization_id: invitation.organization_id,
            email: invitation.email,
            role: invitation.role,
            token: invitation.token,
            invited_by: invitation.invited_by,
            created_at: invitation.created_at,
            expires_at: invitation.expires_at,
        };
        state.invitations.insert(stored.token.clone(), stored.clone());
        Ok(stored)
    }

    async fn accept(
        &self,
        token: &str,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> AppResult<InvitationAcceptance> {
        let mut state = self.lock().await;
        let Some(invitation) = state.invitations.remove(token) else {
            return Ok(InvitationAcceptance::NotFound);
        };
        if invitation.is_expired(now) {
            return Ok(InvitationAcceptance::Expired);
        }

        let key = (invitation.organization_id, principal.id);
        if let Some(existing) = state.memberships.get(&key) {
            return Ok(InvitationAcceptance::AlreadyMember(existing.clone()));
        }
        let membership = Membership {
            organization_id: invitation.organization_id,
            user_id: principal.id,
            email: principal.email.clone(),
            role: invitation.role,
            joined_at: now,
        };
        state.memberships.insert(key, membership.clone());
        Ok(InvitationAcceptance::Joined(membership))
    }
}
