//! Invitations: single-use tokens that grant membership.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Serialize;
use tracing::info;
use validator::ValidateEmail;

use planner_auth::AuthorizationEngine;
use planner_core::error::AppError;
use planner_core::result::AppResult;
use planner_core::types::OrganizationId;
use planner_database::store::InvitationStore;
use planner_entity::organization::{
    Invitation, InvitationAcceptance, Membership, NewInvitation, Role,
};

use crate::context::RequestContext;

/// Upper bound on invited email length.
pub const MAX_EMAIL_LENGTH: usize = 255;

/// Outcome of accepting an invitation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptedInvitation {
    /// The caller's membership after acceptance.
    pub membership: Membership,
    /// `true` when the caller was already a member; their role is unchanged.
    pub already_member: bool,
}

/// Issues and redeems invitations.
#[derive(Debug, Clone)]
pub struct InvitationService {
    invitations: Arc<dyn InvitationStore>,
    authz: AuthorizationEngine,
    ttl: chrono::Duration,
}

impl InvitationService {
    /// Creates a new invitation service; invitations live for `ttl`.
    pub fn new(
        invitations: Arc<dyn InvitationStore>,
        authz: AuthorizationEngine,
        ttl: chrono::Duration,
    ) -> Self {
        Self {
            invitations,
            authz,
            ttl,
        }
    }

    /// Invite `email` to join with `role`. Owners and admins only.
    pub async fn invite(
        &self,
        ctx: &RequestContext,
        organization: OrganizationId,
        email: &str,
        role: Role,
    ) -> AppResult<Invitation> {
        let email = validate_email(email)?;
        if !role.is_invitable() {
            return Err(AppError::validation(
                "Role must be one of admin, member, viewer",
            ));
        }
        self.authz
            .require_member_manager(ctx.user_id(), organization)
            .await?;

        let invitation = self
            .invitations
            .create(NewInvitation {
                organization_id: organization,
                email,
                role,
                token: generate_token(),
                invited_by: ctx.user_id(),
                created_at: ctx.request_time,
                expires_at: ctx.request_time + self.ttl,
            })
            .await?;

        info!(
            organization_id = %organization,
            invitation_id = %invitation.id,
            role = %role,
            "Invitation created"
        );
        Ok(invitation)
    }

    /// Redeem `token` for the caller. The token is the capability; the
    /// invited email is not compared with the caller's.
    pub async fn accept(&self, ctx: &RequestContext, token: &str) -> AppResult<AcceptedInvitation> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::validation("Missing invitation token"));
        }

        match self
            .invitations
            .accept(token, &ctx.principal, ctx.request_time)
            .await?
        {
            InvitationAcceptance::Joined(membership) => {
                info!(
                    organization_id = %membership.organization_id,
                    user = %ctx.user_id(),
                    role = %membership.role,
                    "Invitation accepted"
                );
                Ok(AcceptedInvitation {
                    membership,
                    already_member: false,
                })
            }
            InvitationAcceptance::AlreadyMember(membership) => Ok(AcceptedInvitation {
                membership,
                already_member: true,
            }),
            InvitationAcceptance::Expired => Err(AppError::validation("Invitation has expired")),
            InvitationAcceptance::NotFound => Err(AppError::not_found("Invitation not found")),
        }
    }
}

/// 32 random bytes, base64url without padding.
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

fn validate_email(email: &str) -> AppResult<String> {
    let email = email.trim().to_string();
    if email.is_empty() {
        return Err(AppError::validation("Email is required"));
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(AppError::validation(format!(
            "Email must be at most {MAX_EMAIL_LENGTH} characters"
        )));
    }
    if !email.validate_email() {
        return Err(AppError::validation("Invalid email format"));
    }
    Ok(email)
}
