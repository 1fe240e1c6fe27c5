//! Organization lifecycle.

use std::sync::Arc;

use tracing::info;

use planner_auth::AuthorizationEngine;
use planner_core::error::AppError;
use planner_core::result::AppResult;
use planner_core::types::OrganizationId;
use planner_database::store::OrganizationStore;
use planner_entity::organization::{Organization, OrganizationWithRole};

use crate::context::RequestContext;

/// Create, read, rename, and delete organizations.
#[derive(Debug, Clone)]
pub struct OrganizationService {
    organizations: Arc<dyn OrganizationStore>,
    authz: AuthorizationEngine,
    max_name_length: usize,
}

impl OrganizationService {
    /// Creates a new organization service.
    pub fn new(
        organizations: Arc<dyn OrganizationStore>,
        authz: AuthorizationEngine,
        max_name_length: usize,
    ) -> Self {
        Self {
            organizations,
            authz,
            max_name_length,
        }
    }

    /// Organizations the caller belongs to.
    pub async fn list(&self, ctx: &RequestContext) -> AppResult<Vec<OrganizationWithRole>> {
        self.organizations.list_for_user(ctx.user_id()).await
    }

    /// Create an organization owned by the caller.
    pub async fn create(&self, ctx: &RequestContext, name: &str) -> AppResult<Organization> {
        let name = self.check_name(name)?;
        let organization = self
            .organizations
            .create_with_owner(&name, &ctx.principal, ctx.request_time)
            .await?;
        info!(organization_id = %organization.id, owner = %ctx.user_id(), "Organization created");
        Ok(organization)
    }

    /// An organization the caller belongs to, with their role.
    pub async fn get(
        &self,
        ctx: &RequestContext,
        id: OrganizationId,
    ) -> AppResult<OrganizationWithRole> {
        let role = self.authz.require_member(ctx.user_id(), id).await?;
        let organization = self
            .organizations
            .find(id)
            .await?
            .ok_or_else(|| AppError::not_found("Organization not found"))?;
        Ok(OrganizationWithRole { organization, role })
    }

    /// Rename. Owners and admins only.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: OrganizationId,
        name: &str,
    ) -> AppResult<Organization> {
        let name = self.check_name(name)?;
        self.authz.require_member_manager(ctx.user_id(), id).await?;
        let organization = self
            .organizations
            .rename(id, &name, ctx.request_time)
            .await?
            .ok_or_else(|| AppError::not_found("Organization not found"))?;
        info!(organization_id = %id, "Organization renamed");
        Ok(organization)
    }

    /// Delete, detaching its floor plans. Owners only.
    pub async fn delete(&self, ctx: &RequestContext, id: OrganizationId) -> AppResult<()> {
        self.authz.require_owner(ctx.user_id(), id).await?;
        if !self
            .organizations
            .delete_detaching(id, ctx.request_time)
            .await?
        {
            return Err(AppError::not_found("Organization not found"));
        }
        info!(organization_id = %id, user = %ctx.user_id(), "Organization deleted");
        Ok(())
    }

    fn check_name(&self, name: &str) -> AppResult<String> {
        let name = name.trim();
        let length = name.chars().count();
        if length == 0 || length > self.max_name_length {
            return Err(AppError::validation(format!(
                "Name must be between 1 and {} characters",
                self.max_name_length
            )));
        }
        Ok(name.to_string())
    }
}
