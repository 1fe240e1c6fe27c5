//! Lease lock manager: one editor per floor plan at a time.
//!
//! A lease is held until it is released or its expiry passes. Expiry is
//! evaluated lazily against the request time; there is no sweeper.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use planner_auth::AuthorizationEngine;
use planner_core::error::AppError;
use planner_core::result::AppResult;
use planner_core::types::FloorPlanId;
use planner_database::store::LeaseStore;
use planner_entity::floor_plan::FloorPlanLease;

use crate::context::RequestContext;

/// Grants, refreshes, releases, and reports edit leases.
#[derive(Debug, Clone)]
pub struct LeaseService {
    leases: Arc<dyn LeaseStore>,
    authz: AuthorizationEngine,
    duration: Duration,
}

impl LeaseService {
    /// Create a lease service granting leases of `duration`.
    pub fn new(leases: Arc<dyn LeaseStore>, authz: AuthorizationEngine, duration: Duration) -> Self {
        Self {
            leases,
            authz,
            duration,
        }
    }

    /// Acquire the lease, or extend it when the caller already holds it.
    ///
    /// Fails with a conflict carrying the current holder when another
    /// principal holds an unexpired lease.
    pub async fn acquire_or_refresh(
        &self,
        ctx: &RequestContext,
        plan: FloorPlanId,
    ) -> AppResult<FloorPlanLease> {
        self.authz.require_edit(ctx.user_id(), plan).await?;
        let now = ctx.request_time;

        if let Some(existing) = self.leases.find_active(plan, now).await? {
            if !existing.is_held_by(ctx.user_id()) {
                return Err(held_by_other(existing));
            }
        }

        // The conditional upsert decides any race the read above missed.
        match self
            .leases
            .acquire(plan, &ctx.principal, now, now + self.duration)
            .await?
        {
            Some(lease) => {
                info!(%plan, user = %ctx.user_id(), expires_at = %lease.expires_at, "Lease acquired");
                Ok(lease)
            }
            None => match self.leases.find_active(plan, now).await? {
                Some(winner) => Err(held_by_other(winner)),
                None => Err(AppError::conflict(
                    "Floor plan is being locked by another user",
                )),
            },
        }
    }

    /// Extend a lease the caller holds. A lease that expired, was released,
    /// or is held by someone else is reported as not found.
    pub async fn refresh(
        &self,
        ctx: &RequestContext,
        plan: FloorPlanId,
    ) -> AppResult<FloorPlanLease> {
        self.authz.require_edit(ctx.user_id(), plan).await?;
        let now = ctx.request_time;

        let lease = self
            .leases
            .refresh(plan, ctx.user_id(), now, now + self.duration)
            .await?
            .ok_or_else(|| AppError::not_found("Lock not found or not held by you"))?;
        debug!(%plan, user = %ctx.user_id(), expires_at = %lease.expires_at, "Lease refreshed");
        Ok(lease)
    }

    /// Release a lease the caller holds.
    pub async fn release(&self, ctx: &RequestContext, plan: FloorPlanId) -> AppResult<()> {
        if !self.leases.release(plan, ctx.user_id()).await? {
            return Err(AppError::not_found("Lock not found or not held by you"));
        }
        info!(%plan, user = %ctx.user_id(), "Lease released");
        Ok(())
    }

    /// Current lease on a plan the caller can view.
    pub async fn status(
        &self,
        ctx: &RequestContext,
        plan: FloorPlanId,
    ) -> AppResult<Option<FloorPlanLease>> {
        self.authz.require_view(ctx.user_id(), plan).await?;
        self.leases.find_active(plan, ctx.request_time).await
    }

    /// Current lease without an access check, for callers that already did one.
    pub async fn active(
        &self,
        plan: FloorPlanId,
        now: DateTime<Utc>,
    ) -> AppResult<Option<FloorPlanLease>> {
        self.leases.find_active(plan, now).await
    }
}

/// Conflict naming the principal who holds the lease.
pub fn held_by_other(lease: FloorPlanLease) -> AppError {
    let holder = lease
        .user_email
        .clone()
        .unwrap_or_else(|| lease.user_id.to_string());
    AppError::conflict(format!("Floor plan is locked by {holder}"))
        .with_details(serde_json::json!({ "lock": lease }))
}
