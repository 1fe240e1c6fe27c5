//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use planner_auth::{AuthorizationEngine, KeyCache, TokenVerifier};
use planner_core::config::AppConfig;
use planner_database::{DatabasePool, Stores};
use planner_service::{
    FloorPlanService, InvitationService, LeaseService, MemberService, OrganizationService,
    SyncEngine,
};

use crate::middleware::rate_limit::RateLimiter;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// PostgreSQL pool; `None` when running on the in-memory store
    pub database: Option<DatabasePool>,

    // ── Auth ─────────────────────────────────────────────────
    /// Verification key cache, shared with the background refresher
    pub keys: Arc<KeyCache>,
    /// Bearer token verifier
    pub verifier: Arc<TokenVerifier>,
    /// Per-principal request limiter
    pub rate_limiter: RateLimiter,

    // ── Services ─────────────────────────────────────────────
    /// Floor plan CRUD, sharing, and bulk save
    pub floor_plans: Arc<FloorPlanService>,
    /// Edit leases
    pub leases: Arc<LeaseService>,
    /// Organizations
    pub organizations: Arc<OrganizationService>,
    /// Organization members
    pub members: Arc<MemberService>,
    /// Invitations
    pub invitations: Arc<InvitationService>,
}

impl AppState {
    /// Wire services over `stores`.
    pub fn new(
        config: AppConfig,
        stores: Stores,
        keys: Arc<KeyCache>,
        database: Option<DatabasePool>,
    ) -> Self {
        let planner = &config.planner;
        let authz = AuthorizationEngine::new(
            Arc::clone(&stores.memberships),
            Arc::clone(&stores.floor_plans),
        );

        let leases = LeaseService::new(
            Arc::clone(&stores.leases),
            authz.clone(),
            planner.lease_duration(),
        );
        let sync = SyncEngine::new(
            Arc::clone(&stores.collections),
            planner.max_items_per_collection,
        );
        let floor_plans = FloorPlanService::new(
            Arc::clone(&stores.floor_plans),
            Arc::clone(&stores.collections),
            Arc::clone(&stores.organizations),
            authz.clone(),
            leases.clone(),
            sync,
            planner.max_name_length,
        );
        let organizations = OrganizationService::new(
            Arc::clone(&stores.organizations),
            authz.clone(),
            planner.max_organization_name_length,
        );
        let members = MemberService::new(Arc::clone(&stores.memberships), authz.clone());
        let invitations = InvitationService::new(
            Arc::clone(&stores.invitations),
            authz,
            planner.invitation_ttl(),
        );

        let verifier = TokenVerifier::new(Arc::clone(&keys), config.auth.leeway_seconds);
        let rate_limiter = RateLimiter::from_config(&config.server.rate_limit);

        Self {
            config: Arc::new(config),
            database,
            keys,
            verifier: Arc::new(verifier),
            rate_limiter,
            floor_plans: Arc::new(floor_plans),
            leases: Arc::new(leases),
            organizations: Arc::new(organizations),
            members: Arc::new(members),
            invitations: Arc::new(invitations),
        }
    }
}
