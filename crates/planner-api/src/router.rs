//! Route definitions for the table planner HTTP API.
//!
//! `/health` is public. Everything under `/api` passes through bearer
//! token authentication first.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_body = state.config.server.max_body_bytes;

    let api_routes = Router::new()
        .merge(floor_plan_routes())
        .merge(lock_routes())
        .merge(organization_routes())
        .merge(invitation_routes())
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::authenticate,
        ));

    Router::new()
        .route("/health", get(handlers::health::health))
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_body))
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Floor plan CRUD, bulk save, and sharing
fn floor_plan_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/floor-plans",
            get(handlers::floor_plan::list_floor_plans)
                .post(handlers::floor_plan::create_floor_plan),
        )
        .route(
            "/floor-plans/{id}",
            get(handlers::floor_plan::get_floor_plan)
                .put(handlers::floor_plan::update_floor_plan)
                .delete(handlers::floor_plan::delete_floor_plan),
        )
        .route(
            "/floor-plans/{id}/save",
            put(handlers::floor_plan::save_floor_plan).post(handlers::floor_plan::save_floor_plan),
        )
        .route(
            "/floor-plans/{id}/share",
            post(handlers::floor_plan::share_floor_plan)
                .delete(handlers::floor_plan::unshare_floor_plan),
        )
}

/// Edit lease status, acquire, refresh, release
fn lock_routes() -> Router<AppState> {
    Router::new().route(
        "/floor-plans/{id}/lock",
        get(handlers::lock::lock_status)
            .post(handlers::lock::acquire_lock)
            .put(handlers::lock::refresh_lock)
            .delete(handlers::lock::release_lock),
    )
}

/// Organizations and their members
fn organization_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/organizations",
            get(handlers::organization::list_organizations)
                .post(handlers::organization::create_organization),
        )
        .route(
            "/organizations/{id}",
            get(handlers::organization::get_organization)
                .put(handlers::organization::update_organization)
                .delete(handlers::organization::delete_organization),
        )
        .route(
            "/organizations/{id}/members",
            get(handlers::member::list_members).post(handlers::member::invite_member),
        )
        .route(
            "/organizations/{id}/members/{user_id}",
            put(handlers::member::update_member_role).delete(handlers::member::remove_member),
        )
}

/// Invitation acceptance
fn invitation_routes() -> Router<AppState> {
    Router::new().route(
        "/invitations/{token}/accept",
        post(handlers::invitation::accept_invitation),
    )
}
