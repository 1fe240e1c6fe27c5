//! Health check handler.

use axum::Json;
use axum::extract::State;
use chrono::Utc;
use tracing::warn;

use crate::dto::response::HealthResponse;
use crate::state::AppState;

/// GET /health
///
/// Always 200 so load balancers can tell a live process from a dead one;
/// `status` is "degraded" when the database is unreachable.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match &state.database {
        Some(pool) => match pool.health_check().await {
            Ok(()) => "connected",
            Err(e) => {
                warn!(error = %e, "Database health check failed");
                "unreachable"
            }
        },
        None => "memory",
    };

    let key_loaded_at = state.keys.current().loaded_at();

    Json(HealthResponse {
        status: if database == "unreachable" { "degraded" } else { "ok" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
        key_loaded_at,
        key_age_seconds: (Utc::now() - key_loaded_at).num_seconds(),
    })
}
