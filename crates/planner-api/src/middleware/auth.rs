//! Bearer token authentication for the `/api` routes.

use axum::RequestPartsExt;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use tracing::debug;

use planner_core::error::AppError;
use planner_service::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Verifies the bearer token, applies the per-principal rate limit, and
/// stores the resulting [`RequestContext`] in the request extensions for
/// the [`AuthUser`](crate::extractors::AuthUser) extractor.
pub async fn authenticate(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (mut parts, body) = request.into_parts();

    let TypedHeader(Authorization(bearer)) = parts
        .extract::<TypedHeader<Authorization<Bearer>>>()
        .await
        .map_err(|e| {
            debug!(error = %e, "Missing or malformed Authorization header");
            AppError::authentication("Missing or invalid Authorization header")
        })?;

    let principal = state.verifier.verify(bearer.token())?;

    if !state.rate_limiter.check(&principal.id.to_string()).await {
        return Err(AppError::rate_limit("Rate limit exceeded").into());
    }

    parts.extensions.insert(RequestContext::new(principal));
    Ok(next.run(Request::from_parts(parts, body)).await)
}
