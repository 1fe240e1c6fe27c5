//! Invitation acceptance handler.

use axum::Json;
use axum::extract::{Path, State};

use crate::dto::response::AcceptInvitationResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/invitations/{token}/accept
pub async fn accept_invitation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(token): Path<String>,
) -> Result<Json<AcceptInvitationResponse>, ApiError> {
    let accepted = state.invitations.accept(&auth, &token).await?;
    Ok(Json(AcceptInvitationResponse {
        status: if accepted.already_member {
            "already_member"
        } else {
            "joined"
        }
        .to_string(),
        membership: accepted.membership,
    }))
}
