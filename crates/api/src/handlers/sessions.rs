//! Handlers for the caller's login sessions (`/sessions`).

use axum::extract::State;
use axum::Json;
use deepchat_core::error::CoreError;
use deepchat_db::models::session::SessionInfo;
use deepchat_db::repositories::SessionRepo;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /sessions/revoke`.
#[derive(Debug, Deserialize)]
pub struct RevokeSessionRequest {
    pub session_key: Uuid,
}

#[derive(Debug, Serialize)]
pub struct RevokedCount {
    pub revoked: u64,
}

/// GET /api/v1/sessions
///
/// Active sessions of the caller, newest first, with the one making the
/// request flagged `is_current`.
pub async fn list_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<SessionInfo>>>> {
    let sessions = SessionRepo::list_active_for_user(&state.pool, auth.user_id).await?;
    let data = sessions
        .into_iter()
        .map(|s| SessionInfo::from_session(s, auth.session_key))
        .collect();
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/sessions/revoke
///
/// Revoke another session of the caller. The current session is ended via
/// logout instead.
pub async fn revoke_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<RevokeSessionRequest>,
) -> AppResult<Json<DataResponse<RevokedCount>>> {
    if input.session_key == auth.session_key {
        return Err(AppError::Core(CoreError::Validation(
            "Cannot revoke the current session; log out instead".into(),
        )));
    }

    let revoked = SessionRepo::revoke_by_key(&state.pool, auth.user_id, input.session_key).await?;
    if !revoked {
        return Err(AppError::NotFound(format!(
            "Session {} not found",
            input.session_key
        )));
    }

    tracing::info!(user_id = auth.user_id, session_key = %input.session_key, "Session revoked");
    Ok(Json(DataResponse {
        data: RevokedCount { revoked: 1 },
    }))
}

/// POST /api/v1/sessions/revoke-all
///
/// Revoke every session of the caller except the current one.
pub async fn revoke_all_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<RevokedCount>>> {
    let revoked = SessionRepo::revoke_all_except(&state.pool, auth.user_id, auth.session_key).await?;
    tracing::info!(user_id = auth.user_id, revoked, "Other sessions revoked");
    Ok(Json(DataResponse {
        data: RevokedCount { revoked },
    }))
}
