//! Route definitions for the `/sessions` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::sessions;
use crate::state::AppState;

/// Routes mounted at `/sessions`.
///
/// ```text
/// GET  /            -> list_sessions
/// POST /revoke      -> revoke_session
/// POST /revoke-all  -> revoke_all_sessions
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(sessions::list_sessions))
        .route("/revoke", post(sessions::revoke_session))
        .route("/revoke-all", post(sessions::revoke_all_sessions))
}
