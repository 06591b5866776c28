//! Route definitions for the `/artifacts` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::artifacts;
use crate::state::AppState;

/// Routes mounted at `/artifacts`.
///
/// ```text
/// POST /                -> create_artifact
/// GET  /{id}/download   -> download_artifact
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(artifacts::create_artifact))
        .route("/{id}/download", get(artifacts::download_artifact))
}
