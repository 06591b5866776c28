//! Handler for `GET /models`.

use axum::extract::State;
use axum::Json;
use deepchat_core::models::{available_models, catalog, ModelInfo};
use serde::Serialize;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
    /// Model preselected for new chats.
    pub default_model: String,
}

/// GET /api/v1/models
///
/// Models installed on the inference server, or the built-in catalog when
/// the server is unreachable or has none of the supported family.
pub async fn list_models(State(state): State<AppState>, _auth: AuthUser) -> Json<ModelsResponse> {
    let models = match state.ollama.list_models().await {
        Ok(tags) => available_models(&tags),
        Err(e) => {
            tracing::warn!(error = %e, "Could not list models; using the catalog");
            catalog()
        }
    };

    Json(ModelsResponse {
        models,
        default_model: state.config.ollama.default_model.clone(),
    })
}
