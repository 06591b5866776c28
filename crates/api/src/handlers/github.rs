//! Handler for `POST /github/import`.
//!
//! Only creates the chat; fetching and analysis run over the
//! `/ws/github/{chat_id}` socket.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use deepchat_core::error::CoreError;
use deepchat_core::github_url::{is_valid_github_url, title_from_github_url};
use deepchat_db::models::chat::{Chat, CreateChat};
use deepchat_db::repositories::ChatRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /github/import`.
#[derive(Debug, Deserialize)]
pub struct GithubImportRequest {
    pub github_url: String,
    pub title: Option<String>,
    pub model: Option<String>,
}

/// POST /api/v1/github/import
pub async fn import_repository(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<GithubImportRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Chat>>)> {
    let url = input.github_url.trim();
    if !is_valid_github_url(url) {
        return Err(AppError::Core(CoreError::Validation(
            "Invalid GitHub URL".into(),
        )));
    }

    let title = input
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| title_from_github_url(url));
    let model = input
        .model
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| state.config.ollama.default_model.clone());

    let chat = ChatRepo::create(
        &state.pool,
        &CreateChat {
            user_id: auth.user_id,
            title,
            model,
        },
    )
    .await?;

    tracing::info!(chat_id = chat.id, user_id = auth.user_id, url, "GitHub import chat created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: chat })))
}
