//! Handlers for the `/artifacts` resource.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use deepchat_core::artifact_file::{content_disposition, download_filename, DEFAULT_CONTENT_TYPE};
use deepchat_core::error::CoreError;
use deepchat_core::types::DbId;
use deepchat_db::models::artifact::{Artifact, CreateArtifact};
use deepchat_db::repositories::{ArtifactRepo, MessageRepo};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::chats::find_owned_chat;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /artifacts`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateArtifactRequest {
    pub chat_id: DbId,
    pub message_id: Option<DbId>,
    #[validate(length(min = 1, max = 200, message = "must be 1 to 200 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub content: String,
    pub content_type: Option<String>,
    pub language: Option<String>,
}

/// POST /api/v1/artifacts
///
/// Attach a snippet to one of the caller's chats. A `message_id`, when
/// given, must belong to that chat.
pub async fn create_artifact(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateArtifactRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Artifact>>)> {
    let input = CreateArtifactRequest {
        title: input.title.trim().to_string(),
        ..input
    };
    input.validate()?;

    let chat = find_owned_chat(&state.pool, input.chat_id, auth.user_id).await?;

    if let Some(message_id) = input.message_id {
        if !MessageRepo::exists_in_chat(&state.pool, message_id, chat.id).await? {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Message",
                id: message_id,
            }));
        }
    }

    let artifact = ArtifactRepo::create(
        &state.pool,
        &CreateArtifact {
            chat_id: chat.id,
            message_id: input.message_id,
            title: input.title,
            content: input.content,
            content_type: input
                .content_type
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            language: input.language.filter(|l| !l.trim().is_empty()),
        },
    )
    .await?;

    tracing::debug!(artifact_id = artifact.id, chat_id = chat.id, "Artifact created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: artifact })))
}

/// GET /api/v1/artifacts/{id}/download
///
/// Serve the artifact body as an attachment named after its title and
/// language.
pub async fn download_artifact(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    let artifact = ArtifactRepo::find_owned(&state.pool, id, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Artifact",
            id,
        }))?;

    let filename = download_filename(&artifact.title, artifact.language.as_deref());
    let content_type = format!("{}; charset=utf-8", artifact.content_type);

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, content_disposition(&filename)),
        ],
        artifact.content,
    )
        .into_response())
}
