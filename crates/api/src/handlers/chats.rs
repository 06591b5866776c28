//! Handlers for the `/chats` resource.
//!
//! Every handler is scoped to the caller: a chat owned by someone else is
//! indistinguishable from a missing one.

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use deepchat_core::artifact_file::content_disposition;
use deepchat_core::error::CoreError;
use deepchat_core::types::{DbId, Timestamp};
use deepchat_db::models::artifact::ArtifactSummary;
use deepchat_db::models::chat::{Chat, CreateChat};
use deepchat_db::models::message::Message;
use deepchat_db::repositories::{ArtifactRepo, ChatRepo, MessageRepo};
use deepchat_db::DbPool;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Title given to chats created without one.
pub const DEFAULT_CHAT_TITLE: &str = "New Chat";

/// Query parameters for `GET /chats`.
#[derive(Debug, Default, Deserialize)]
pub struct ListChatsParams {
    #[serde(default)]
    pub archived: bool,
}

/// Request body for `POST /chats`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateChatRequest {
    pub title: Option<String>,
    pub model: Option<String>,
}

/// Request body for `PUT /chats/{id}/title`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTitleRequest {
    #[validate(length(min = 1, max = 200, message = "must be 1 to 200 characters"))]
    pub title: String,
}

/// Chat with its transcript and artifact summaries.
#[derive(Debug, Serialize)]
pub struct ChatDetail {
    #[serde(flatten)]
    pub chat: Chat,
    pub messages: Vec<Message>,
    pub artifacts: Vec<ArtifactSummary>,
}

/// One transcript entry in a chat export.
#[derive(Debug, Serialize)]
pub struct ExportedMessage {
    pub role: String,
    pub content: String,
    pub created_at: Timestamp,
}

/// Body of `GET /chats/{id}/export`.
#[derive(Debug, Serialize)]
pub struct ChatExport {
    pub chat_id: DbId,
    pub title: String,
    pub model: String,
    pub exported_at: Timestamp,
    pub message_count: usize,
    pub messages: Vec<ExportedMessage>,
}

/// Response of `POST /chats/{id}/clear`.
#[derive(Debug, Serialize)]
pub struct ClearResult {
    pub deleted_count: u64,
    pub message: String,
}

/// Load a chat owned by `user_id` or fail with 404.
pub async fn find_owned_chat(pool: &DbPool, id: DbId, user_id: DbId) -> AppResult<Chat> {
    ChatRepo::find_owned(pool, id, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Chat", id }))
}

/// GET /api/v1/chats?archived=
///
/// Active chats by default, archived ones with `archived=true`. Most
/// recently updated first.
pub async fn list_chats(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ListChatsParams>,
) -> AppResult<Json<DataResponse<Vec<Chat>>>> {
    let chats = ChatRepo::list_for_user(&state.pool, auth.user_id, params.archived).await?;
    Ok(Json(DataResponse { data: chats }))
}

/// POST /api/v1/chats
pub async fn create_chat(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateChatRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Chat>>)> {
    let title = input
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_CHAT_TITLE.to_string());
    let model = input
        .model
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
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

    tracing::debug!(chat_id = chat.id, user_id = auth.user_id, "Chat created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: chat })))
}

/// GET /api/v1/chats/{id}
pub async fn get_chat(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ChatDetail>>> {
    let chat = find_owned_chat(&state.pool, id, auth.user_id).await?;
    let messages = MessageRepo::list_for_chat(&state.pool, chat.id).await?;
    let artifacts = ArtifactRepo::list_for_chat(&state.pool, chat.id).await?;

    Ok(Json(DataResponse {
        data: ChatDetail {
            chat,
            messages,
            artifacts,
        },
    }))
}

/// PUT /api/v1/chats/{id}/title
pub async fn update_title(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTitleRequest>,
) -> AppResult<Json<DataResponse<Chat>>> {
    let input = UpdateTitleRequest {
        title: input.title.trim().to_string(),
    };
    input.validate()?;

    let chat = ChatRepo::update_title(&state.pool, id, auth.user_id, &input.title)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Chat", id }))?;
    Ok(Json(DataResponse { data: chat }))
}

/// POST /api/v1/chats/{id}/archive
pub async fn archive_chat(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Chat>>> {
    set_archived(&state, &auth, id, true).await
}

/// POST /api/v1/chats/{id}/restore
pub async fn restore_chat(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Chat>>> {
    set_archived(&state, &auth, id, false).await
}

async fn set_archived(
    state: &AppState,
    auth: &AuthUser,
    id: DbId,
    archived: bool,
) -> AppResult<Json<DataResponse<Chat>>> {
    let chat = ChatRepo::set_archived(&state.pool, id, auth.user_id, archived)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Chat", id }))?;
    tracing::debug!(chat_id = id, archived, "Chat archive state changed");
    Ok(Json(DataResponse { data: chat }))
}

/// DELETE /api/v1/chats/{id}
///
/// Permanently delete a chat with its messages and artifacts.
pub async fn delete_chat(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if ChatRepo::delete(&state.pool, id, auth.user_id).await? {
        let open_sockets = state.ws_manager.chat_connection_count(id).await;
        tracing::info!(chat_id = id, user_id = auth.user_id, open_sockets, "Chat deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "Chat", id }))
    }
}

/// GET /api/v1/chats/{id}/artifacts
pub async fn list_chat_artifacts(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ArtifactSummary>>>> {
    let chat = find_owned_chat(&state.pool, id, auth.user_id).await?;
    let artifacts = ArtifactRepo::list_for_chat(&state.pool, chat.id).await?;
    Ok(Json(DataResponse { data: artifacts }))
}

/// GET /api/v1/chats/{id}/export
///
/// The full transcript as a JSON attachment named `chat-{id}.json`.
pub async fn export_chat(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    let chat = find_owned_chat(&state.pool, id, auth.user_id).await?;
    let messages: Vec<ExportedMessage> = MessageRepo::list_for_chat(&state.pool, chat.id)
        .await?
        .into_iter()
        .map(|m| ExportedMessage {
            role: m.role,
            content: m.content,
            created_at: m.created_at,
        })
        .collect();

    let export = ChatExport {
        chat_id: chat.id,
        title: chat.title,
        model: chat.model,
        exported_at: Utc::now(),
        message_count: messages.len(),
        messages,
    };
    let disposition = content_disposition(&format!("chat-{}.json", chat.id));
    Ok(([(header::CONTENT_DISPOSITION, disposition)], Json(export)).into_response())
}

/// POST /api/v1/chats/{id}/clear
///
/// Delete the transcript but keep the chat and its artifacts.
pub async fn clear_chat(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ClearResult>> {
    let chat = find_owned_chat(&state.pool, id, auth.user_id).await?;
    let deleted_count = MessageRepo::delete_for_chat(&state.pool, chat.id).await?;
    ChatRepo::touch(&state.pool, chat.id).await?;

    tracing::info!(chat_id = chat.id, user_id = auth.user_id, deleted_count, "Chat cleared");
    Ok(Json(ClearResult {
        deleted_count,
        message: format!("Cleared {deleted_count} messages"),
    }))
}
