//! `/ws/github/{chat_id}`: one-shot repository import and analysis.
//!
//! The client sends a single `{"github_url": ...}` frame. The repository is
//! fetched, summarised into the chat as a user message, analysed by the
//! model, and every fetched source file is stored as an artifact of the
//! analysis. The socket closes afterwards.

use axum::extract::ws::{WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::Response;
use deepchat_core::artifact_file::DEFAULT_CONTENT_TYPE;
use deepchat_core::github_url::{is_valid_github_url, parse_github_url};
use deepchat_core::languages::is_code_language;
use deepchat_core::prompt::build_analysis_prompt;
use deepchat_core::types::{DbId, Role};
use deepchat_db::models::artifact::CreateArtifact;
use deepchat_db::models::chat::Chat;
use deepchat_db::models::message::CreateMessage;
use deepchat_db::repositories::{ArtifactRepo, MessageRepo};
use deepchat_github::select::MAX_FILE_BYTES;
use deepchat_github::{format_code_for_llm, summarize_for_llm, RepoFile};

use super::chat::RATE_LIMITED_MESSAGE;
use super::connection::Connection;
use super::generation::{generate_reply, FlowError};
use super::protocol::{EventSender, ImportRequest, ServerEvent};
use crate::error::AppResult;
use crate::handlers::chats::find_owned_chat;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /ws/github/{chat_id}
pub async fn github_ws(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(chat_id): Path<DbId>,
    ws: WebSocketUpgrade,
) -> AppResult<Response> {
    let chat = find_owned_chat(&state.pool, chat_id, auth.user_id).await?;
    Ok(ws.on_upgrade(move |socket| handle_github_socket(socket, state, auth.user_id, chat)))
}

async fn handle_github_socket(socket: WebSocket, state: AppState, user_id: DbId, chat: Chat) {
    let mut conn = Connection::open(socket, state.ws_manager.clone(), user_id, chat.id).await;

    if let Some(text) = conn.next_text().await {
        let events = conn.events();
        let outcome = match parse_import_request(&text) {
            Ok(url) if state.rate_limiter.check(user_id) => {
                import_repository(&state, &chat, &url, events).await
            }
            Ok(_) => Err(FlowError::Rejected(RATE_LIMITED_MESSAGE.into())),
            Err(reason) => Err(FlowError::Rejected(reason.into())),
        };

        match outcome {
            Ok(()) | Err(FlowError::Disconnected) => {}
            Err(e) => {
                tracing::error!(chat_id = chat.id, error = %e, "GitHub import failed");
                let _ = events.send(&ServerEvent::error(e.to_string()));
            }
        }
    }

    conn.close().await;
}

/// Trimmed, validated URL or the error to report back.
fn parse_import_request(text: &str) -> Result<String, &'static str> {
    let request: ImportRequest =
        serde_json::from_str(text).map_err(|_| "Invalid message format")?;
    let url = request.github_url.trim();
    if url.is_empty() || !is_valid_github_url(url) {
        return Err("Invalid GitHub URL");
    }
    Ok(url.to_string())
}

/// Whether an imported file is stored as an artifact of the analysis.
fn keeps_as_artifact(file: &RepoFile) -> bool {
    is_code_language(file.language.as_deref()) && file.size <= MAX_FILE_BYTES
}

async fn import_repository(
    state: &AppState,
    chat: &Chat,
    github_url: &str,
    events: &EventSender,
) -> Result<(), FlowError> {
    events.send(&ServerEvent::status("Parsing GitHub URL..."))?;
    let url = parse_github_url(github_url).map_err(|e| FlowError::Rejected(e.to_string()))?;

    events.send(&ServerEvent::status(format!(
        "Fetching content from GitHub: {}...",
        url.full_name()
    )))?;
    let github = &state.config.github;
    let imported = state.repositories.fetch(&url, github.max_files).await?;

    events.send(&ServerEvent::status("Processing repository content..."))?;
    let summary_text = summarize_for_llm(&imported.summary);
    let code_text = format_code_for_llm(&imported.files, github.context_limit);

    let headline = format!("Import from GitHub: {github_url}");
    let user_content = format!("{headline}\n\n{summary_text}");
    let user_message = MessageRepo::create(
        &state.pool,
        &CreateMessage {
            chat_id: chat.id,
            role: Role::User.as_str(),
            content: &user_content,
        },
    )
    .await?;
    events.send(&ServerEvent::stored(&user_message, Some(&headline)))?;

    events.send(&ServerEvent::status("Sending to the model for analysis..."))?;
    let prompt = build_analysis_prompt(&summary_text, &code_text);
    let reply = generate_reply(&state.pool, &state.ollama, chat, &prompt, events).await?;

    for file in imported.files.into_iter().filter(keeps_as_artifact) {
        let artifact = ArtifactRepo::create(
            &state.pool,
            &CreateArtifact {
                chat_id: chat.id,
                message_id: Some(reply.id),
                title: format!("{} (GitHub)", file.file_name()),
                content: file.content,
                content_type: DEFAULT_CONTENT_TYPE.to_string(),
                language: file.language,
            },
        )
        .await?;
        events.send(&ServerEvent::artifact(&artifact))?;
    }

    tracing::info!(
        chat_id = chat.id,
        repo = %imported.summary.full_name,
        "GitHub import analysed",
    );
    events.send(&ServerEvent::complete(&reply))?;
    Ok(())
}
