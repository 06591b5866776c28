//! `/ws/chat/{chat_id}`: conversational chat over a socket.
//!
//! The socket stays open for any number of messages. Each accepted message
//! is stored, answered with a streamed reply, and the reply's code blocks
//! are saved as artifacts.

use axum::extract::ws::{WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::Response;
use deepchat_core::artifact_file::DEFAULT_CONTENT_TYPE;
use deepchat_core::code_blocks::{extract_code_blocks, snippet_title};
use deepchat_core::prompt::{build_chat_prompt, Turn};
use deepchat_core::types::{DbId, Role};
use deepchat_db::models::artifact::CreateArtifact;
use deepchat_db::models::chat::Chat;
use deepchat_db::models::message::CreateMessage;
use deepchat_db::repositories::{ArtifactRepo, MessageRepo};

use super::connection::Connection;
use super::generation::{generate_reply, FlowError};
use super::protocol::{ChatRequest, EventSender, ServerEvent};
use crate::error::AppResult;
use crate::handlers::chats::find_owned_chat;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

pub const RATE_LIMITED_MESSAGE: &str =
    "Rate limit exceeded. Please wait before sending more messages.";

/// GET /ws/chat/{chat_id}
///
/// Ownership is checked before upgrading, so a foreign chat is a plain 404.
pub async fn chat_ws(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(chat_id): Path<DbId>,
    ws: WebSocketUpgrade,
) -> AppResult<Response> {
    let chat = find_owned_chat(&state.pool, chat_id, auth.user_id).await?;
    Ok(ws.on_upgrade(move |socket| handle_chat_socket(socket, state, auth.user_id, chat)))
}

async fn handle_chat_socket(socket: WebSocket, state: AppState, user_id: DbId, chat: Chat) {
    let mut conn = Connection::open(socket, state.ws_manager.clone(), user_id, chat.id).await;

    while let Some(text) = conn.next_text().await {
        let events = conn.events();
        let content = match parse_chat_request(&text) {
            Ok(content) => content,
            Err(reason) => {
                if events.send(&ServerEvent::error(reason)).is_err() {
                    break;
                }
                continue;
            }
        };

        if !state.rate_limiter.check(user_id) {
            tracing::warn!(user_id, chat_id = chat.id, "Chat message rate limited");
            let event = ServerEvent::error(RATE_LIMITED_MESSAGE);
            if events.send(&event).is_err() {
                break;
            }
            continue;
        }

        match answer_message(&state, &chat, &content, events).await {
            Ok(()) => {}
            Err(FlowError::Disconnected) => break,
            Err(e) => {
                tracing::error!(chat_id = chat.id, error = %e, "Chat message failed");
                if events.send(&ServerEvent::error(e.to_string())).is_err() {
                    break;
                }
            }
        }
    }

    conn.close().await;
}

/// Trimmed message content, or the error to report back.
fn parse_chat_request(text: &str) -> Result<String, &'static str> {
    let request: ChatRequest =
        serde_json::from_str(text).map_err(|_| "Invalid message format")?;
    let content = request.content.trim();
    if content.is_empty() {
        return Err("Empty message");
    }
    Ok(content.to_string())
}

async fn answer_message(
    state: &AppState,
    chat: &Chat,
    content: &str,
    events: &EventSender,
) -> Result<(), FlowError> {
    let user_message = MessageRepo::create(
        &state.pool,
        &CreateMessage {
            chat_id: chat.id,
            role: Role::User.as_str(),
            content,
        },
    )
    .await?;
    events.send(&ServerEvent::stored(&user_message, None))?;

    let transcript = MessageRepo::list_for_chat(&state.pool, chat.id).await?;
    let history: Vec<Turn<'_>> = transcript
        .iter()
        .map(|m| Turn {
            role: Role::from_db(&m.role),
            content: &m.content,
        })
        .collect();
    let prompt = build_chat_prompt(&history, content);

    let reply = generate_reply(&state.pool, &state.ollama, chat, &prompt, events).await?;

    for (index, block) in extract_code_blocks(&reply.content).into_iter().enumerate() {
        let language = (!block.language.is_empty()).then(|| block.language.clone());
        let artifact = ArtifactRepo::create(
            &state.pool,
            &CreateArtifact {
                chat_id: chat.id,
                message_id: Some(reply.id),
                title: snippet_title(index, &block.language),
                content: block.code,
                content_type: DEFAULT_CONTENT_TYPE.to_string(),
                language,
            },
        )
        .await?;
        events.send(&ServerEvent::artifact(&artifact))?;
    }

    events.send(&ServerEvent::complete(&reply))?;
    Ok(())
}
