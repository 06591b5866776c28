//! Streaming an assistant reply into a chat.
//!
//! Both socket flows end the same way: start a generation, store an empty
//! assistant message, relay tokens tagged with its id, then store the final
//! text. Flow-specific artifacts are attached by the caller afterwards.

use deepchat_core::types::Role;
use deepchat_db::models::chat::Chat;
use deepchat_db::models::message::{CreateMessage, Message};
use deepchat_db::repositories::{ChatRepo, MessageRepo};
use deepchat_db::DbPool;
use deepchat_github::GithubError;
use deepchat_ollama::{relay_tokens, OllamaClient, OllamaError, RelayError};

use super::protocol::EventSender;

/// Why a socket flow stopped before finishing.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Model request failed: {0}")]
    Inference(#[from] OllamaError),

    #[error(transparent)]
    Relay(RelayError<reqwest::Error>),

    #[error("GitHub error: {0}")]
    Github(#[from] GithubError),

    /// Client-facing rejection of the request itself.
    #[error("{0}")]
    Rejected(String),

    /// The client went away; nothing more can be reported.
    #[error("client disconnected")]
    Disconnected,
}

impl From<RelayError<reqwest::Error>> for FlowError {
    fn from(err: RelayError<reqwest::Error>) -> Self {
        match err {
            RelayError::Sink(_) => FlowError::Disconnected,
            other => FlowError::Relay(other),
        }
    }
}

impl From<deepchat_ollama::SinkClosed> for FlowError {
    fn from(_: deepchat_ollama::SinkClosed) -> Self {
        FlowError::Disconnected
    }
}

/// Generate a reply to `prompt` with the chat's model and stream it to the
/// client.
///
/// On success returns the stored assistant message with its full text. If
/// the stream breaks off, whatever arrived is stored before the error is
/// returned, so the transcript keeps the partial reply.
pub async fn generate_reply(
    pool: &DbPool,
    ollama: &OllamaClient,
    chat: &Chat,
    prompt: &str,
    events: &EventSender,
) -> Result<Message, FlowError> {
    let stream = ollama.generate_stream(&chat.model, prompt).await?;

    let placeholder = MessageRepo::create(
        pool,
        &CreateMessage {
            chat_id: chat.id,
            role: Role::Assistant.as_str(),
            content: "",
        },
    )
    .await?;

    let mut text = String::new();
    let relayed = relay_tokens(
        stream,
        |token| events.send_token(token, placeholder.id),
        &mut text,
    )
    .await;

    let stored = MessageRepo::update_content(pool, placeholder.id, &text)
        .await?
        .unwrap_or(Message {
            content: text,
            ..placeholder
        });
    ChatRepo::touch(pool, chat.id).await?;

    match relayed {
        Ok(summary) => {
            tracing::info!(
                chat_id = chat.id,
                message_id = stored.id,
                tokens = summary.tokens,
                done = summary.done,
                "Reply generated",
            );
            Ok(stored)
        }
        Err(e) => {
            tracing::warn!(
                chat_id = chat.id,
                message_id = stored.id,
                kept = stored.content.len(),
                error = %e,
                "Reply interrupted",
            );
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn sink_closure_maps_to_disconnect() {
        let err: FlowError = RelayError::<reqwest::Error>::Sink(deepchat_ollama::SinkClosed).into();
        assert_matches!(err, FlowError::Disconnected);
    }

    #[test]
    fn model_error_is_reported() {
        let err: FlowError = RelayError::<reqwest::Error>::Model("model not found".into()).into();
        assert_eq!(err.to_string(), "inference server error: model not found");
    }
}
