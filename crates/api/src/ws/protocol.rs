//! JSON frames exchanged over the chat and import sockets.
//!
//! Server frames are tagged by `type`:
//!
//! ```text
//! message   {id, role, content, timestamp}   user message stored
//! status    {message}                        progress note
//! token     {token, id}                      next fragment of reply `id`
//! artifact  {id, title, language, created_at}
//! complete  {id, role, content, timestamp}   reply finished
//! error     {error}
//! ```

use axum::extract::ws::Message;
use deepchat_core::types::{DbId, Timestamp};
use deepchat_db::models::artifact::Artifact;
use deepchat_db::models::message::Message as ChatMessage;
use deepchat_ollama::SinkClosed;
use serde::{Deserialize, Serialize};

use super::manager::WsSender;

/// Frame sent by the chat socket client.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub content: String,
}

/// Frame sent by the import socket client.
#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    #[serde(default)]
    pub github_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    Message {
        id: DbId,
        role: String,
        content: String,
        timestamp: Timestamp,
    },
    Status {
        message: String,
    },
    Token {
        token: String,
        id: DbId,
    },
    Artifact {
        id: DbId,
        title: String,
        language: Option<String>,
        created_at: Timestamp,
    },
    Complete {
        id: DbId,
        role: String,
        content: String,
        timestamp: Timestamp,
    },
    Error {
        error: String,
    },
}

impl ServerEvent {
    /// `message` frame echoing a stored message. `content` overrides the
    /// stored text when the client should see something shorter.
    pub fn stored(message: &ChatMessage, content: Option<&str>) -> Self {
        Self::Message {
            id: message.id,
            role: message.role.clone(),
            content: content.unwrap_or(&message.content).to_string(),
            timestamp: message.created_at,
        }
    }

    pub fn status(message: impl Into<String>) -> Self {
        Self::Status {
            message: message.into(),
        }
    }

    pub fn artifact(artifact: &Artifact) -> Self {
        Self::Artifact {
            id: artifact.id,
            title: artifact.title.clone(),
            language: artifact.language.clone(),
            created_at: artifact.created_at,
        }
    }

    pub fn complete(message: &ChatMessage) -> Self {
        Self::Complete {
            id: message.id,
            role: message.role.clone(),
            content: message.content.clone(),
            timestamp: message.created_at,
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self::Error {
            error: error.into(),
        }
    }

    pub fn to_message(&self) -> Message {
        // Serializing a plain enum of strings and integers cannot fail.
        let json = serde_json::to_string(self).unwrap_or_default();
        Message::Text(json.into())
    }
}

/// Typed front of a connection's outbound channel.
#[derive(Clone)]
pub struct EventSender {
    tx: WsSender,
}

impl EventSender {
    pub fn new(tx: WsSender) -> Self {
        Self { tx }
    }

    /// Queue an event. Fails once the socket's writer task has gone away.
    pub fn send(&self, event: &ServerEvent) -> Result<(), SinkClosed> {
        self.tx.send(event.to_message()).map_err(|_| SinkClosed)
    }

    /// Queue a Close frame; the sender task stops after delivering it.
    pub fn close(&self) -> Result<(), SinkClosed> {
        self.tx.send(Message::Close(None)).map_err(|_| SinkClosed)
    }

    /// Token frames are the hot path; skip building an enum per fragment.
    pub fn send_token(&self, token: &str, id: DbId) -> Result<(), SinkClosed> {
        #[derive(Serialize)]
        struct TokenFrame<'a> {
            r#type: &'static str,
            token: &'a str,
            id: DbId,
        }
        let json = serde_json::to_string(&TokenFrame {
            r#type: "token",
            token,
            id,
        })
        .unwrap_or_default();
        self.tx
            .send(Message::Text(json.into()))
            .map_err(|_| SinkClosed)
    }
}
