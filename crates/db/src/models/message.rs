//! Chat message model and DTOs.

use deepchat_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `messages` table. `role` is `user` or `assistant`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Message {
    pub id: DbId,
    pub chat_id: DbId,
    pub role: String,
    pub content: String,
    pub created_at: Timestamp,
}

/// DTO for appending a message to a chat.
#[derive(Debug)]
pub struct CreateMessage<'a> {
    pub chat_id: DbId,
    pub role: &'a str,
    pub content: &'a str,
}
