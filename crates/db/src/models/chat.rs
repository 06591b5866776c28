//! Chat entity model and DTOs.

use deepchat_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `chats` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Chat {
    pub id: DbId,
    pub user_id: DbId,
    pub title: String,
    /// Inference-server model tag used for this conversation.
    pub model: String,
    pub is_archived: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new chat.
#[derive(Debug)]
pub struct CreateChat {
    pub user_id: DbId,
    pub title: String,
    pub model: String,
}
