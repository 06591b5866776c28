//! Repository for the `messages` table.

use deepchat_core::types::DbId;
use sqlx::PgPool;

use crate::models::message::{CreateMessage, Message};

const COLUMNS: &str = "id, chat_id, role, content, created_at";

pub struct MessageRepo;

impl MessageRepo {
    /// Append a message to a chat, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateMessage<'_>) -> Result<Message, sqlx::Error> {
        let query = format!(
            "INSERT INTO messages (chat_id, role, content)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(input.chat_id)
            .bind(input.role)
            .bind(input.content)
            .fetch_one(pool)
            .await
    }

    /// All messages of a chat in the order they were written.
    pub async fn list_for_chat(pool: &PgPool, chat_id: DbId) -> Result<Vec<Message>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM messages WHERE chat_id = $1 ORDER BY id");
        sqlx::query_as::<_, Message>(&query)
            .bind(chat_id)
            .fetch_all(pool)
            .await
    }

    /// Whether message `id` was written in chat `chat_id`.
    pub async fn exists_in_chat(pool: &PgPool, id: DbId, chat_id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM messages WHERE id = $1 AND chat_id = $2)")
            .bind(id)
            .bind(chat_id)
            .fetch_one(pool)
            .await
    }

    /// Replace a message's content, used to finalize streamed replies.
    pub async fn update_content(
        pool: &PgPool,
        id: DbId,
        content: &str,
    ) -> Result<Option<Message>, sqlx::Error> {
        let query = format!(
            "UPDATE messages SET content = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(id)
            .bind(content)
            .fetch_optional(pool)
            .await
    }

    /// Delete every message of a chat. Artifacts stay, unlinked from their
    /// message. Returns the number of messages removed.
    pub async fn delete_for_chat(pool: &PgPool, chat_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM messages WHERE chat_id = $1")
            .bind(chat_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
