//! Repository for the `chats` table.
//!
//! Lookups that take a `user_id` only match chats owned by that user, so a
//! foreign chat is indistinguishable from a missing one.

use deepchat_core::types::DbId;
use sqlx::PgPool;

use crate::models::chat::{Chat, CreateChat};

const COLUMNS: &str = "id, user_id, title, model, is_archived, created_at, updated_at";

pub struct ChatRepo;

impl ChatRepo {
    /// Insert a new chat, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateChat) -> Result<Chat, sqlx::Error> {
        let query = format!(
            "INSERT INTO chats (user_id, title, model)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Chat>(&query)
            .bind(input.user_id)
            .bind(&input.title)
            .bind(&input.model)
            .fetch_one(pool)
            .await
    }

    /// Find a chat owned by `user_id`.
    pub async fn find_owned(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Chat>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM chats WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Chat>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's chats with the given archive flag, most recently
    /// updated first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        archived: bool,
    ) -> Result<Vec<Chat>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM chats
             WHERE user_id = $1 AND is_archived = $2
             ORDER BY updated_at DESC, id DESC"
        );
        sqlx::query_as::<_, Chat>(&query)
            .bind(user_id)
            .bind(archived)
            .fetch_all(pool)
            .await
    }

    /// Rename a chat. Returns `None` when the chat is not the user's.
    pub async fn update_title(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        title: &str,
    ) -> Result<Option<Chat>, sqlx::Error> {
        let query = format!(
            "UPDATE chats SET title = $3
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Chat>(&query)
            .bind(id)
            .bind(user_id)
            .bind(title)
            .fetch_optional(pool)
            .await
    }

    /// Set the archive flag. Returns `None` when the chat is not the user's.
    pub async fn set_archived(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        archived: bool,
    ) -> Result<Option<Chat>, sqlx::Error> {
        let query = format!(
            "UPDATE chats SET is_archived = $3
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Chat>(&query)
            .bind(id)
            .bind(user_id)
            .bind(archived)
            .fetch_optional(pool)
            .await
    }

    /// Bump `updated_at` so the chat sorts first in listings.
    pub async fn touch(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE chats SET updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Permanently delete a chat with its messages and artifacts.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM chats WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
