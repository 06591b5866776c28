//! Repository for the `artifacts` table.

use deepchat_core::types::DbId;
use sqlx::PgPool;

use crate::models::artifact::{Artifact, ArtifactSummary, CreateArtifact};

const COLUMNS: &str = "id, chat_id, message_id, title, content, content_type, language, created_at";

const SUMMARY_COLUMNS: &str = "id, chat_id, message_id, title, content_type, language, created_at";

pub struct ArtifactRepo;

impl ArtifactRepo {
    /// Insert a new artifact, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateArtifact) -> Result<Artifact, sqlx::Error> {
        let query = format!(
            "INSERT INTO artifacts (chat_id, message_id, title, content, content_type, language)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Artifact>(&query)
            .bind(input.chat_id)
            .bind(input.message_id)
            .bind(&input.title)
            .bind(&input.content)
            .bind(&input.content_type)
            .bind(&input.language)
            .fetch_one(pool)
            .await
    }

    /// Find an artifact whose chat belongs to `user_id`.
    pub async fn find_owned(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Artifact>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM artifacts
             WHERE id = $1
               AND chat_id IN (SELECT id FROM chats WHERE user_id = $2)"
        );
        sqlx::query_as::<_, Artifact>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Artifact summaries of a chat, oldest first.
    pub async fn list_for_chat(
        pool: &PgPool,
        chat_id: DbId,
    ) -> Result<Vec<ArtifactSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS} FROM artifacts WHERE chat_id = $1 ORDER BY id"
        );
        sqlx::query_as::<_, ArtifactSummary>(&query)
            .bind(chat_id)
            .fetch_all(pool)
            .await
    }
}
