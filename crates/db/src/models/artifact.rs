//! Artifact model and DTOs.

use deepchat_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full artifact row from the `artifacts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Artifact {
    pub id: DbId,
    pub chat_id: DbId,
    /// The assistant message the artifact was extracted from, if any.
    pub message_id: Option<DbId>,
    pub title: String,
    pub content: String,
    pub content_type: String,
    pub language: Option<String>,
    pub created_at: Timestamp,
}

/// Artifact listing entry without the content body.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ArtifactSummary {
    pub id: DbId,
    pub chat_id: DbId,
    pub message_id: Option<DbId>,
    pub title: String,
    pub content_type: String,
    pub language: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for creating a new artifact.
#[derive(Debug)]
pub struct CreateArtifact {
    pub chat_id: DbId,
    pub message_id: Option<DbId>,
    pub title: String,
    pub content: String,
    pub content_type: String,
    pub language: Option<String>,
}
