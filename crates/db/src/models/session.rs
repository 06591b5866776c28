//! User session model and DTOs.

use deepchat_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A user session row from the `user_sessions` table.
///
/// One row per login. The `session_key` travels in the access token so a
/// revoked session invalidates its outstanding tokens.
#[derive(Debug, Clone, FromRow)]
pub struct UserSession {
    pub id: DbId,
    pub session_key: Uuid,
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub is_revoked: bool,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Session as listed to its owner.
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub session_key: Uuid,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
    /// True for the session the request was made with.
    pub is_current: bool,
}

impl SessionInfo {
    pub fn from_session(session: UserSession, current_key: Uuid) -> Self {
        Self {
            is_current: session.session_key == current_key,
            session_key: session.session_key,
            ip_address: session.ip_address,
            user_agent: session.user_agent,
            created_at: session.created_at,
            expires_at: session.expires_at,
        }
    }
}

/// DTO for creating a new user session.
pub struct CreateSession {
    pub session_key: Uuid,
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}
