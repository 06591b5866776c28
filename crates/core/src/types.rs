//! Identifier, time and transcript types shared by every crate.

/// Primary keys are PostgreSQL `BIGSERIAL`.
pub type DbId = i64;

/// Stored as `TIMESTAMPTZ`, handled in UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Author of a transcript entry, as stored in `messages.role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Parse a stored role. Anything other than `user` is treated as the
    /// assistant.
    pub fn from_db(value: &str) -> Self {
        if value == "user" {
            Role::User
        } else {
            Role::Assistant
        }
    }

    /// Speaker label used when a transcript is flattened into a prompt.
    pub const fn label(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}
