//! Errors raised by domain rules, independent of transport.
//!
//! The HTTP layer maps each variant to a status code; socket flows send the
//! `Display` text to the client as an `error` event, so messages are written
//! for end users.

use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A chat, artifact, message or user is missing or owned by someone else.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    /// Too many failed logins. `minutes` is rounded up.
    #[error("Account is locked. Try again in {minutes} minutes.")]
    AccountLocked { minutes: i64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_user_facing() {
        let missing = CoreError::NotFound {
            entity: "Chat",
            id: 7,
        };
        assert_eq!(missing.to_string(), "Chat with id 7 not found");
        assert_eq!(
            CoreError::Validation("Invalid GitHub URL format".into()).to_string(),
            "Invalid GitHub URL format"
        );
        assert_eq!(
            CoreError::AccountLocked { minutes: 3 }.to_string(),
            "Account is locked. Try again in 3 minutes."
        );
    }
}
