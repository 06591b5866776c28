//! Account lockout after repeated failed logins.

use crate::types::Timestamp;

/// Maximum consecutive failed login attempts before locking the account.
pub const MAX_FAILED_ATTEMPTS: i32 = 5;

/// Duration in minutes to lock an account after exceeding failed attempts.
pub const LOCK_DURATION_MINS: i64 = 15;

/// Whether a login must be refused because the account is still locked.
pub fn is_locked(locked_until: Option<Timestamp>, now: Timestamp) -> bool {
    locked_until.is_some_and(|until| until > now)
}

/// Whole minutes (rounded up) until a lock expires, for user-facing errors.
pub fn minutes_remaining(locked_until: Timestamp, now: Timestamp) -> i64 {
    let secs = (locked_until - now).num_seconds().max(0);
    (secs + 59) / 60
}

/// Counter state after a failed password check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailedLogin {
    pub failed_login_count: i32,
    /// Set once the count has reached [`MAX_FAILED_ATTEMPTS`].
    pub lock_until: Option<Timestamp>,
}
