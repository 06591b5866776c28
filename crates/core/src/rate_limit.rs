//! Per-user sliding-window limit on chat messages.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::types::DbId;

/// Default number of messages a user may send per window.
pub const DEFAULT_MESSAGES_PER_MINUTE: u32 = 10;

/// Length of the sliding window.
pub const WINDOW: Duration = Duration::from_secs(60);

/// In-memory sliding-window limiter keyed by user id.
///
/// Each user keeps the instants of their accepted messages inside the
/// current window; anything older is pruned on the next check.
#[derive(Debug)]
pub struct RateLimiter {
    max_per_window: u32,
    window: Duration,
    hits: Mutex<HashMap<DbId, VecDeque<Instant>>>,
}

impl RateLimiter {
    /// Limiter allowing `max_per_window` messages per minute. Zero disables
    /// the limit.
    pub fn new(max_per_window: u32) -> Self {
        Self::with_window(max_per_window, WINDOW)
    }

    pub fn with_window(max_per_window: u32, window: Duration) -> Self {
        Self {
            max_per_window,
            window,
            hits: Mutex::new(HashMap::new()),
        }
    }

    /// Record a message for `user_id` now. Returns `false` when the user is
    /// over the limit, in which case nothing is recorded.
    pub fn check(&self, user_id: DbId) -> bool {
        self.check_at(user_id, Instant::now())
    }

    /// [`check`](Self::check) with an explicit clock reading.
    pub fn check_at(&self, user_id: DbId, now: Instant) -> bool {
        if self.max_per_window == 0 {
            return true;
        }

        let mut hits = self.hits.lock().unwrap_or_else(|e| e.into_inner());
        let entries = hits.entry(user_id).or_default();
        while entries
            .front()
            .is_some_and(|t| now.saturating_duration_since(*t) >= self.window)
        {
            entries.pop_front();
        }

        if entries.len() >= self.max_per_window as usize {
            return false;
        }
        entries.push_back(now);
        true
    }

    /// Drop users with no hits inside the window.
    pub fn prune(&self) {
        let now = Instant::now();
        let mut hits = self.hits.lock().unwrap_or_else(|e| e.into_inner());
        hits.retain(|_, entries| {
            entries
                .back()
                .is_some_and(|t| now.saturating_duration_since(*t) < self.window)
        });
    }

    /// Number of users currently tracked.
    pub fn tracked_users(&self) -> usize {
        self.hits.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MESSAGES_PER_MINUTE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_limit() {
        let limiter = RateLimiter::new(3);
        let t0 = Instant::now();
        assert!(limiter.check_at(1, t0));
        assert!(limiter.check_at(1, t0));
        assert!(limiter.check_at(1, t0));
        assert!(!limiter.check_at(1, t0));
    }

    #[test]
    fn users_are_independent() {
        let limiter = RateLimiter::new(1);
        let t0 = Instant::now();
        assert!(limiter.check_at(1, t0));
        assert!(limiter.check_at(2, t0));
        assert!(!limiter.check_at(1, t0));
    }

    #[test]
    fn window_slides() {
        let limiter = RateLimiter::new(2);
        let t0 = Instant::now();
        assert!(limiter.check_at(7, t0));
        assert!(limiter.check_at(7, t0 + Duration::from_secs(30)));
        assert!(!limiter.check_at(7, t0 + Duration::from_secs(59)));
        // The first hit leaves the window at t0 + 60s.
        assert!(limiter.check_at(7, t0 + Duration::from_secs(60)));
        assert!(!limiter.check_at(7, t0 + Duration::from_secs(61)));
    }

    #[test]
    fn rejected_messages_are_not_counted() {
        let limiter = RateLimiter::new(1);
        let t0 = Instant::now();
        assert!(limiter.check_at(1, t0));
        for s in 1..50 {
            assert!(!limiter.check_at(1, t0 + Duration::from_secs(s)));
        }
        assert!(limiter.check_at(1, t0 + Duration::from_secs(60)));
    }

    #[test]
    fn zero_disables_limit() {
        let limiter = RateLimiter::new(0);
        let t0 = Instant::now();
        for _ in 0..100 {
            assert!(limiter.check_at(1, t0));
        }
    }

    #[test]
    fn prune_drops_idle_users() {
        let limiter = RateLimiter::with_window(5, Duration::from_millis(0));
        assert!(limiter.check(1));
        limiter.prune();
        assert_eq!(limiter.tracked_users(), 0);
    }
}
