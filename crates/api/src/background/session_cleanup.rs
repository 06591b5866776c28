//! Periodic purge of dead sessions and idle rate-limit entries.
//!
//! Sessions that expired or were revoked can no longer authenticate anything,
//! so their rows are deleted on a fixed interval. The same tick drops users
//! with no recent messages from the in-memory rate limiter.

use std::sync::Arc;
use std::time::Duration;

use deepchat_core::rate_limit::RateLimiter;
use deepchat_db::repositories::SessionRepo;
use deepchat_db::DbPool;
use tokio_util::sync::CancellationToken;

/// How often the cleanup job runs.
pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600); // 1 hour

/// Run the cleanup loop until `cancel` is triggered.
pub async fn run(pool: DbPool, rate_limiter: Arc<RateLimiter>, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = CLEANUP_INTERVAL.as_secs(),
        "Session cleanup job started"
    );

    let mut interval = tokio::time::interval(CLEANUP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session cleanup job stopping");
                break;
            }
            _ = interval.tick() => {
                match SessionRepo::cleanup_expired(&pool).await {
                    Ok(deleted) if deleted > 0 => {
                        tracing::info!(deleted, "Session cleanup: purged dead sessions");
                    }
                    Ok(_) => tracing::debug!("Session cleanup: nothing to purge"),
                    Err(e) => {
                        tracing::error!(error = %e, "Session cleanup: purge failed");
                    }
                }
                rate_limiter.prune();
            }
        }
    }
}
