//! Keep-alive pings for chat sockets.
//!
//! While the model loads or a long reply is generated, a socket can carry no
//! frames for minutes and proxies close idle connections. Every tick pings
//! all clients. A failed send means the connection task has already ended,
//! so its entry is removed from the manager.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::ws::WsManager;

/// How often every socket is pinged.
pub const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Ping all sockets every `period` until `cancel` is triggered.
pub async fn run(ws_manager: Arc<WsManager>, period: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = period.as_secs(), "Socket heartbeat started");

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Socket heartbeat stopping");
                break;
            }
            _ = interval.tick() => {
                let pruned = ws_manager.ping_all().await;
                if pruned > 0 {
                    tracing::info!(pruned, "Dropped closed sockets");
                }
                let open = ws_manager.connection_count().await;
                tracing::trace!(open, "Sockets pinged");
            }
        }
    }
}
