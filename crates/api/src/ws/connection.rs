use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use deepchat_core::types::DbId;
use futures::stream::SplitStream;
use futures::{SinkExt, StreamExt};
use tokio::task::JoinHandle;

use super::manager::WsManager;
use super::protocol::EventSender;

/// How long queued frames get to reach the client once a flow is done.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// An upgraded socket registered with the [`WsManager`].
///
/// The socket is split into a sink (outbound) and stream (inbound). A spawned
/// sender task forwards everything queued on the manager channel to the
/// sink; the owning flow reads client frames with [`next_text`](Self::next_text).
pub struct Connection {
    conn_id: String,
    manager: Arc<WsManager>,
    events: EventSender,
    stream: SplitStream<WebSocket>,
    send_task: JoinHandle<()>,
}

impl Connection {
    pub async fn open(
        socket: WebSocket,
        manager: Arc<WsManager>,
        user_id: DbId,
        chat_id: DbId,
    ) -> Self {
        let conn_id = uuid::Uuid::new_v4().to_string();
        tracing::info!(conn_id = %conn_id, user_id, chat_id, "WebSocket connected");

        let (tx, mut rx) = manager.add(conn_id.clone(), user_id, chat_id).await;
        let (mut sink, stream) = socket.split();

        // Sender task: forward channel messages to the WebSocket sink.
        let sender_conn_id = conn_id.clone();
        let send_task = tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                let closing = matches!(msg, Message::Close(_));
                if sink.send(msg).await.is_err() {
                    tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                    break;
                }
                if closing {
                    break;
                }
            }
        });

        Self {
            conn_id,
            manager,
            events: EventSender::new(tx),
            stream,
            send_task,
        }
    }

    pub fn events(&self) -> &EventSender {
        &self.events
    }

    /// Next text frame from the client, or `None` once the client closes or
    /// the connection fails. Control and binary frames are skipped.
    pub async fn next_text(&mut self) -> Option<String> {
        while let Some(result) = self.stream.next().await {
            match result {
                Ok(Message::Text(text)) => return Some(text.as_str().to_owned()),
                Ok(Message::Close(_)) => return None,
                Ok(Message::Pong(_)) => {
                    tracing::trace!(conn_id = %self.conn_id, "Pong received");
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(conn_id = %self.conn_id, error = %e, "WebSocket receive error");
                    return None;
                }
            }
        }
        None
    }

    /// Flush queued frames with a closing handshake, then unregister.
    pub async fn close(self) {
        let Self {
            conn_id,
            manager,
            events,
            send_task,
            ..
        } = self;

        manager.remove(&conn_id).await;
        // The manager's clone is gone, so dropping ours ends the sender task
        // after it drains the queue.
        let _ = events.close();
        drop(events);
        let abort = send_task.abort_handle();
        if tokio::time::timeout(CLOSE_TIMEOUT, send_task).await.is_err() {
            abort.abort();
            tracing::debug!(conn_id = %conn_id, "WebSocket sender did not drain in time");
        }
        tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
    }
}
