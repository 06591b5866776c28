//! WebSocket infrastructure for streaming chat replies.
//!
//! Provides connection management, the frame protocol and the two socket
//! flows (chat and GitHub import). Keep-alive pings live in
//! [`crate::background::socket_heartbeat`].

pub mod chat;
mod connection;
pub mod generation;
pub mod github;
pub mod manager;
pub mod protocol;

pub use chat::chat_ws;
pub use github::github_ws;
pub use manager::WsManager;
