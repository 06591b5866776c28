use std::sync::Arc;

use deepchat_core::rate_limit::RateLimiter;
use deepchat_github::RepositorySource;
use deepchat_ollama::OllamaClient;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: deepchat_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (browser clients).
    pub ws_manager: Arc<WsManager>,
    /// Inference server client.
    pub ollama: Arc<OllamaClient>,
    /// Where GitHub imports fetch repository contents from.
    pub repositories: Arc<dyn RepositorySource>,
    /// Per-user chat message limiter.
    pub rate_limiter: Arc<RateLimiter>,
}
