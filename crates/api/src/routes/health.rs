//! `GET /health`.
//!
//! A chat reply needs both PostgreSQL and the Ollama server, so both are
//! checked on every call. The endpoint always answers 200; `status` says
//! whether replies can currently be generated.

use std::time::Duration;

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Upper bound for the Ollama check. The client's own timeout is sized for
/// whole generations.
const OLLAMA_CHECK_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when both backends answer, `degraded` otherwise.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Whether the inference server answered a model listing.
    pub ollama_reachable: bool,
    /// Chat and import sockets currently open.
    pub open_sockets: usize,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (db, ollama) = tokio::join!(
        deepchat_db::health_check(&state.pool),
        tokio::time::timeout(OLLAMA_CHECK_TIMEOUT, state.ollama.list_models()),
    );
    let db_healthy = db.is_ok();
    let ollama_reachable = matches!(ollama, Ok(Ok(_)));

    let status = if db_healthy && ollama_reachable {
        "ok"
    } else {
        tracing::warn!(db_healthy, ollama_reachable, "Health check degraded");
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        ollama_reachable,
        open_sockets: state.ws_manager.connection_count().await,
    })
}

/// Mounted at the root, outside `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
