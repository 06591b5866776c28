pub mod admin;
pub mod artifacts;
pub mod auth;
pub mod chats;
pub mod health;
pub mod sessions;
pub mod user;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                      login (public)
/// /auth/refresh                    refresh (public)
/// /auth/logout                     logout
///
/// /user/profile                    get, update
/// /user/password                   change password (POST)
///
/// /sessions                        list active sessions
/// /sessions/revoke                 revoke one session (POST)
/// /sessions/revoke-all             revoke all other sessions (POST)
///
/// /admin/users                     list, create (admin only)
/// /admin/users/{id}                delete (admin only)
///
/// /models                          available models
///
/// /chats                           list (?archived=), create
/// /chats/{id}                      get, delete
/// /chats/{id}/title                rename (PUT)
/// /chats/{id}/archive              archive (POST)
/// /chats/{id}/restore              restore (POST)
/// /chats/{id}/artifacts            artifact summaries
///
/// /artifacts                       create (POST)
/// /artifacts/{id}/download         download as attachment
///
/// /github/import                   create import chat (POST)
///
/// /ws/chat/{chat_id}               chat WebSocket
/// /ws/github/{chat_id}             GitHub analysis WebSocket
/// ```
///
/// Everything except login and refresh requires a bearer token.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // WebSocket endpoints.
        .route("/ws/chat/{chat_id}", get(ws::chat_ws))
        .route("/ws/github/{chat_id}", get(ws::github_ws))
        .nest("/auth", auth::router())
        .nest("/user", user::router())
        .nest("/sessions", sessions::router())
        .nest("/admin", admin::router())
        .route("/models", get(handlers::models::list_models))
        .nest("/chats", chats::router())
        .nest("/artifacts", artifacts::router())
        .route("/github/import", post(handlers::github::import_repository))
}
