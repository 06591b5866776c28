//! Route definitions for the `/chats` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::chats;
use crate::state::AppState;

/// Routes mounted at `/chats`.
///
/// ```text
/// GET    /                 -> list_chats (?archived=true)
/// POST   /                 -> create_chat
/// GET    /{id}             -> get_chat
/// DELETE /{id}             -> delete_chat
/// PUT    /{id}/title       -> update_title
/// POST   /{id}/archive     -> archive_chat
/// POST   /{id}/restore     -> restore_chat
/// GET    /{id}/artifacts   -> list_chat_artifacts
/// GET    /{id}/export      -> export_chat
/// POST   /{id}/clear       -> clear_chat
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(chats::list_chats).post(chats::create_chat))
        .route("/{id}", get(chats::get_chat).delete(chats::delete_chat))
        .route("/{id}/title", put(chats::update_title))
        .route("/{id}/archive", post(chats::archive_chat))
        .route("/{id}/restore", post(chats::restore_chat))
        .route("/{id}/artifacts", get(chats::list_chat_artifacts))
        .route("/{id}/export", get(chats::export_chat))
        .route("/{id}/clear", post(chats::clear_chat))
}
