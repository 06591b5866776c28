//! Integration tests for the `/chats` and `/github/import` endpoints.

mod common;

use axum::http::{header, StatusCode};
use common::{
    body_json, build_test_app, delete_auth, get_auth, post_auth, post_json_auth, put_json_auth,
    user_with_token,
};
use deepchat_core::models::DEFAULT_MODEL;
use deepchat_db::models::artifact::CreateArtifact;
use deepchat_db::models::message::CreateMessage;
use deepchat_db::repositories::{ArtifactRepo, MessageRepo};
use sqlx::PgPool;

async fn create_chat(pool: &PgPool, token: &str, body: serde_json::Value) -> serde_json::Value {
    let response = post_json_auth(build_test_app(pool.clone()), "/api/v1/chats", token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_chat_applies_defaults(pool: PgPool) {
    let (user, token) = user_with_token(&pool, "chatter", false).await;

    let chat = create_chat(&pool, &token, serde_json::json!({})).await;

    assert_eq!(chat["title"], "New Chat");
    assert_eq!(chat["model"], DEFAULT_MODEL);
    assert_eq!(chat["user_id"], user.id);
    assert_eq!(chat["is_archived"], false);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn get_chat_includes_transcript_and_artifacts(pool: PgPool) {
    let (_user, token) = user_with_token(&pool, "reader", false).await;
    let chat = create_chat(&pool, &token, serde_json::json!({ "title": "Parsing" })).await;
    let id = chat["id"].as_i64().unwrap();

    let body = serde_json::json!({
        "chat_id": id,
        "title": "lexer.rs",
        "content": "fn lex() {}",
        "language": "rust",
    });
    let response = post_json_auth(build_test_app(pool.clone()), "/api/v1/artifacts", &token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = get_auth(build_test_app(pool), &format!("/api/v1/chats/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], id);
    assert_eq!(json["data"]["title"], "Parsing");
    assert_eq!(json["data"]["messages"].as_array().unwrap().len(), 0);
    let artifacts = json["data"]["artifacts"].as_array().unwrap();
    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts[0]["title"], "lexer.rs");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn foreign_chat_is_not_found(pool: PgPool) {
    let (_owner, owner_token) = user_with_token(&pool, "owner", false).await;
    let (_other, other_token) = user_with_token(&pool, "intruder", false).await;
    let chat = create_chat(&pool, &owner_token, serde_json::json!({})).await;
    let id = chat["id"].as_i64().unwrap();

    let uri = format!("/api/v1/chats/{id}");
    let response = get_auth(build_test_app(pool.clone()), &uri, &other_token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = serde_json::json!({ "title": "Mine now" });
    let response =
        put_json_auth(build_test_app(pool.clone()), &format!("{uri}/title"), &other_token, body).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete_auth(build_test_app(pool.clone()), &uri, &other_token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Still intact for the owner.
    let response = get_auth(build_test_app(pool), &uri, &owner_token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rename_requires_non_empty_title(pool: PgPool) {
    let (_user, token) = user_with_token(&pool, "renamer", false).await;
    let chat = create_chat(&pool, &token, serde_json::json!({})).await;
    let uri = format!("/api/v1/chats/{}/title", chat["id"]);

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &uri,
        &token,
        serde_json::json!({ "title": "   " }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let response = put_json_auth(
        build_test_app(pool),
        &uri,
        &token,
        serde_json::json!({ "title": "  Borrow checker  " }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["title"], "Borrow checker");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn archive_moves_chat_between_lists(pool: PgPool) {
    let (_user, token) = user_with_token(&pool, "archivist", false).await;
    let chat = create_chat(&pool, &token, serde_json::json!({})).await;
    let id = chat["id"].as_i64().unwrap();

    let response = post_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/chats/{id}/archive"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["is_archived"], true);

    let response = get_auth(build_test_app(pool.clone()), "/api/v1/chats", &token).await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 0);

    let response =
        get_auth(build_test_app(pool.clone()), "/api/v1/chats?archived=true", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["id"], id);

    let response = post_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/chats/{id}/restore"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(build_test_app(pool), "/api/v1/chats", &token).await;
    assert_eq!(body_json(response).await["data"][0]["id"], id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_chat_removes_it(pool: PgPool) {
    let (_user, token) = user_with_token(&pool, "deleter", false).await;
    let chat = create_chat(&pool, &token, serde_json::json!({})).await;
    let uri = format!("/api/v1/chats/{}", chat["id"]);

    let response = delete_auth(build_test_app(pool.clone()), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(build_test_app(pool), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

async fn add_message(pool: &PgPool, chat_id: i64, role: &str, content: &str) -> i64 {
    let input = CreateMessage {
        chat_id,
        role,
        content,
    };
    MessageRepo::create(pool, &input).await.unwrap().id
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn export_returns_transcript_as_attachment(pool: PgPool) {
    let (_user, token) = user_with_token(&pool, "exporter", false).await;
    let chat = create_chat(&pool, &token, serde_json::json!({ "title": "Lifetimes" })).await;
    let id = chat["id"].as_i64().unwrap();
    add_message(&pool, id, "user", "what is 'a?").await;
    add_message(&pool, id, "assistant", "a lifetime parameter").await;

    let uri = format!("/api/v1/chats/{id}/export");
    let response = get_auth(build_test_app(pool), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        format!("attachment; filename=\"chat-{id}.json\"").as_str()
    );

    let json = body_json(response).await;
    assert_eq!(json["chat_id"], id);
    assert_eq!(json["title"], "Lifetimes");
    assert_eq!(json["model"], DEFAULT_MODEL);
    assert!(json["exported_at"].is_string());
    assert_eq!(json["message_count"], 2);
    assert_eq!(json["messages"][0]["role"], "user");
    assert_eq!(json["messages"][1]["content"], "a lifetime parameter");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn clear_removes_messages_but_keeps_artifacts(pool: PgPool) {
    let (user, token) = user_with_token(&pool, "clearer", false).await;
    let chat = create_chat(&pool, &token, serde_json::json!({})).await;
    let id = chat["id"].as_i64().unwrap();
    add_message(&pool, id, "user", "hi").await;
    let reply = add_message(&pool, id, "assistant", "```py\nprint(1)\n```").await;
    let artifact = ArtifactRepo::create(
        &pool,
        &CreateArtifact {
            chat_id: id,
            message_id: Some(reply),
            title: "Code Snippet 1 (py)".to_string(),
            content: "print(1)".to_string(),
            content_type: "text/plain".to_string(),
            language: Some("py".to_string()),
        },
    )
    .await
    .unwrap();

    let uri = format!("/api/v1/chats/{id}/clear");
    let response = post_auth(build_test_app(pool.clone()), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["deleted_count"], 2);
    assert_eq!(json["message"], "Cleared 2 messages");

    assert!(MessageRepo::list_for_chat(&pool, id).await.unwrap().is_empty());
    let kept = ArtifactRepo::find_owned(&pool, artifact.id, user.id)
        .await
        .unwrap()
        .unwrap();
    assert!(kept.message_id.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn export_and_clear_are_scoped_to_owner(pool: PgPool) {
    let (_owner, owner_token) = user_with_token(&pool, "keeper", false).await;
    let (_other, other_token) = user_with_token(&pool, "meddler", false).await;
    let chat = create_chat(&pool, &owner_token, serde_json::json!({})).await;
    let id = chat["id"].as_i64().unwrap();
    add_message(&pool, id, "user", "private").await;

    let uri = format!("/api/v1/chats/{id}/export");
    let response = get_auth(build_test_app(pool.clone()), &uri, &other_token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let uri = format!("/api/v1/chats/{id}/clear");
    let response = post_auth(build_test_app(pool.clone()), &uri, &other_token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(MessageRepo::list_for_chat(&pool, id).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn github_import_creates_titled_chat(pool: PgPool) {
    let (_user, token) = user_with_token(&pool, "importer", false).await;

    let body = serde_json::json!({ "github_url": "https://github.com/tokio-rs/axum" });
    let response =
        post_json_auth(build_test_app(pool.clone()), "/api/v1/github/import", &token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"]["title"], "tokio-rs/axum");

    let body = serde_json::json!({
        "github_url": "https://github.com/tokio-rs/axum",
        "title": "Axum review",
    });
    let response =
        post_json_auth(build_test_app(pool.clone()), "/api/v1/github/import", &token, body).await;
    assert_eq!(body_json(response).await["data"]["title"], "Axum review");

    let body = serde_json::json!({ "github_url": "https://gitlab.com/a/b" });
    let response = post_json_auth(build_test_app(pool), "/api/v1/github/import", &token, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn socket_routes_require_token(pool: PgPool) {
    let (_owner, token) = user_with_token(&pool, "sockowner", false).await;
    let chat = create_chat(&pool, &token, serde_json::json!({})).await;
    let id = chat["id"].as_i64().unwrap();

    for uri in [format!("/api/v1/ws/chat/{id}"), format!("/api/v1/ws/github/{id}")] {
        let response = common::get(build_test_app(pool.clone()), &uri).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
