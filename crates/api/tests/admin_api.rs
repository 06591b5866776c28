//! Integration tests for admin user management and self-service profile
//! endpoints.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, delete_auth, get_auth, post_json, post_json_auth, put_json_auth,
    user_with_token, TEST_PASSWORD,
};
use deepchat_api::bootstrap::ensure_admin;
use deepchat_api::config::AdminBootstrap;
use deepchat_db::repositories::UserRepo;
use sqlx::PgPool;

fn new_user_body(username: &str) -> serde_json::Value {
    serde_json::json!({
        "username": username,
        "email": format!("{username}@example.com"),
        "password": "correct horse battery",
        "confirm_password": "correct horse battery",
    })
}

// ---------------------------------------------------------------------------
// Access
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn non_admin_is_forbidden(pool: PgPool) {
    let (_user, token) = user_with_token(&pool, "regular", false).await;

    let response = get_auth(build_test_app(pool.clone()), "/api/v1/admin/users", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json_auth(
        build_test_app(pool),
        "/api/v1/admin/users",
        &token,
        new_user_body("sneaky"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// Demotion takes effect before the admin's access token expires.
#[sqlx::test(migrations = "../../db/migrations")]
async fn demoted_admin_is_forbidden(pool: PgPool) {
    let (admin, token) = user_with_token(&pool, "formeradmin", true).await;

    let response = get_auth(build_test_app(pool.clone()), "/api/v1/admin/users", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    sqlx::query("UPDATE users SET is_admin = false WHERE id = $1")
        .bind(admin.id)
        .execute(&pool)
        .await
        .unwrap();

    let response = get_auth(build_test_app(pool), "/api/v1/admin/users", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["error"], "Admin access required");
}

// ---------------------------------------------------------------------------
// User management
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_creates_user_who_can_log_in(pool: PgPool) {
    let (_admin, token) = user_with_token(&pool, "root", true).await;

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/admin/users",
        &token,
        new_user_body("newbie"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["username"], "newbie");
    assert_eq!(json["role"], "user");

    let body = serde_json::json!({ "username": "newbie", "password": "correct horse battery" });
    let response = post_json(build_test_app(pool.clone()), "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(build_test_app(pool), "/api/v1/admin/users", &token).await;
    let users = body_json(response).await;
    assert_eq!(users.as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_username_conflicts(pool: PgPool) {
    let (_admin, token) = user_with_token(&pool, "root", true).await;

    let response = post_json_auth(
        build_test_app(pool),
        "/api/v1/admin/users",
        &token,
        new_user_body("root"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_user_validates_passwords(pool: PgPool) {
    let (_admin, token) = user_with_token(&pool, "root", true).await;

    let mut mismatch = new_user_body("typo");
    mismatch["confirm_password"] = "something else".into();
    let response =
        post_json_auth(build_test_app(pool.clone()), "/api/v1/admin/users", &token, mismatch).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Passwords do not match");

    let mut short = new_user_body("shorty");
    short["password"] = "abc".into();
    short["confirm_password"] = "abc".into();
    let response = post_json_auth(build_test_app(pool), "/api/v1/admin/users", &token, short).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_cannot_delete_self(pool: PgPool) {
    let (admin, token) = user_with_token(&pool, "root", true).await;

    let response = delete_auth(
        build_test_app(pool),
        &format!("/api/v1/admin/users/{}", admin.id),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleted_user_loses_access(pool: PgPool) {
    let (_admin, admin_token) = user_with_token(&pool, "root", true).await;
    let (user, user_token) = user_with_token(&pool, "doomed", false).await;

    let uri = format!("/api/v1/admin/users/{}", user.id);
    let response = delete_auth(build_test_app(pool.clone()), &uri, &admin_token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(build_test_app(pool.clone()), "/api/v1/user/profile", &user_token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = delete_auth(build_test_app(pool), &uri, &admin_token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn bootstrap_creates_admin_once(pool: PgPool) {
    let config = AdminBootstrap {
        username: "admin".into(),
        password: Some("bootstrap-secret".into()),
    };

    assert!(ensure_admin(&pool, &config).await.unwrap());
    assert!(!ensure_admin(&pool, &config).await.unwrap());

    let admin = UserRepo::find_by_username(&pool, "admin").await.unwrap().unwrap();
    assert!(admin.is_admin);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn bootstrap_without_password_is_skipped(pool: PgPool) {
    let config = AdminBootstrap {
        username: "admin".into(),
        password: None,
    };

    assert!(!ensure_admin(&pool, &config).await.unwrap());
    assert!(UserRepo::find_by_username(&pool, "admin").await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn profile_update_clears_blank_fields(pool: PgPool) {
    let (_user, token) = user_with_token(&pool, "profiled", false).await;

    let body = serde_json::json!({ "email": "", "full_name": "Ada Lovelace" });
    let response =
        put_json_auth(build_test_app(pool.clone()), "/api/v1/user/profile", &token, body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(build_test_app(pool), "/api/v1/user/profile", &token).await;
    let json = body_json(response).await;
    assert!(json["email"].is_null());
    assert_eq!(json["full_name"], "Ada Lovelace");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn change_password_checks_current(pool: PgPool) {
    let (_user, token) = user_with_token(&pool, "rotator", false).await;

    let body = serde_json::json!({
        "current_password": "not it",
        "new_password": "brand new secret",
        "confirm_password": "brand new secret",
    });
    let response =
        post_json_auth(build_test_app(pool.clone()), "/api/v1/user/password", &token, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = serde_json::json!({
        "current_password": TEST_PASSWORD,
        "new_password": "brand new secret",
        "confirm_password": "brand new secret",
    });
    let response =
        post_json_auth(build_test_app(pool.clone()), "/api/v1/user/password", &token, body).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let body = serde_json::json!({ "username": "rotator", "password": "brand new secret" });
    let response = post_json(build_test_app(pool), "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
}
