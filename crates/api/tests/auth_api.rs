//! HTTP-level integration tests for login, token refresh, logout, lockout,
//! and session management.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, create_user, get, get_auth, login, post_auth, post_json,
    post_json_auth, user_with_token, TEST_PASSWORD,
};
use deepchat_core::login_policy::MAX_FAILED_ATTEMPTS;
use deepchat_db::repositories::{SessionRepo, UserRepo};
use futures::future::join_all;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

/// Successful login returns 200 with tokens and user info.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_success(pool: PgPool) {
    let user = create_user(&pool, "loginuser", false).await;

    let json = login(&pool, "loginuser").await;

    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["token_type"], "bearer");
    assert!(json["expires_in"].is_number());
    assert_eq!(json["user"]["id"], user.id);
    assert_eq!(json["user"]["username"], "loginuser");
    assert_eq!(json["user"]["role"], "user");
    assert!(json["user"].get("password_hash").is_none());
}

/// Wrong password and unknown user give the same 401.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_rejects_bad_credentials(pool: PgPool) {
    create_user(&pool, "wrongpw", false).await;

    let body = serde_json::json!({ "username": "wrongpw", "password": "incorrect" });
    let response = post_json(build_test_app(pool.clone()), "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let wrong_password = body_json(response).await;

    let body = serde_json::json!({ "username": "ghost", "password": "whatever" });
    let response = post_json(build_test_app(pool), "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let unknown_user = body_json(response).await;

    assert_eq!(wrong_password["error"], unknown_user["error"]);
    assert_eq!(wrong_password["code"], "UNAUTHORIZED");
}

/// Five failed attempts lock the account; even the right password is then refused.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_lockout_after_repeated_failures(pool: PgPool) {
    let user = create_user(&pool, "locked", false).await;

    for _ in 0..MAX_FAILED_ATTEMPTS {
        let body = serde_json::json!({ "username": "locked", "password": "nope" });
        let response = post_json(build_test_app(pool.clone()), "/api/v1/auth/login", body).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let stored = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(stored.failed_login_count, MAX_FAILED_ATTEMPTS);
    assert!(stored.locked_until.is_some());

    let body = serde_json::json!({ "username": "locked", "password": TEST_PASSWORD });
    let response = post_json(build_test_app(pool), "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["code"], "ACCOUNT_LOCKED");
    assert_eq!(json["error"], "Account is locked. Try again in 15 minutes.");
}

/// Failures that arrive together are all counted, so a burst of wrong
/// passwords still locks the account.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_failures_all_count(pool: PgPool) {
    let user = create_user(&pool, "burst", false).await;
    let attempts = MAX_FAILED_ATTEMPTS + 3;

    let requests = (0..attempts).map(|_| {
        let body = serde_json::json!({ "username": "burst", "password": "nope" });
        post_json(build_test_app(pool.clone()), "/api/v1/auth/login", body)
    });
    let responses = join_all(requests).await;

    // Requests that saw the lock get 403 and are not counted.
    let mut rejected = 0;
    for response in responses {
        match response.status() {
            StatusCode::UNAUTHORIZED => rejected += 1,
            StatusCode::FORBIDDEN => {}
            other => panic!("unexpected status {other}"),
        }
    }

    let stored = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(stored.failed_login_count, rejected);
    assert!(rejected >= MAX_FAILED_ATTEMPTS);
    assert!(stored.locked_until.is_some());
}

/// A successful login clears earlier failures.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_successful_login_resets_failures(pool: PgPool) {
    let user = create_user(&pool, "forgetful", false).await;

    let body = serde_json::json!({ "username": "forgetful", "password": "nope" });
    post_json(build_test_app(pool.clone()), "/api/v1/auth/login", body).await;
    login(&pool, "forgetful").await;

    let stored = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(stored.failed_login_count, 0);
    assert!(stored.last_login_at.is_some());
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// Requests without a token are rejected.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_protected_route_requires_token(pool: PgPool) {
    let response = get(build_test_app(pool), "/api/v1/user/profile").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// The token may also be given as a query parameter (used by WebSocket clients).
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_token_accepted_from_query(pool: PgPool) {
    let (_user, token) = user_with_token(&pool, "querytoken", false).await;

    let uri = format!("/api/v1/user/profile?access_token={token}");
    let response = get(build_test_app(pool), &uri).await;
    assert_eq!(response.status(), StatusCode::OK);
}

/// A refresh token rotates: the new one works and the old one is dead.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_token_refresh_rotates(pool: PgPool) {
    create_user(&pool, "refresher", false).await;
    let login_json = login(&pool, "refresher").await;
    let refresh_token = login_json["refresh_token"].as_str().unwrap();

    let body = serde_json::json!({ "refresh_token": refresh_token });
    let response = post_json(build_test_app(pool.clone()), "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_ne!(json["refresh_token"].as_str().unwrap(), refresh_token);

    // The old access token belonged to the revoked session.
    let old_access = login_json["access_token"].as_str().unwrap();
    let response = get_auth(build_test_app(pool.clone()), "/api/v1/user/profile", old_access).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = serde_json::json!({ "refresh_token": refresh_token });
    let response = post_json(build_test_app(pool), "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Two refreshes racing on one token: exactly one wins and only one new
/// session is created.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_refresh_mints_once(pool: PgPool) {
    let user = create_user(&pool, "racer", false).await;
    let login_json = login(&pool, "racer").await;
    let refresh_token = login_json["refresh_token"].as_str().unwrap().to_string();

    let requests = (0..2).map(|_| {
        let body = serde_json::json!({ "refresh_token": refresh_token });
        post_json(build_test_app(pool.clone()), "/api/v1/auth/refresh", body)
    });
    let statuses: Vec<StatusCode> = join_all(requests)
        .await
        .into_iter()
        .map(|r| r.status())
        .collect();

    let ok = statuses.iter().filter(|s| **s == StatusCode::OK).count();
    let rejected = statuses
        .iter()
        .filter(|s| **s == StatusCode::UNAUTHORIZED)
        .count();
    assert_eq!((ok, rejected), (1, 1), "statuses: {statuses:?}");

    let active = SessionRepo::list_active_for_user(&pool, user.id).await.unwrap();
    assert_eq!(active.len(), 1);
}

/// Refreshing with a garbage token returns 401.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_refresh_with_invalid_token(pool: PgPool) {
    let body = serde_json::json!({ "refresh_token": "not-a-real-token" });
    let response = post_json(build_test_app(pool), "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Logout revokes the session, so the same access token stops working.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_logout_revokes_access_token(pool: PgPool) {
    let (_user, token) = user_with_token(&pool, "leaver", false).await;

    let response = post_auth(build_test_app(pool.clone()), "/api/v1/auth/logout", &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(build_test_app(pool), "/api/v1/user/profile", &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// Each login is listed; the caller's own session is flagged.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_sessions_flags_current(pool: PgPool) {
    let (_user, token) = user_with_token(&pool, "multi", false).await;
    login(&pool, "multi").await;

    let response = get_auth(build_test_app(pool), "/api/v1/sessions", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let sessions = json["data"].as_array().unwrap();
    assert_eq!(sessions.len(), 2);
    assert_eq!(
        sessions.iter().filter(|s| s["is_current"] == true).count(),
        1
    );
}

/// The current session cannot be revoked through `/sessions/revoke`.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_revoke_current_session_rejected(pool: PgPool) {
    let (_user, token) = user_with_token(&pool, "selfrevoke", false).await;

    let response = get_auth(build_test_app(pool.clone()), "/api/v1/sessions", &token).await;
    let json = body_json(response).await;
    let key = json["data"][0]["session_key"].clone();

    let body = serde_json::json!({ "session_key": key });
    let response =
        post_json_auth(build_test_app(pool), "/api/v1/sessions/revoke", &token, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Revoking another session kills its tokens; unknown keys are a 404.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_revoke_other_session(pool: PgPool) {
    let (_user, token) = user_with_token(&pool, "twodevices", false).await;
    let other = login(&pool, "twodevices").await;
    let other_token = other["access_token"].as_str().unwrap();

    let response = get_auth(build_test_app(pool.clone()), "/api/v1/sessions", &token).await;
    let json = body_json(response).await;
    let other_key = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["is_current"] == false)
        .unwrap()["session_key"]
        .clone();

    let body = serde_json::json!({ "session_key": other_key });
    let response =
        post_json_auth(build_test_app(pool.clone()), "/api/v1/sessions/revoke", &token, body).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["revoked"], 1);

    let response = get_auth(build_test_app(pool.clone()), "/api/v1/user/profile", other_token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = serde_json::json!({ "session_key": uuid::Uuid::new_v4() });
    let response =
        post_json_auth(build_test_app(pool), "/api/v1/sessions/revoke", &token, body).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// `revoke-all` keeps only the calling session.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_revoke_all_other_sessions(pool: PgPool) {
    let (_user, token) = user_with_token(&pool, "many", false).await;
    login(&pool, "many").await;
    login(&pool, "many").await;

    let response = post_auth(build_test_app(pool.clone()), "/api/v1/sessions/revoke-all", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["revoked"], 2);

    let response = get_auth(build_test_app(pool), "/api/v1/sessions", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}
