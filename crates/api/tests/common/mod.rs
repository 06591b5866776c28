#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use deepchat_api::auth::jwt::JwtConfig;
use deepchat_api::auth::password::hash_password;
use deepchat_api::config::{AdminBootstrap, GithubConfig, OllamaConfig, ServerConfig};
use deepchat_api::router::build_app_router;
use deepchat_api::state::AppState;
use deepchat_api::ws::WsManager;
use deepchat_core::models::DEFAULT_MODEL;
use deepchat_core::rate_limit::RateLimiter;
use deepchat_db::models::user::{CreateUser, User};
use deepchat_db::repositories::UserRepo;
use deepchat_github::{GithubClient, RepositorySource};
use deepchat_ollama::{GenerateOptions, OllamaClient};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower::ServiceExt;

/// Password given to every user created by [`create_user`].
pub const TEST_PASSWORD: &str = "test_password_123!";

/// Nothing listens here, so model listing falls back to the built-in catalog.
const UNREACHABLE_OLLAMA: &str = "http://127.0.0.1:9";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry_mins: 15,
            session_expiry_hours: 24,
        },
        ollama: OllamaConfig {
            url: UNREACHABLE_OLLAMA.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            options: GenerateOptions::default(),
            timeout_secs: 2,
        },
        github: GithubConfig {
            token: None,
            max_files: 30,
            context_limit: 12_000,
        },
        rate_limit_messages_per_minute: 10,
        admin: AdminBootstrap {
            username: "admin".to_string(),
            password: None,
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
///
/// Goes through [`build_app_router`] so integration tests exercise the same
/// middleware stack (CORS, request ID, timeout, tracing, panic recovery)
/// that production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, TestBackends::default())
}

/// Outside services for tests that need more than the HTTP surface.
pub struct TestBackends {
    /// Base URL of the inference server.
    pub ollama_url: String,
    /// Where GitHub imports fetch from.
    pub repositories: Arc<dyn RepositorySource>,
    pub messages_per_minute: u32,
}

impl Default for TestBackends {
    fn default() -> Self {
        Self {
            ollama_url: UNREACHABLE_OLLAMA.to_string(),
            repositories: Arc::new(GithubClient::new(None).unwrap()),
            messages_per_minute: test_config().rate_limit_messages_per_minute,
        }
    }
}

/// [`build_test_app`] against the given backends.
pub fn build_test_app_with(pool: PgPool, backends: TestBackends) -> Router {
    let mut config = test_config();
    config.ollama.url = backends.ollama_url;
    config.rate_limit_messages_per_minute = backends.messages_per_minute;

    let ollama = OllamaClient::new(
        config.ollama.url.clone(),
        Duration::from_secs(config.ollama.timeout_secs),
        config.ollama.options,
    )
    .unwrap();

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        ws_manager: Arc::new(WsManager::new()),
        ollama: Arc::new(ollama),
        repositories: backends.repositories,
        rate_limiter: Arc::new(RateLimiter::new(config.rate_limit_messages_per_minute)),
    };

    build_app_router(state, &config)
}

/// Serve `app` on an ephemeral local port, for clients that need a real
/// connection (WebSockets, streamed bodies).
pub async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a user with [`TEST_PASSWORD`] directly into the database.
pub async fn create_user(pool: &PgPool, username: &str, is_admin: bool) -> User {
    let input = CreateUser {
        username: username.to_string(),
        email: Some(format!("{username}@test.com")),
        full_name: None,
        password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
        is_admin,
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

/// Log in through the API and return the full auth response body.
pub async fn login(pool: &PgPool, username: &str) -> serde_json::Value {
    let body = serde_json::json!({ "username": username, "password": TEST_PASSWORD });
    let response = post_json(build_test_app(pool.clone()), "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), 200, "login for {username} should succeed");
    body_json(response).await
}

/// Create a user, log in, and return the user with its access token.
pub async fn user_with_token(pool: &PgPool, username: &str, is_admin: bool) -> (User, String) {
    let user = create_user(pool, username, is_admin).await;
    let json = login(pool, username).await;
    let token = json["access_token"].as_str().unwrap().to_string();
    (user, token)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
