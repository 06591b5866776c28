use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use deepchat_core::rate_limit::RateLimiter;
use deepchat_github::GithubClient;
use deepchat_ollama::OllamaClient;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use deepchat_api::config::ServerConfig;
use deepchat_api::{background, bootstrap, router, state, ws};

use state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "deepchat_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = deepchat_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    deepchat_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    deepchat_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    bootstrap::ensure_admin(&pool, &config.admin)
        .await
        .expect("Failed to provision default admin");

    // --- Upstream clients ---
    let ollama = OllamaClient::new(
        config.ollama.url.clone(),
        Duration::from_secs(config.ollama.timeout_secs),
        config.ollama.options,
    )
    .expect("Failed to build Ollama client");
    tracing::info!(
        url = %ollama.base_url(),
        model = %config.ollama.default_model,
        "Ollama client ready"
    );

    let github =
        GithubClient::new(config.github.token.clone()).expect("Failed to build GitHub client");

    // --- WebSocket manager ---
    let ws_manager = Arc::new(ws::WsManager::new());

    // --- Background tasks ---
    let rate_limiter = Arc::new(RateLimiter::new(config.rate_limit_messages_per_minute));
    let background_cancel = CancellationToken::new();
    let heartbeat_handle = tokio::spawn(background::socket_heartbeat::run(
        Arc::clone(&ws_manager),
        background::socket_heartbeat::PING_INTERVAL,
        background_cancel.clone(),
    ));
    let cleanup_handle = tokio::spawn(background::session_cleanup::run(
        pool.clone(),
        Arc::clone(&rate_limiter),
        background_cancel.clone(),
    ));

    // --- App state ---
    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        ws_manager: Arc::clone(&ws_manager),
        ollama: Arc::new(ollama),
        repositories: Arc::new(github),
        rate_limiter,
    };

    let app = router::build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");
    let cleanup = async {
        background_cancel.cancel();
        let _ = tokio::join!(cleanup_handle, heartbeat_handle);
        tracing::info!("Background tasks stopped");

        let ws_count = ws_manager.connection_count().await;
        tracing::info!(ws_count, "Closing remaining WebSocket connections");
        ws_manager.shutdown_all().await;

        pool.close().await;
        tracing::info!("Database pool closed");
    };

    let limit = Duration::from_secs(config.shutdown_timeout_secs);
    if tokio::time::timeout(limit, cleanup).await.is_err() {
        tracing::warn!(timeout_secs = limit.as_secs(), "Cleanup timed out");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
