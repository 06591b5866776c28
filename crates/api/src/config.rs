use std::str::FromStr;

use deepchat_core::models::DEFAULT_MODEL;
use deepchat_core::rate_limit::DEFAULT_MESSAGES_PER_MINUTE;
use deepchat_github::format::DEFAULT_CONTEXT_LIMIT;
use deepchat_github::select::DEFAULT_MAX_FILES;
use deepchat_ollama::GenerateOptions;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Upper bound on post-shutdown cleanup in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    /// Inference server settings.
    pub ollama: OllamaConfig,
    /// Repository import settings.
    pub github: GithubConfig,
    /// Chat messages a user may send per minute; `0` disables the limit.
    pub rate_limit_messages_per_minute: u32,
    /// Default administrator created at start up when missing.
    pub admin: AdminBootstrap,
}

/// Inference server connection and sampling settings.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Base URL, e.g. `http://localhost:11434`.
    pub url: String,
    /// Model used for new chats when the client does not pick one.
    pub default_model: String,
    pub options: GenerateOptions,
    /// Whole-request timeout including the streamed body.
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct GithubConfig {
    /// Optional token for the higher authenticated rate limit.
    pub token: Option<String>,
    pub max_files: usize,
    /// Character budget for the code section of the analysis prompt.
    pub context_limit: usize,
}

#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub username: String,
    /// No admin is created when unset.
    pub password: Option<String>,
}

/// Read `key`, falling back to `default`, and parse it.
///
/// # Panics
///
/// Panics with a message naming the variable when the value does not parse.
fn env_or<T>(key: &str, default: &str) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse()
        .unwrap_or_else(|e| panic!("{key} must be a valid {}: {e}", std::any::type_name::<T>()))
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default                              |
    /// |----------------------------------|--------------------------------------|
    /// | `HOST`                           | `0.0.0.0`                            |
    /// | `PORT`                           | `3000`                               |
    /// | `CORS_ORIGINS`                   | `http://localhost:5173`              |
    /// | `REQUEST_TIMEOUT_SECS`           | `30`                                 |
    /// | `SHUTDOWN_TIMEOUT_SECS`          | `30`                                 |
    /// | `OLLAMA_URL`                     | `http://localhost:11434`             |
    /// | `MODEL_NAME`                     | `deepseek-coder:33b-instruct-q5_K_M` |
    /// | `MODEL_TEMPERATURE`              | `0.7`                                |
    /// | `MODEL_TOP_P`                    | `0.9`                                |
    /// | `MODEL_MAX_TOKENS`               | `2048`                               |
    /// | `MODEL_TIMEOUT_SECS`             | `300`                                |
    /// | `GITHUB_TOKEN`                   | unset                                |
    /// | `GITHUB_MAX_FILES`               | `30`                                 |
    /// | `GITHUB_CONTEXT_LIMIT`           | `12000`                              |
    /// | `RATE_LIMIT_MESSAGES_PER_MINUTE` | `10`                                 |
    /// | `ADMIN_USERNAME`                 | `admin`                              |
    /// | `ADMIN_PASSWORD`                 | unset                                |
    ///
    /// JWT settings are documented on [`JwtConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = env_or("PORT", "3000");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", "30");
        let shutdown_timeout_secs: u64 = env_or("SHUTDOWN_TIMEOUT_SECS", "30");

        let defaults = GenerateOptions::default();
        let ollama = OllamaConfig {
            url: std::env::var("OLLAMA_URL").unwrap_or_else(|_| "http://localhost:11434".into()),
            default_model: env_opt("MODEL_NAME").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            options: GenerateOptions {
                temperature: env_or("MODEL_TEMPERATURE", &defaults.temperature.to_string()),
                top_p: env_or("MODEL_TOP_P", &defaults.top_p.to_string()),
                num_predict: env_or("MODEL_MAX_TOKENS", &defaults.num_predict.to_string()),
            },
            timeout_secs: env_or("MODEL_TIMEOUT_SECS", "300"),
        };

        let github = GithubConfig {
            token: env_opt("GITHUB_TOKEN"),
            max_files: env_or("GITHUB_MAX_FILES", &DEFAULT_MAX_FILES.to_string()),
            context_limit: env_or("GITHUB_CONTEXT_LIMIT", &DEFAULT_CONTEXT_LIMIT.to_string()),
        };

        let rate_limit_messages_per_minute: u32 = env_or(
            "RATE_LIMIT_MESSAGES_PER_MINUTE",
            &DEFAULT_MESSAGES_PER_MINUTE.to_string(),
        );

        let admin = AdminBootstrap {
            username: env_opt("ADMIN_USERNAME").unwrap_or_else(|| "admin".into()),
            password: env_opt("ADMIN_PASSWORD"),
        };

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt,
            ollama,
            github,
            rate_limit_messages_per_minute,
            admin,
        }
    }
}
