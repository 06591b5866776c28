//! Handlers for the `/auth` resource (login, refresh, logout).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use deepchat_core::error::CoreError;
use deepchat_core::login_policy::{is_locked, minutes_remaining};
use deepchat_core::roles::role_name;
use deepchat_db::models::session::CreateSession;
use deepchat_db::models::user::{User, UserResponse};
use deepchat_db::repositories::{SessionRepo, UserRepo};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::client_info::ClientInfo;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Successful authentication response returned by login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized(
        "Invalid username or password".into(),
    ))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Authenticate with username + password. Returns access and refresh tokens
/// and records a login session carrying the caller's IP and user agent.
pub async fn login(
    State(state): State<AppState>,
    client: ClientInfo,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = UserRepo::find_by_username(&state.pool, input.username.trim())
        .await?
        .ok_or_else(invalid_credentials)?;

    let now = Utc::now();
    if let Some(locked_until) = user.locked_until {
        if is_locked(Some(locked_until), now) {
            tracing::warn!(user_id = user.id, "Login attempt on locked account");
            return Err(AppError::Core(CoreError::AccountLocked {
                minutes: minutes_remaining(locked_until, now),
            }));
        }
    }

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        let failure = UserRepo::record_failed_login(&state.pool, user.id).await?;

        if failure.lock_until.is_some() {
            tracing::warn!(
                user_id = user.id,
                attempts = failure.failed_login_count,
                "Account locked after repeated failed logins",
            );
        }
        return Err(invalid_credentials());
    }

    UserRepo::record_successful_login(&state.pool, user.id).await?;
    tracing::info!(user_id = user.id, ip = ?client.ip_address, "User logged in");

    let response = create_auth_response(&state, user, client).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a valid refresh token for new access + refresh tokens. The old
/// session is revoked and a fresh one keeps the original client details.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let token_hash = hash_refresh_token(&input.refresh_token);

    let invalid = || {
        AppError::Core(CoreError::Unauthorized(
            "Invalid or expired refresh token".into(),
        ))
    };

    let session = SessionRepo::find_by_refresh_token_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(invalid)?;

    // Token rotation. Only the request that flips `is_revoked` may mint new
    // tokens; a concurrent replay of the same refresh token loses here.
    if !SessionRepo::revoke(&state.pool, session.id).await? {
        tracing::warn!(session_id = session.id, "Refresh token reused concurrently");
        return Err(invalid());
    }

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    let client = ClientInfo {
        ip_address: session.ip_address,
        user_agent: session.user_agent,
    };
    let response = create_auth_response(&state, user, client).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/logout
///
/// Revoke the session the access token belongs to. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    SessionRepo::revoke_by_key(&state.pool, auth_user.user_id, auth_user.session_key).await?;
    tracing::info!(user_id = auth_user.user_id, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Generate access + refresh tokens, persist a session row, and build the response.
async fn create_auth_response(
    state: &AppState,
    user: User,
    client: ClientInfo,
) -> AppResult<AuthResponse> {
    let jwt = &state.config.jwt;
    let session_key = Uuid::new_v4();
    let role = role_name(user.is_admin);

    let access_token = generate_access_token(user.id, role, session_key, jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh_plaintext, refresh_hash) = generate_refresh_token();

    let session_input = CreateSession {
        session_key,
        user_id: user.id,
        refresh_token_hash: refresh_hash,
        expires_at: Utc::now() + chrono::Duration::hours(jwt.session_expiry_hours),
        ip_address: client.ip_address,
        user_agent: client.user_agent,
    };
    SessionRepo::create(&state.pool, &session_input).await?;

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh_plaintext,
        token_type: "bearer",
        expires_in: jwt.access_token_expiry_mins * 60,
        user: UserResponse::from(user),
    })
}
