//! Handlers for the `/admin` resource (user management).
//!
//! All handlers require a current admin via [`RequireAdmin`].

use axum::extract::ws::Message;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use deepchat_core::error::CoreError;
use deepchat_core::types::DbId;
use deepchat_db::models::user::{CreateUser, UserResponse};
use deepchat_db::repositories::UserRepo;
use serde::Deserialize;
use validator::Validate;

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::error::{AppError, AppResult};
use crate::middleware::admin::RequireAdmin;
use crate::state::AppState;

/// Request body for `POST /admin/users`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 50, message = "must be 3 to 50 characters"))]
    pub username: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 100))]
    pub full_name: Option<String>,
    pub password: String,
    pub confirm_password: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// POST /api/v1/admin/users
///
/// Register a new user. Returns 201 Created; a taken username is a 409.
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin { admin, .. }: RequireAdmin,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let input = CreateUserRequest {
        username: input.username.trim().to_string(),
        email: input.email.filter(|e| !e.trim().is_empty()),
        full_name: input.full_name.filter(|n| !n.trim().is_empty()),
        ..input
    };
    input.validate()?;

    if input.password != input.confirm_password {
        return Err(AppError::Core(CoreError::Validation(
            "Passwords do not match".into(),
        )));
    }
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let hashed = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let create_dto = CreateUser {
        username: input.username,
        email: input.email,
        full_name: input.full_name,
        password_hash: hashed,
        is_admin: input.is_admin,
    };
    let user = UserRepo::create(&state.pool, &create_dto).await?;

    tracing::info!(
        admin_id = admin.id,
        user_id = user.id,
        username = %user.username,
        "User created",
    );
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> AppResult<Json<Vec<UserResponse>>> {
    let users = UserRepo::list(&state.pool).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Permanently delete a user with their chats and sessions. Admins cannot
/// delete themselves. Returns 204 No Content.
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin { admin, .. }: RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if id == admin.id {
        return Err(AppError::Core(CoreError::Validation(
            "You cannot delete your own account".into(),
        )));
    }

    let deleted = UserRepo::delete(&state.pool, id).await?;
    if deleted {
        let closed = state.ws_manager.send_to_user(id, Message::Close(None)).await;
        tracing::info!(
            admin_id = admin.id,
            user_id = id,
            closed_sockets = closed,
            "User deleted",
        );
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "User", id }))
    }
}
