//! Start-up provisioning of the default administrator.

use deepchat_db::models::user::CreateUser;
use deepchat_db::repositories::UserRepo;
use deepchat_db::DbPool;

use crate::auth::password::hash_password;
use crate::config::AdminBootstrap;
use crate::error::{AppError, AppResult};

/// Create the configured admin account unless a user with that name exists.
///
/// Returns `true` when an account was created. Without a configured password
/// nothing is created.
pub async fn ensure_admin(pool: &DbPool, admin: &AdminBootstrap) -> AppResult<bool> {
    let Some(password) = admin.password.as_deref() else {
        tracing::warn!("ADMIN_PASSWORD not set, skipping default admin creation");
        return Ok(false);
    };

    if UserRepo::find_by_username(pool, &admin.username)
        .await?
        .is_some()
    {
        tracing::debug!(username = %admin.username, "Default admin already present");
        return Ok(false);
    }

    let password_hash = hash_password(password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: admin.username.clone(),
            email: None,
            full_name: Some("Administrator".into()),
            password_hash,
            is_admin: true,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, username = %user.username, "Default admin created");
    Ok(true)
}
