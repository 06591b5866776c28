//! Extractor for the user-management endpoints.
//!
//! The role claim in an access token is fixed when the token is issued, but
//! `users.is_admin` can change afterwards. Admin requests therefore confirm
//! the flag against the database on every call.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use deepchat_core::error::CoreError;
use deepchat_core::roles::ROLE_ADMIN;
use deepchat_db::models::user::User;
use deepchat_db::repositories::UserRepo;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// An authenticated caller whose account is an admin right now.
pub struct RequireAdmin {
    pub auth: AuthUser,
    /// The caller's current row.
    pub admin: User,
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        let forbidden = || AppError::Core(CoreError::Forbidden("Admin access required".into()));

        // Plain users are turned away without a query.
        if auth.role != ROLE_ADMIN {
            return Err(forbidden());
        }

        let admin = UserRepo::find_by_id(&state.pool, auth.user_id)
            .await?
            .filter(|user| user.is_admin)
            .ok_or_else(|| {
                tracing::warn!(user_id = auth.user_id, "Admin token used after demotion");
                forbidden()
            })?;

        Ok(RequireAdmin { auth, admin })
    }
}
