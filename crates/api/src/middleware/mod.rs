//! Request extractors shared by the handlers.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user and checks that
//!   their login session is still active.
//! - [`admin::RequireAdmin`] -- Requires a caller who is an admin in the
//!   database, not just in the token.
//! - [`client_info::ClientInfo`] -- Caller IP address and user agent.

pub mod admin;
pub mod auth;
pub mod client_info;
