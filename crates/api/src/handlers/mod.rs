pub mod admin;
pub mod artifacts;
pub mod auth;
pub mod chats;
pub mod github;
pub mod models;
pub mod sessions;
pub mod user;
