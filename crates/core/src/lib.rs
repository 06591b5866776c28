//! Domain logic shared by the DeepChat server crates.
//!
//! Everything here is pure: no database, no network. Handlers and the
//! WebSocket flows call into these modules for the decisions they make.

pub mod artifact_file;
pub mod code_blocks;
pub mod error;
pub mod github_url;
pub mod languages;
pub mod login_policy;
pub mod models;
pub mod prompt;
pub mod rate_limit;
pub mod roles;
pub mod types;
