//! Row models and DTOs, one module per table.

pub mod artifact;
pub mod chat;
pub mod message;
pub mod session;
pub mod user;
