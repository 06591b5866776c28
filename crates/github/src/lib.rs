//! Repository-fetch collaborator for GitHub imports.
//!
//! [`RepositorySource`] is the seam the server depends on; [`GithubClient`]
//! implements it against the GitHub REST API v3. File selection and the
//! text handed to the model are plain functions in [`select`] and
//! [`format`].

pub mod client;
pub mod format;
pub mod select;
pub mod source;

pub use client::{GithubClient, GithubError};
pub use format::{format_code_for_llm, summarize_for_llm};
pub use source::{ImportedRepository, RepoFile, RepositorySource, RepositorySummary};
