//! The repository-fetch seam and the data it returns.

use async_trait::async_trait;
use deepchat_core::github_url::GithubUrl;
use serde::Serialize;

use crate::client::GithubError;

/// Repository metadata used to brief the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RepositorySummary {
    /// `owner/repo`.
    pub full_name: String,
    pub description: Option<String>,
    pub html_url: String,
    pub default_branch: String,
    pub stars: u64,
    pub forks: u64,
    pub open_issues: u64,
    pub primary_language: Option<String>,
    /// Language byte counts, largest first.
    pub languages: Vec<(String, u64)>,
    pub topics: Vec<String>,
    pub license: Option<String>,
    /// Files in the tree at the imported ref.
    pub file_count: usize,
}

/// A fetched file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoFile {
    /// Path inside the repository.
    pub path: String,
    /// Language tag derived from the file name.
    pub language: Option<String>,
    /// Size in bytes as reported by the tree.
    pub size: u64,
    pub content: String,
}

impl RepoFile {
    /// Last path component.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// Everything an import needs from the repository host.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportedRepository {
    pub summary: RepositorySummary,
    pub files: Vec<RepoFile>,
}

/// Fetches repository content for an import.
#[async_trait]
pub trait RepositorySource: Send + Sync {
    /// Fetch the repository summary and up to `max_files` files for `url`.
    async fn fetch(
        &self,
        url: &GithubUrl,
        max_files: usize,
    ) -> Result<ImportedRepository, GithubError>;
}
