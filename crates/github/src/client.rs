//! REST client for the GitHub API v3.
//!
//! Fetches repository metadata, the language breakdown, the recursive file
//! tree and raw file contents using [`reqwest`]. A token is optional; without
//! one the anonymous rate limit applies.

use std::collections::HashMap;

use async_trait::async_trait;
use deepchat_core::github_url::GithubUrl;
use deepchat_core::languages::language_for_path;
use futures::{stream, StreamExt};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::select::{select_files, TreeFile};
use crate::source::{ImportedRepository, RepoFile, RepositorySource, RepositorySummary};

/// Public GitHub API root.
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Concurrent raw-content downloads per import.
const FETCH_CONCURRENCY: usize = 4;

const USER_AGENT: &str = concat!("deepchat/", env!("CARGO_PKG_VERSION"));

/// Errors from the GitHub REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum GithubError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// GitHub returned a non-2xx status code.
    #[error("GitHub API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The configured API root cannot carry path segments.
    #[error("Invalid GitHub API URL: {0}")]
    InvalidUrl(String),

    /// The imported path matched no fetchable files.
    #[error("No importable files found in {0}")]
    NoFiles(String),
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RepoResponse {
    full_name: String,
    description: Option<String>,
    html_url: String,
    default_branch: String,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    #[serde(default)]
    open_issues_count: u64,
    language: Option<String>,
    #[serde(default)]
    topics: Vec<String>,
    license: Option<LicenseResponse>,
}

#[derive(Debug, Deserialize)]
struct LicenseResponse {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    #[serde(default)]
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    size: u64,
}

/// Blob entries of a tree response.
fn tree_files(tree: TreeResponse) -> Vec<TreeFile> {
    tree.tree
        .into_iter()
        .filter(|e| e.kind == "blob")
        .map(|e| TreeFile {
            path: e.path,
            size: e.size,
        })
        .collect()
}

/// Language byte counts sorted largest first.
fn sorted_languages(languages: HashMap<String, u64>) -> Vec<(String, u64)> {
    let mut languages: Vec<_> = languages.into_iter().collect();
    languages.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    languages
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GithubClient {
    client: reqwest::Client,
    api_url: Url,
    token: Option<String>,
}

impl GithubClient {
    /// Create a client for the public API, authenticating with `token` when
    /// one is given.
    pub fn new(token: Option<String>) -> Result<Self, GithubError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        let api_url =
            Url::parse(GITHUB_API_URL).map_err(|e| GithubError::InvalidUrl(e.to_string()))?;
        Ok(Self::with_client(client, api_url, token))
    }

    /// Create a client against another API root (GitHub Enterprise, tests).
    pub fn with_client(client: reqwest::Client, api_url: Url, token: Option<String>) -> Self {
        Self {
            client,
            api_url,
            token: token.filter(|t| !t.is_empty()),
        }
    }

    /// API URL for `segments`, each percent-encoded as a single path
    /// segment. Empty, `.` and `..` segments are dropped so no input can
    /// climb out of the repository's endpoint.
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url, GithubError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| GithubError::InvalidUrl(self.api_url.to_string()))?
            .pop_if_empty()
            .extend(
                segments
                    .into_iter()
                    .filter(|s| !matches!(*s, "" | "." | "..")),
            );
        Ok(url)
    }

    fn get(&self, url: Url) -> reqwest::RequestBuilder {
        let request = self
            .client
            .get(url)
            .header("X-GitHub-Api-Version", "2022-11-28");
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, GithubError> {
        let response = self
            .get(url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// Repository metadata plus language breakdown. `file_count` is left at
    /// zero for the caller to fill in.
    pub async fn repository_summary(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<RepositorySummary, GithubError> {
        let info: RepoResponse = self.get_json(self.endpoint(["repos", owner, repo])?).await?;
        let languages: HashMap<String, u64> = self
            .get_json(self.endpoint(["repos", owner, repo, "languages"])?)
            .await?;

        Ok(RepositorySummary {
            full_name: info.full_name,
            description: info.description,
            html_url: info.html_url,
            default_branch: info.default_branch,
            stars: info.stargazers_count,
            forks: info.forks_count,
            open_issues: info.open_issues_count,
            primary_language: info.language,
            languages: sorted_languages(languages),
            topics: info.topics,
            license: info.license.map(|l| l.name),
            file_count: 0,
        })
    }

    /// Every blob in the tree at `reference`.
    pub async fn list_tree(
        &self,
        owner: &str,
        repo: &str,
        reference: &str,
    ) -> Result<Vec<TreeFile>, GithubError> {
        let mut url = self.endpoint(
            ["repos", owner, repo, "git", "trees"]
                .into_iter()
                .chain(reference.split('/')),
        )?;
        url.query_pairs_mut().append_pair("recursive", "1");
        let tree: TreeResponse = self.get_json(url).await?;
        if tree.truncated {
            tracing::warn!(owner, repo, reference, "GitHub tree listing truncated");
        }
        Ok(tree_files(tree))
    }

    /// Raw contents of one file.
    pub async fn file_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        reference: &str,
    ) -> Result<String, GithubError> {
        let url = self.endpoint(
            ["repos", owner, repo, "contents"]
                .into_iter()
                .chain(path.split('/')),
        )?;
        let response = self
            .get(url)
            .query(&[("ref", reference)])
            .header(reqwest::header::ACCEPT, "application/vnd.github.raw")
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.text().await?)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`GithubError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, GithubError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GithubError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GithubError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl RepositorySource for GithubClient {
    async fn fetch(
        &self,
        url: &GithubUrl,
        max_files: usize,
    ) -> Result<ImportedRepository, GithubError> {
        let owner = url.owner.as_str();
        let repo = url.repo.as_str();

        let mut summary = self.repository_summary(owner, repo).await?;
        let reference = url
            .reference
            .clone()
            .unwrap_or_else(|| summary.default_branch.clone());

        let tree = self.list_tree(owner, repo, &reference).await?;
        summary.file_count = tree.len();

        let selected = select_files(&tree, url, max_files);
        if selected.is_empty() {
            return Err(GithubError::NoFiles(url.full_name()));
        }
        tracing::info!(
            repo = %summary.full_name,
            reference = %reference,
            selected = selected.len(),
            total = tree.len(),
            "Fetching repository files",
        );

        let reference = reference.as_str();
        let files: Vec<RepoFile> = stream::iter(selected)
            .map(|entry| async move {
                match self.file_content(owner, repo, &entry.path, reference).await {
                    Ok(content) => Some(RepoFile {
                        language: language_for_path(&entry.path).map(str::to_string),
                        path: entry.path.clone(),
                        size: entry.size,
                        content,
                    }),
                    Err(e) => {
                        tracing::warn!(path = %entry.path, error = %e, "Skipping unreadable file");
                        None
                    }
                }
            })
            .buffered(FETCH_CONCURRENCY)
            .filter_map(|file| async move { file })
            .boxed()
            .collect()
            .await;

        Ok(ImportedRepository { summary, files })
    }
}
