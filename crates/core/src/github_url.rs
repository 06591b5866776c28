//! GitHub URL validation, parsing and chat-title generation.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// Host accepted for repository imports.
pub const GITHUB_HOST: &str = "github.com";

/// Title used when nothing better can be derived from the URL.
pub const FALLBACK_TITLE: &str = "GitHub Import";

/// Path suffixes longer than this are shortened in chat titles.
const MAX_TITLE_PATH_CHARS: usize = 30;

/// Splits an absolute URL into authority and path, ignoring query and
/// fragment.
static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.\-]*://([^/?#]*)([^?#]*)").expect("valid regex")
});

/// Whether a GitHub URL points at a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GithubPathKind {
    Blob,
    Tree,
}

/// Components of a repository URL such as
/// `https://github.com/owner/repo/tree/main/src`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubUrl {
    pub owner: String,
    pub repo: String,
    pub kind: Option<GithubPathKind>,
    /// Branch, tag or commit following `blob/` or `tree/`.
    pub reference: Option<String>,
    /// Path inside the repository, without leading slash.
    pub path: Option<String>,
}

impl GithubUrl {
    /// `owner/repo`.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// Return the non-empty path segments of a github.com URL, or `None` when
/// the URL is not on github.com.
fn github_segments(url: &str) -> Option<Vec<&str>> {
    let caps = URL_RE.captures(url.trim())?;
    let host = caps.get(1)?.as_str();
    if !host.eq_ignore_ascii_case(GITHUB_HOST) {
        return None;
    }
    let path = caps.get(2).map_or("", |m| m.as_str());
    Some(path.split('/').filter(|s| !s.is_empty()).collect())
}

/// A URL is importable when it is on github.com and names at least an owner
/// and a repository.
pub fn is_valid_github_url(url: &str) -> bool {
    github_segments(url).is_some_and(|segments| segments.len() >= 2)
}

/// Parse a repository URL into its components.
pub fn parse_github_url(url: &str) -> Result<GithubUrl, CoreError> {
    let segments = github_segments(url)
        .filter(|s| s.len() >= 2)
        .ok_or_else(|| CoreError::Validation("Invalid GitHub URL format".to_string()))?;

    let owner = segments[0].to_string();
    let repo = segments[1].trim_end_matches(".git").to_string();

    let kind = match segments.get(2) {
        Some(&"blob") => Some(GithubPathKind::Blob),
        Some(&"tree") => Some(GithubPathKind::Tree),
        _ => None,
    };

    let (reference, path) = match kind {
        Some(_) => {
            let reference = segments.get(3).map(|s| s.to_string());
            let path = if segments.len() > 4 {
                Some(segments[4..].join("/"))
            } else {
                None
            };
            (reference, path)
        }
        None => (None, None),
    };

    Ok(GithubUrl {
        owner,
        repo,
        kind,
        reference,
        path,
    })
}

/// Derive a chat title from a GitHub URL.
///
/// `owner/repo` for repository URLs, `owner/repo: path` when the URL points
/// inside the repository. Long paths are cut to 27 characters plus `...`.
pub fn title_from_github_url(url: &str) -> String {
    let Some(segments) = github_segments(url) else {
        return FALLBACK_TITLE.to_string();
    };
    if segments.len() < 2 {
        return FALLBACK_TITLE.to_string();
    }

    let base = format!("{}/{}", segments[0], segments[1]);
    let points_inside = segments.len() > 4 && matches!(segments[2], "blob" | "tree");
    if !points_inside {
        return base;
    }

    let suffix = segments[4..].join("/");
    let suffix = if suffix.chars().count() > MAX_TITLE_PATH_CHARS {
        let head: String = suffix.chars().take(MAX_TITLE_PATH_CHARS - 3).collect();
        format!("{head}...")
    } else {
        suffix
    };
    format!("{base}: {suffix}")
}
