//! Which files of a repository tree are worth fetching.

use deepchat_core::github_url::{GithubPathKind, GithubUrl};
use deepchat_core::languages::language_for_path;

/// Default number of files fetched per import.
pub const DEFAULT_MAX_FILES: usize = 30;

/// Files larger than this are never fetched or stored.
pub const MAX_FILE_BYTES: u64 = 100_000;

/// Directory names whose contents are generated or vendored.
const SKIPPED_DIRS: &[&str] = &[
    ".git",
    ".github",
    ".idea",
    ".vscode",
    "__pycache__",
    "build",
    "dist",
    "node_modules",
    "target",
    "vendor",
    "venv",
    ".venv",
];

/// Lock files carry no signal for the model.
const SKIPPED_FILES: &[&str] = &[
    "Cargo.lock",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "poetry.lock",
];

/// A blob listed in a repository tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeFile {
    pub path: String,
    pub size: u64,
}

/// Whether a single tree path is a candidate on its own merits.
pub fn is_candidate(path: &str, size: u64) -> bool {
    if size > MAX_FILE_BYTES {
        return false;
    }
    let mut parts = path.split('/').peekable();
    while let Some(part) = parts.next() {
        if parts.peek().is_some() {
            if SKIPPED_DIRS.contains(&part) {
                return false;
            }
        } else if SKIPPED_FILES.contains(&part) {
            return false;
        }
    }
    language_for_path(path).is_some()
}

/// Whether `path` lies under the part of the repository the URL points at.
fn in_scope(path: &str, url: &GithubUrl) -> bool {
    let Some(prefix) = url.path.as_deref().map(|p| p.trim_matches('/')) else {
        return true;
    };
    if prefix.is_empty() {
        return true;
    }
    match url.kind {
        Some(GithubPathKind::Blob) => path == prefix,
        _ => path == prefix || path.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/')),
    }
}

/// Pick at most `max_files` files to fetch.
///
/// Shallow files come first so top-level sources and manifests win over
/// deeply nested ones; ties break alphabetically.
pub fn select_files<'a>(tree: &'a [TreeFile], url: &GithubUrl, max_files: usize) -> Vec<&'a TreeFile> {
    let mut picked: Vec<&TreeFile> = tree
        .iter()
        .filter(|f| in_scope(&f.path, url))
        .filter(|f| is_candidate(&f.path, f.size))
        .collect();

    picked.sort_by(|a, b| {
        let depth = |p: &str| p.matches('/').count();
        depth(&a.path)
            .cmp(&depth(&b.path))
            .then_with(|| a.path.cmp(&b.path))
    });
    picked.truncate(max_files);
    picked
}
