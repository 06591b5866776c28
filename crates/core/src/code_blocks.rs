//! Fenced code-block extraction from model output.
//!
//! Completed assistant replies are scanned for Markdown fences; each block
//! with a non-empty body becomes an artifact attached to the reply.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Opening fence with an optional single-word language tag, then the body up
/// to the nearest closing fence.
pub const CODE_BLOCK_PATTERN: &str = r"(?s)```(\w*)\n(.*?)```";

static CODE_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(CODE_BLOCK_PATTERN).expect("valid regex"));

/// A fenced block found in a Markdown document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeBlock {
    /// Language tag after the opening fence; empty when absent.
    pub language: String,
    /// Block body, trimmed.
    pub code: String,
}

/// Extract every fenced code block from `markdown`, in document order.
///
/// Blocks whose body is blank after trimming are dropped.
pub fn extract_code_blocks(markdown: &str) -> Vec<CodeBlock> {
    CODE_BLOCK_RE
        .captures_iter(markdown)
        .filter_map(|caps| {
            let language = caps.get(1).map_or("", |m| m.as_str()).trim();
            let code = caps.get(2).map_or("", |m| m.as_str()).trim();
            if code.is_empty() {
                return None;
            }
            Some(CodeBlock {
                language: language.to_string(),
                code: code.to_string(),
            })
        })
        .collect()
}

/// Title for the `index`-th (zero-based) snippet extracted from a reply.
pub fn snippet_title(index: usize, language: &str) -> String {
    if language.is_empty() {
        format!("Code Snippet {}", index + 1)
    } else {
        format!("Code Snippet {} ({language})", index + 1)
    }
}
