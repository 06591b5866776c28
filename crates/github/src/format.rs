//! Text handed to the model for repository analysis.

use std::fmt::Write;

use crate::source::{RepoFile, RepositorySummary};

/// Default character budget for the code section of the analysis prompt.
pub const DEFAULT_CONTEXT_LIMIT: usize = 12_000;

/// Render repository metadata as a short briefing.
pub fn summarize_for_llm(summary: &RepositorySummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Repository: {}", summary.full_name);
    if let Some(description) = summary.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = writeln!(out, "Description: {description}");
    }
    let _ = writeln!(out, "URL: {}", summary.html_url);
    let _ = writeln!(out, "Default branch: {}", summary.default_branch);
    if let Some(language) = &summary.primary_language {
        let _ = writeln!(out, "Primary language: {language}");
    }

    if !summary.languages.is_empty() {
        let total: u64 = summary.languages.iter().map(|(_, bytes)| bytes).sum();
        let breakdown: Vec<String> = summary
            .languages
            .iter()
            .map(|(name, bytes)| {
                let pct = if total == 0 {
                    0.0
                } else {
                    *bytes as f64 * 100.0 / total as f64
                };
                format!("{name} ({pct:.1}%)")
            })
            .collect();
        let _ = writeln!(out, "Languages: {}", breakdown.join(", "));
    }

    if !summary.topics.is_empty() {
        let _ = writeln!(out, "Topics: {}", summary.topics.join(", "));
    }
    if let Some(license) = &summary.license {
        let _ = writeln!(out, "License: {license}");
    }
    let _ = writeln!(
        out,
        "Stars: {}, Forks: {}, Open issues: {}",
        summary.stars, summary.forks, summary.open_issues
    );
    let _ = write!(out, "Files: {}", summary.file_count);
    out
}

fn render_file(file: &RepoFile) -> String {
    let language = file.language.as_deref().unwrap_or("");
    format!(
        "### {}\n```{language}\n{}\n```\n\n",
        file.path,
        file.content.trim_end()
    )
}

/// Concatenate files as fenced blocks until `context_limit` characters.
///
/// Files are taken in order; the first one that would overflow the budget
/// stops the listing and a note records how many were left out.
pub fn format_code_for_llm(files: &[RepoFile], context_limit: usize) -> String {
    let mut out = String::new();
    let mut used = 0;

    for (index, file) in files.iter().enumerate() {
        let section = render_file(file);
        let len = section.chars().count();
        if used + len > context_limit {
            let omitted = files.len() - index;
            let _ = write!(out, "... ({omitted} more files omitted to fit the context limit)");
            return out;
        }
        used += len;
        out.push_str(&section);
    }

    out.truncate(out.trim_end().len());
    out
}
