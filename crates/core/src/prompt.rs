//! Prompt assembly for the inference server.
//!
//! The server's `/api/generate` endpoint takes a single prompt string, so
//! the conversation is flattened into labelled turns.

use crate::types::Role;

/// System prompt prepended to every chat conversation.
pub const CHAT_SYSTEM_PROMPT: &str =
    "You are DeepSeek-Coder, an AI assistant specialized in helping with programming tasks.";

/// System prompt for repository analysis.
pub const ANALYSIS_SYSTEM_PROMPT: &str = "You are DeepSeek-Coder, an AI assistant specialized in code analysis.
You are examining a GitHub repository that has been imported.
Please analyze the code and provide a detailed summary including:
1. The overall purpose of the repository
2. Key components and their functionality
3. The architecture and how components interact
4. Any notable patterns, libraries, or technologies used
5. Potential areas for improvement or issues

Be thorough yet concise in your analysis.";

/// Maximum number of earlier messages carried into the prompt (10 exchanges).
pub const MAX_HISTORY_MESSAGES: usize = 20;

/// One earlier turn of the conversation.
#[derive(Debug, Clone)]
pub struct Turn<'a> {
    pub role: Role,
    pub content: &'a str,
}

/// Build the chat prompt.
///
/// `history` is the full transcript in chronological order and must end
/// with the message currently being answered, which is rendered separately
/// from `content`. Only the last [`MAX_HISTORY_MESSAGES`] earlier turns are
/// included.
pub fn build_chat_prompt(history: &[Turn<'_>], content: &str) -> String {
    let earlier = match history.split_last() {
        Some((_, rest)) => rest,
        None => history,
    };
    let start = earlier.len().saturating_sub(MAX_HISTORY_MESSAGES);

    let mut prompt = String::with_capacity(CHAT_SYSTEM_PROMPT.len() + content.len() + 64);
    prompt.push_str(CHAT_SYSTEM_PROMPT);
    prompt.push_str("\n\n");

    for turn in &earlier[start..] {
        prompt.push_str(turn.role.label());
        prompt.push_str(": ");
        prompt.push_str(turn.content);
        prompt.push_str("\n\n");
    }

    prompt.push_str("User: ");
    prompt.push_str(content);
    prompt.push_str("\n\nAssistant:");
    prompt
}

/// Build the repository analysis prompt from the formatted summary and code.
pub fn build_analysis_prompt(summary_text: &str, code_text: &str) -> String {
    format!(
        "{ANALYSIS_SYSTEM_PROMPT}\n\n\
         GitHub Repository Information:\n{summary_text}\n\n\
         Code Files:\n{code_text}\n\n\
         Please provide a comprehensive analysis of this repository:"
    )
}
