//! Model catalog and inference-server tag filtering.

use serde::Serialize;

/// A model the user can pick for a chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    /// Inference-server model tag, sent as `model` in generate requests.
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Substring that identifies supported models on the inference server.
pub const MODEL_FAMILY: &str = "deepseek";

/// Default model when none is configured.
pub const DEFAULT_MODEL: &str = "deepseek-coder:33b-instruct-q5_K_M";

const CATALOG: &[(&str, &str, &str)] = &[
    (
        "deepseek-coder:1.3b-instruct-q4_0",
        "DeepSeek-Coder 1.3B",
        "Smallest model, fastest response",
    ),
    (
        "deepseek-coder:6.7b-instruct-q5_K_M",
        "DeepSeek-Coder 6.7B",
        "Balanced model, good performance",
    ),
    (
        "deepseek-coder:33b-instruct-q5_K_M",
        "DeepSeek-Coder 33B",
        "Largest model, best quality",
    ),
];

/// Built-in catalog, returned when the inference server has nothing to offer.
pub fn catalog() -> Vec<ModelInfo> {
    CATALOG
        .iter()
        .map(|(id, name, description)| ModelInfo {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
        })
        .collect()
}

/// Keep only installed tags of the supported family.
///
/// Tags known to the catalog keep their display name and description.
pub fn filter_deepseek<S: AsRef<str>>(tags: &[S]) -> Vec<ModelInfo> {
    tags.iter()
        .map(AsRef::as_ref)
        .filter(|tag| tag.to_ascii_lowercase().contains(MODEL_FAMILY))
        .map(|tag| match CATALOG.iter().find(|(id, _, _)| *id == tag) {
            Some((id, name, description)) => ModelInfo {
                id: id.to_string(),
                name: name.to_string(),
                description: description.to_string(),
            },
            None => ModelInfo {
                id: tag.to_string(),
                name: tag.to_string(),
                description: "Installed on the inference server".to_string(),
            },
        })
        .collect()
}

/// Installed models of the supported family, or the catalog when none are.
pub fn available_models<S: AsRef<str>>(tags: &[S]) -> Vec<ModelInfo> {
    let installed = filter_deepseek(tags);
    if installed.is_empty() {
        catalog()
    } else {
        installed
    }
}
