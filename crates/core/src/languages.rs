//! Language and file-extension tables.
//!
//! Used in both directions: artifact downloads append an extension for the
//! artifact's language, and repository imports tag fetched files with a
//! language from their extension.

/// Language tag to file extension (with leading dot).
const LANGUAGE_EXTENSIONS: &[(&str, &str)] = &[
    ("python", ".py"),
    ("javascript", ".js"),
    ("typescript", ".ts"),
    ("html", ".html"),
    ("css", ".css"),
    ("java", ".java"),
    ("c", ".c"),
    ("cpp", ".cpp"),
    ("csharp", ".cs"),
    ("go", ".go"),
    ("rust", ".rs"),
    ("php", ".php"),
    ("ruby", ".rb"),
    ("swift", ".swift"),
    ("kotlin", ".kt"),
    ("scala", ".scala"),
    ("shell", ".sh"),
    ("bash", ".sh"),
    ("sql", ".sql"),
    ("json", ".json"),
    ("xml", ".xml"),
    ("yaml", ".yml"),
    ("markdown", ".md"),
    ("text", ".txt"),
];

/// File extension (without dot, lowercase) to language tag.
const EXTENSION_LANGUAGES: &[(&str, &str)] = &[
    ("py", "python"),
    ("pyi", "python"),
    ("js", "javascript"),
    ("mjs", "javascript"),
    ("cjs", "javascript"),
    ("jsx", "javascript"),
    ("ts", "typescript"),
    ("tsx", "typescript"),
    ("html", "html"),
    ("htm", "html"),
    ("css", "css"),
    ("scss", "css"),
    ("java", "java"),
    ("c", "c"),
    ("h", "c"),
    ("cpp", "cpp"),
    ("cc", "cpp"),
    ("cxx", "cpp"),
    ("hpp", "cpp"),
    ("cs", "csharp"),
    ("go", "go"),
    ("rs", "rust"),
    ("php", "php"),
    ("rb", "ruby"),
    ("swift", "swift"),
    ("kt", "kotlin"),
    ("kts", "kotlin"),
    ("scala", "scala"),
    ("sh", "shell"),
    ("bash", "bash"),
    ("zsh", "shell"),
    ("sql", "sql"),
    ("json", "json"),
    ("xml", "xml"),
    ("yaml", "yaml"),
    ("yml", "yaml"),
    ("toml", "toml"),
    ("md", "markdown"),
    ("markdown", "markdown"),
    ("txt", "text"),
    ("rst", "text"),
];

/// Well-known files without a telling extension.
const FILENAME_LANGUAGES: &[(&str, &str)] = &[
    ("Dockerfile", "dockerfile"),
    ("Makefile", "makefile"),
    ("CMakeLists.txt", "cmake"),
];

/// File extension for a language tag, e.g. `"rust"` -> `".rs"`.
///
/// Matching is case-insensitive. Returns `None` for unknown languages.
pub fn extension_for_language(language: &str) -> Option<&'static str> {
    let language = language.to_ascii_lowercase();
    LANGUAGE_EXTENSIONS
        .iter()
        .find(|(lang, _)| *lang == language)
        .map(|(_, ext)| *ext)
}

/// Language tag for a repository path, e.g. `"src/main.rs"` -> `"rust"`.
///
/// Returns `None` when the file type is not recognised.
pub fn language_for_path(path: &str) -> Option<&'static str> {
    let filename = path.rsplit('/').next().unwrap_or(path);

    if let Some((_, lang)) = FILENAME_LANGUAGES.iter().find(|(name, _)| *name == filename) {
        return Some(lang);
    }

    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() {
        // Dotfiles such as `.gitignore`.
        return None;
    }
    let ext = ext.to_ascii_lowercase();
    EXTENSION_LANGUAGES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, lang)| *lang)
}

/// Whether files of this language are stored as artifacts after an import.
///
/// Plain text and unknown files are skipped.
pub fn is_code_language(language: Option<&str>) -> bool {
    matches!(language, Some(lang) if !lang.is_empty() && lang != "text")
}
