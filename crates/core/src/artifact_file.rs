//! Download filenames for artifacts.
//!
//! The artifact title is slugified and the language's extension appended
//! unless the slug already ends with it.

use deunicode::deunicode;

use crate::languages::extension_for_language;

/// Used when a title slugifies to nothing.
pub const FALLBACK_FILENAME: &str = "artifact";

/// Default MIME type for artifacts.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Convert a title into a lowercase, dash-separated slug.
///
/// Non-ASCII text is transliterated first (`Café` becomes `cafe`).
/// Apostrophes vanish, and every other run of non-alphanumeric characters,
/// dots included, becomes a single dash.
pub fn slugify(title: &str) -> String {
    let ascii = deunicode(title);
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_dash = false;

    for ch in ascii.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else if ch != '\'' {
            pending_dash = true;
        }
    }
    slug
}

/// Filename offered in `Content-Disposition` for an artifact download.
pub fn download_filename(title: &str, language: Option<&str>) -> String {
    let mut filename = slugify(title);
    if filename.is_empty() {
        filename = FALLBACK_FILENAME.to_string();
    }

    if let Some(ext) = language.and_then(extension_for_language) {
        if !filename.ends_with(ext) {
            filename.push_str(ext);
        }
    }
    filename
}

/// `attachment; filename="..."` header value for a download.
pub fn content_disposition(filename: &str) -> String {
    let escaped = filename.replace(['"', '\\'], "");
    format!("attachment; filename=\"{escaped}\"")
}
