//! URL to filesystem path resolution.

use std::path::{Path, PathBuf};

use crate::utils::path::decode_url_path;

/// Resolve a URL path (public prefix already stripped) inside `serve_root`.
///
/// Directories resolve to their `index.html`. A path whose last segment has
/// no extension falls back to `fallback` so client-side routes load the app.
pub fn resolve_path(url_path: &str, serve_root: &Path, fallback: &str) -> Option<PathBuf> {
    let clean = normalize_url(url_path)?;

    // Reject traversal early; canonicalization below catches symlinks
    if clean.split('/').any(|segment| segment == "..") {
        return None;
    }

    let root = serve_root.canonicalize().ok()?;
    if let Ok(canonical) = serve_root.join(&clean).canonicalize() {
        if !canonical.starts_with(&root) {
            return None;
        }
        if canonical.is_file() {
            return Some(canonical);
        }
        if canonical.is_dir() {
            let index = canonical.join("index.html");
            if index.is_file() {
                return Some(index);
            }
        }
    }

    let last = clean.rsplit('/').next().unwrap_or("");
    if last.contains('.') {
        return None;
    }
    let app = root.join(fallback);
    app.is_file().then_some(app)
}

/// Decode, strip query string and fragment, trim slashes
fn normalize_url(url: &str) -> Option<String> {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    let decoded = decode_url_path(&url[..end])?;
    Some(decoded.trim_matches('/').to_string())
}
