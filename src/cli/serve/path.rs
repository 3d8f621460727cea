//! URL to filesystem path resolution, with single-page-app fallback.

use std::path::{Path, PathBuf};

/// Outcome of resolving a request URL against the served directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// The URL maps to an existing file.
    File(PathBuf),
    /// No file matches; serve the fallback document (client-side routing).
    Fallback(PathBuf),
    /// No file matches and the fallback document itself is missing.
    NotFound,
}

/// Route a request URL: real file if one exists, fallback document otherwise.
pub fn route(url: &str, serve_root: &Path, fallback: &str) -> Resolved {
    if let Some(path) = resolve_path(url, serve_root) {
        return Resolved::File(path);
    }

    let fallback_path = serve_root.join(fallback);
    if fallback_path.is_file() {
        Resolved::Fallback(fallback_path)
    } else {
        Resolved::NotFound
    }
}

/// Resolve URL to filesystem path, handling index.html for directories
pub fn resolve_path(url: &str, serve_root: &Path) -> Option<PathBuf> {
    let clean = normalize_url(url);

    // Reject paths with suspicious patterns early
    if clean.contains("..") {
        return None;
    }

    let local = serve_root.join(&clean);

    // Canonicalize to resolve symlinks and verify path is under serve_root
    // This prevents traversal via symlinks or encoded sequences
    let canonical = local.canonicalize().ok()?;
    let root_canonical = serve_root.canonicalize().ok()?;

    if !canonical.starts_with(&root_canonical) {
        // Path escapes serve_root - reject
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

    None
}

/// Normalize URL: decode, strip query string, trim slashes
fn normalize_url(url: &str) -> String {
    use percent_encoding::percent_decode_str;
    let decoded = percent_decode_str(url)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();

    let path = decoded.split('?').next().unwrap_or(&decoded);
    path.trim_matches('/').to_string()
}
