//! URL handling module for Dirlist-Catalog
//!
//! This module provides href resolution, file-name extraction, crawl-scope
//! checks and media-extension matching.

mod normalize;

use url::Url;

// Re-export main functions
pub use normalize::{file_name, resolve_href};

/// Returns true if `url` lies inside the directory tree rooted at `root`
///
/// Scheme, host and port must match and the path must start with the
/// root's path. The root itself is in scope.
pub fn is_within_scope(url: &Url, root: &Url) -> bool {
    url.scheme() == root.scheme()
        && url.host_str() == root.host_str()
        && url.port_or_known_default() == root.port_or_known_default()
        && url.path().starts_with(root.path())
}

/// Returns true if the URL's file name ends with one of `extensions`
///
/// Matching is case-insensitive; `extensions` are expected in lowercase
/// with their leading dot. Query strings are ignored.
pub fn has_media_extension(url: &Url, extensions: &[String]) -> bool {
    match file_name(url) {
        Some(name) => {
            let name = name.to_lowercase();
            extensions
                .iter()
                .any(|ext| name.ends_with(&ext.to_lowercase()))
        }
        None => false,
    }
}
