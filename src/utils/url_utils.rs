//! URL algebra helpers.
//!
//! Resolution of hrefs against a base, classification of hrefs that must
//! never be rewritten, and computation of the shortest relative form of one
//! URL as seen from another.

use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use crate::errors::{BundlerError, BundlerResult};

lazy_static! {
    // Root-relative paths, fragment-only refs and anything with a scheme.
    static ref ABSOLUTE_URL: Regex = Regex::new(r"^(?:/|#|[\w-]*:)")
        .expect("BUG: hardcoded absolute URL regex is invalid");

    static ref TEMPLATED_URL: Regex = Regex::new(r"\{\{|\}\}|\[\[|\]\]")
        .expect("BUG: hardcoded templated URL regex is invalid");
}

/// Resolve a potentially relative href against a base URL
pub fn resolve_url(base: &Url, href: &str) -> BundlerResult<Url> {
    base.join(href.trim())
        .map_err(|_| BundlerError::UnresolvableUrl {
            href: href.to_string(),
            base: base.to_string(),
        })
}

/// True for hrefs that already resolve identically from any document:
/// root-relative paths, fragment-only references and scheme-qualified URLs
#[must_use]
pub fn is_absolute_url(href: &str) -> bool {
    ABSOLUTE_URL.is_match(href)
}

/// True for hrefs containing data-binding delimiters (`{{ }}` or `[[ ]]`)
#[must_use]
pub fn is_templated_url(href: &str) -> bool {
    TEMPLATED_URL.is_match(href)
}

/// Whether two URLs share scheme, host and port
#[must_use]
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme() && a.host_str() == b.host_str() && a.port() == b.port()
}

/// Directory portion of a URL path: everything up to and including the last `/`
fn path_directory(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..=idx],
        None => "/",
    }
}

/// URL of the directory containing `url`, without query or fragment
#[must_use]
pub fn url_directory(url: &Url) -> Url {
    let mut dir = url.clone();
    let path = path_directory(url.path()).to_string();
    dir.set_path(&path);
    dir.set_query(None);
    dir.set_fragment(None);
    dir
}

/// Relative path (no query or fragment) from the directory of `from` to `to`
///
/// Returns an empty string when `to` is the directory containing `from`.
/// Callers must check [`same_origin`] first.
#[must_use]
pub fn relative_path(from: &Url, to: &Url) -> String {
    let from_dir = path_directory(from.path());
    let to_path = to.path();
    let to_dir = path_directory(to_path);
    let to_file = &to_path[to_dir.len()..];

    let dir_part = pathdiff::diff_paths(Path::new(to_dir), Path::new(from_dir))
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_else(|| to_dir.trim_start_matches('/').to_string());

    let relative = match (dir_part.is_empty(), to_file.is_empty()) {
        (true, true) => String::new(),
        (true, false) => to_file.to_string(),
        (false, true) => format!("{dir_part}/"),
        (false, false) => format!("{dir_part}/{to_file}"),
    };

    // A leading segment containing ':' would be read back as a scheme.
    let first_segment = relative.split('/').next().unwrap_or_default();
    if first_segment.contains(':') {
        format!("./{relative}")
    } else {
        relative
    }
}

/// Shortest URL that, resolved against `from`, yields `to`
///
/// Query and fragment of `to` are preserved. Cross-origin targets fall back
/// to the fully absolute URL.
#[must_use]
pub fn relative_url(from: &Url, to: &Url) -> String {
    if from.cannot_be_a_base() || to.cannot_be_a_base() || !same_origin(from, to) {
        return to.to_string();
    }

    let mut relative = relative_path(from, to);
    if relative.is_empty() {
        relative.push_str("./");
    }
    if let Some(query) = to.query() {
        relative.push('?');
        relative.push_str(query);
    }
    if let Some(fragment) = to.fragment() {
        relative.push('#');
        relative.push_str(fragment);
    }
    relative
}

/// Check a URL against exclusion entries (exact match or prefix)
#[must_use]
pub fn is_excluded(url: &Url, excludes: &[String]) -> bool {
    let url = url.as_str();
    excludes
        .iter()
        .any(|exclude| url == exclude || url.starts_with(exclude.as_str()))
}
