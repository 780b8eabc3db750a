//! Resolution of URLs and access to the dependency graph
//!
//! The bundler never parses or fetches on its own: it asks a [`Resolver`]
//! for parsed documents and for the ordered sets of resources reachable
//! from a document.

pub mod memory;

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::dom::Document;
use crate::errors::BundlerResult;
use crate::utils::resolve_url;

pub use memory::MemoryResolver;

/// Kinds of dependency edges the graph exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyKind {
    /// HTML document reached through `<link rel="import">` or `rel="lazy-import"`
    HtmlImport,
    /// External script referenced by `<script src>`
    HtmlScript,
    /// Stylesheet referenced by a stylesheet link
    HtmlStyle,
    /// Stylesheet reached through a CSS `@import`
    CssImport,
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyKind::HtmlImport => write!(f, "html-import"),
            DependencyKind::HtmlScript => write!(f, "html-script"),
            DependencyKind::HtmlStyle => write!(f, "html-style"),
            DependencyKind::CssImport => write!(f, "css-import"),
        }
    }
}

/// A loaded resource: its URL and unparsed text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub url: Url,
    pub raw_text: String,
}

/// Source of resolved URLs, parsed documents and the dependency graph
pub trait Resolver {
    /// Resolve `href` against `base`
    ///
    /// URLs that cannot act as a base (`data:`, `javascript:`, `mailto:`)
    /// and URLs rejected by [`Resolver::can_resolve`] are unresolvable.
    fn resolve(&self, href: &str, base: &Url) -> Option<Url> {
        resolve_url(base, href)
            .ok()
            .filter(|url| !url.cannot_be_a_base() && self.can_resolve(url))
    }

    /// Whether this resolver is able to load `url` at all
    fn can_resolve(&self, url: &Url) -> bool;

    /// Parsed HTML document at `url`
    fn document(&self, url: &Url) -> Option<&Document>;

    /// Resources of `kind` reachable from `document`, in discovery order,
    /// without duplicates
    fn reachable(&self, document: &Document, kind: DependencyKind) -> Vec<&Resource>;

    /// Load auxiliary text (for example an external source map)
    fn load(&self, url: &Url) -> impl Future<Output = BundlerResult<String>>;
}
