//! In-memory resolver
//!
//! Holds resource text keyed by URL, parses HTML entries once, and derives
//! the dependency graph by scanning each HTML document for imports, scripts
//! and stylesheets and each stylesheet for `@import` rules.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use super::{DependencyKind, Resolver, Resource};
use crate::dom::{Document, matchers, tree};
use crate::errors::{BundlerError, BundlerResult};

lazy_static! {
    static ref CSS_IMPORT: Regex = Regex::new(
        r#"@import\s+(?:url\(\s*)?["']?([^"')\s;]+)["']?\s*\)?[^;]*;"#
    )
    .expect("BUG: hardcoded CSS @import regex is invalid");
}

/// URL schemes the in-memory resolver claims to load
const LOADABLE_SCHEMES: [&str; 3] = ["http", "https", "file"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContentKind {
    Html,
    Css,
    Other,
}

impl ContentKind {
    fn from_url(url: &Url) -> Self {
        let path = url.path().to_ascii_lowercase();
        if path.ends_with(".html") || path.ends_with(".htm") {
            ContentKind::Html
        } else if path.ends_with(".css") {
            ContentKind::Css
        } else {
            ContentKind::Other
        }
    }
}

type Edges = Vec<(DependencyKind, Url)>;

/// Resolver over sources held in memory
#[derive(Debug, Default)]
pub struct MemoryResolver {
    resources: HashMap<Url, Resource>,
    documents: HashMap<Url, Document>,
    edges: HashMap<Url, Edges>,
    /// Reachable URLs per `(document, kind)`; cleared on every insert
    reachable_cache: RefCell<HashMap<(Url, DependencyKind), Vec<Url>>>,
}

impl MemoryResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a resolver from `(url, text)` pairs
    pub fn from_entries<'a, I>(entries: I) -> BundlerResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut resolver = Self::new();
        for (url, text) in entries {
            resolver.insert(Url::parse(url)?, text);
        }
        Ok(resolver)
    }

    /// Add or replace a resource; HTML and CSS are classified by extension
    pub fn insert(&mut self, url: Url, text: impl Into<String>) {
        let kind = ContentKind::from_url(&url);
        self.insert_as(url, text.into(), kind);
    }

    /// Add or replace a resource that is HTML regardless of its extension
    pub fn insert_html(&mut self, url: Url, text: impl Into<String>) {
        self.insert_as(url, text.into(), ContentKind::Html);
    }

    fn insert_as(&mut self, url: Url, text: String, kind: ContentKind) {
        let edges = match kind {
            ContentKind::Html => html_dependencies(&url, &text),
            ContentKind::Css => css_dependencies(&url, &text),
            ContentKind::Other => Vec::new(),
        };
        if kind == ContentKind::Html {
            self.documents
                .insert(url.clone(), Document::parse(url.clone(), text.clone()));
        } else {
            self.documents.remove(&url);
        }
        self.edges.insert(url.clone(), edges);
        self.reachable_cache.get_mut().clear();
        self.resources.insert(
            url.clone(),
            Resource {
                url,
                raw_text: text,
            },
        );
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Depth-first walk over `edges` collecting resources of `kind`
    fn collect<'a>(
        &'a self,
        edges: &[(DependencyKind, Url)],
        kind: DependencyKind,
        visited: &mut HashSet<Url>,
        out: &mut Vec<&'a Resource>,
    ) {
        for (edge_kind, url) in edges {
            if *edge_kind == kind
                && let Some(resource) = self.resources.get(url)
                && !out.iter().any(|r| r.url == *url)
            {
                out.push(resource);
            }

            // Scripts have no outgoing edges worth following.
            if *edge_kind == DependencyKind::HtmlScript || !visited.insert(url.clone()) {
                continue;
            }
            if let Some(next) = self.edges.get(url) {
                self.collect(next, kind, visited, out);
            }
        }
    }
}

impl Resolver for MemoryResolver {
    fn can_resolve(&self, url: &Url) -> bool {
        LOADABLE_SCHEMES.contains(&url.scheme())
    }

    fn document(&self, url: &Url) -> Option<&Document> {
        self.documents.get(url)
    }

    fn reachable(&self, document: &Document, kind: DependencyKind) -> Vec<&Resource> {
        let key = (document.url.clone(), kind);
        let cached = self.reachable_cache.borrow().get(&key).cloned();
        let urls = match cached {
            Some(urls) => urls,
            None => {
                let direct = html_dependencies(&document.url, &document.raw_text);
                let mut visited = HashSet::from([document.url.clone()]);
                let mut out = Vec::new();
                self.collect(&direct, kind, &mut visited, &mut out);
                let urls: Vec<Url> = out.iter().map(|resource| resource.url.clone()).collect();
                self.reachable_cache.borrow_mut().insert(key, urls.clone());
                urls
            }
        };
        urls.iter().filter_map(|url| self.resources.get(url)).collect()
    }

    async fn load(&self, url: &Url) -> BundlerResult<String> {
        self.resources
            .get(url)
            .map(|resource| resource.raw_text.clone())
            .ok_or_else(|| BundlerError::MissingResource(url.to_string()))
    }
}

/// Direct dependencies of an HTML document, in document order
fn html_dependencies(url: &Url, text: &str) -> Edges {
    let document = Document::parse(url.clone(), text);
    let elements = tree::descendant_elements(&document.ast, true);

    let base = elements
        .iter()
        .find(|node| matchers::is_base(node))
        .and_then(|node| tree::get_attr(node, "href"))
        .and_then(|href| url.join(&href).ok())
        .unwrap_or_else(|| url.clone());

    let mut edges = Vec::new();
    for node in &elements {
        let (kind, attr) = if matchers::is_any_html_import(node) {
            (DependencyKind::HtmlImport, "href")
        } else if matchers::is_stylesheet_link(node) {
            (DependencyKind::HtmlStyle, "href")
        } else if matchers::is_external_script(node) {
            (DependencyKind::HtmlScript, "src")
        } else {
            if matchers::is_style(node) {
                edges.extend(css_dependencies(&base, &tree::text_content(node)));
            }
            continue;
        };
        if let Some(target) = tree::get_attr(node, attr).and_then(|href| base.join(href.trim()).ok())
        {
            edges.push((kind, target));
        }
    }
    edges
}

/// `@import` targets of a stylesheet, in source order
fn css_dependencies(url: &Url, text: &str) -> Edges {
    CSS_IMPORT
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| url.join(m.as_str()).ok())
        .map(|target| (DependencyKind::CssImport, target))
        .collect()
}
