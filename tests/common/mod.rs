//! Test utilities and fixture builders for the htmlbundle test suite

use kodegen_tools_htmlbundle::dom::tree;
use kodegen_tools_htmlbundle::sourcemap::{RawSourceMap, inline_map_of};
use kodegen_tools_htmlbundle::{BundlePass, BundlerConfig, Document, Manifest, MemoryResolver};
use url::Url;

/// Initialise `log` and `tracing` output for tests (idempotent)
#[allow(dead_code)]
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Parse a URL literal
#[allow(dead_code)]
pub fn url(s: &str) -> Url {
    Url::parse(s).expect("test URL literal must parse")
}

/// Creates a test HTML document with specified content
#[allow(dead_code)]
pub fn create_test_html(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{}</title>
</head>
<body>
{}
</body>
</html>"#,
        html_escape::encode_text(title),
        body
    )
}

/// Count non-overlapping occurrences of `needle` in `haystack`
#[allow(dead_code)]
pub fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

/// In-memory sources plus a manifest, built up fluently
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct Fixture {
    pub resolver: MemoryResolver,
    pub manifest: Manifest,
}

#[allow(dead_code)]
impl Fixture {
    pub fn new() -> Self {
        init_logging();
        Self::default()
    }

    /// Add a source file
    pub fn file(mut self, href: &str, text: &str) -> Self {
        self.resolver.insert(url(href), text);
        self
    }

    /// Add a bundle owning `files`
    pub fn bundle(mut self, bundle_url: &str, files: &[&str]) -> Self {
        self.manifest
            .add_bundle(url(bundle_url), files.iter().map(|f| url(f)));
        self
    }

    /// Start a pass with a clone of the manifest
    pub fn pass(&self, config: BundlerConfig) -> BundlePass<'_, MemoryResolver> {
        BundlePass::new(&self.resolver, self.manifest.clone(), config)
    }
}

/// Inline maps of every script in `html` that carries one, in source order
#[allow(dead_code)]
pub fn inline_maps(html: &str) -> Vec<RawSourceMap> {
    let document = Document::parse(url("https://test.invalid/"), html);
    tree::query_all(&document.ast, true, |node| tree::is_tag(node, "script"))
        .iter()
        .filter_map(|script| {
            inline_map_of(&tree::text_content(script)).expect("inline map must decode")
        })
        .collect()
}
