//! Document-level bundling
//!
//! Drives the individual inliners over one entry document in a fixed order:
//! source maps of the entry's own scripts, html imports, external scripts,
//! stylesheet links, and finally relocation of every inline script map.

use std::fmt::Write as _;

use kuchiki::NodeRef;
use tracing::Instrument;
use url::Url;

use super::context::{BundlePass, recover};
use crate::base_url::emulate_base_tag;
use crate::dom::{Document, matchers, tree};
use crate::errors::{BundlerError, BundlerResult};
use crate::resolver::Resolver;
use crate::sourcemap::{compose_fragment_script_maps, relocate_inline_script_maps};
use crate::utils::relative_url;

/// The output of bundling one entry document
#[derive(Debug, Clone)]
pub struct BundledDocument {
    pub url: Url,
    pub html: String,
    pub ast: NodeRef,
}

impl<R: Resolver> BundlePass<'_, R> {
    /// Entry document for a bundle with no document of its own: one import
    /// per HTML file of the bundle, in URL order
    fn synthetic_entry(&self, bundle_url: &Url) -> BundlerResult<Document> {
        let bundle = self
            .manifest
            .bundle(bundle_url)
            .ok_or_else(|| BundlerError::MissingResource(bundle_url.to_string()))?;

        let mut html = String::new();
        for file in &bundle.files {
            if self.resolver.document(file).is_none() {
                continue;
            }
            let href = relative_url(bundle_url, file);
            writeln!(html, "<link rel=\"import\" href=\"{href}\">")
                .map_err(|e| BundlerError::Dom(e.to_string()))?;
        }
        Ok(Document::parse(bundle_url.clone(), html))
    }

    /// Bundle the document at `document_url` into the bundle at `bundle_url`
    ///
    /// The resolver's copy of the document is never mutated: a fresh tree is
    /// parsed from its text. Provenance is recorded on the bundle.
    pub async fn bundle_document(
        &mut self,
        document_url: &Url,
        bundle_url: &Url,
    ) -> BundlerResult<BundledDocument> {
        let span = tracing::debug_span!("bundle_document", url = %document_url, bundle = %bundle_url);
        self.bundle_document_inner(document_url, bundle_url)
            .instrument(span)
            .await
    }

    async fn bundle_document_inner(
        &mut self,
        document_url: &Url,
        bundle_url: &Url,
    ) -> BundlerResult<BundledDocument> {
        let document = match self.resolver.document(document_url) {
            Some(document) => document.reparse(),
            None => {
                log::debug!("No document at {document_url}; generating entry for bundle {bundle_url}");
                self.synthetic_entry(bundle_url)?
            }
        };
        let resolver = self.resolver;
        let in_templates = self.config.rewrite_urls_in_templates();

        if self.config.sourcemaps()
            && let Err(e) = compose_fragment_script_maps(
                resolver,
                &document.ast,
                &document.url,
                &document.raw_text,
            )
            .await
        {
            log::warn!("Skipping source maps for {}: {e}", document.url);
        }
        emulate_base_tag(&document.ast, &document.url, in_templates);

        for link in tree::query_all(&document.ast, false, matchers::is_any_html_import) {
            let result = self.inline_html_import(&document, &link, bundle_url).await;
            recover(result, &document.url)?;
        }

        if self.config.inline_scripts() {
            for script in tree::query_all(&document.ast, false, matchers::is_external_script) {
                let result = self.inline_script(&document, &script, bundle_url).await;
                recover(result, &document.url)?;
            }
        }

        if self.config.inline_css() {
            for link in tree::query_all(&document.ast, true, matchers::is_stylesheet_link) {
                let result = self.inline_stylesheet(&document, &link, bundle_url).await;
                recover(result, &document.url)?;
            }
        }

        if self.config.sourcemaps() {
            let result = relocate_inline_script_maps(resolver, &document).await;
            recover(result, &document.url)?;
        }

        let html = document.serialize()?;
        if let Some(bundle) = self.manifest.bundle(bundle_url) {
            tracing::info!(
                inlined = bundle.inlined_count(),
                missing = bundle.missing_imports.len(),
                "Bundled {}",
                document.url
            );
        }

        Ok(BundledDocument {
            url: document.url,
            html,
            ast: document.ast,
        })
    }

    /// Bundle every bundle of the manifest, each with a fresh `StripSet`
    /// and cleared provenance
    ///
    /// A bundle whose URL names a known document uses it as the entry;
    /// otherwise a synthetic entry importing the bundle's files is used.
    pub async fn bundle_all(&mut self) -> BundlerResult<Vec<BundledDocument>> {
        let bundle_urls: Vec<Url> = self.manifest.bundles().map(|b| b.url.clone()).collect();
        let mut documents = Vec::with_capacity(bundle_urls.len());
        for bundle_url in bundle_urls {
            self.reset_strip_set();
            if let Some(bundle) = self.manifest.bundle_mut(&bundle_url) {
                bundle.reset_provenance();
            }
            documents.push(self.bundle_document(&bundle_url, &bundle_url).await?);
        }
        Ok(documents)
    }
}
