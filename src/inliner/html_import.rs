//! HTML import inlining
//!
//! Replaces `<link rel="import">` elements with the content of the imported
//! document, recursively, honouring bundle boundaries, deduplication and
//! lazy imports.

use kuchiki::NodeRef;
use url::Url;

use super::context::{BundlePass, Provenance, recover};
use crate::base_url::{emulate_base_tag, rewrite_ast_base_url};
use crate::dom::{Document, Fragment, matchers, tree};
use crate::errors::{BundlerError, BundlerResult};
use crate::resolver::{DependencyKind, Resolver};
use crate::sourcemap::compose_fragment_script_maps;
use crate::utils::relative_url;

impl<R: Resolver> BundlePass<'_, R> {
    /// Inline, link or strip one import `link` of `document`
    ///
    /// `document` is the host being bundled into `host_bundle`. Content
    /// spliced in from the import is re-based to the host's URL, and the
    /// imports it carries are processed in turn, depth first.
    ///
    /// A self-import is stripped and reported as [`BundlerError::SelfImport`],
    /// a recoverable error.
    pub async fn inline_html_import(
        &mut self,
        document: &Document,
        link: &NodeRef,
        host_bundle: &Url,
    ) -> BundlerResult<()> {
        let Some(href) = tree::get_attr(link, "href") else {
            return Ok(());
        };
        let lazy = matchers::is_lazy_import(link);
        let Some(import_url) = self.resolver.resolve(&href, &document.url) else {
            log::debug!("Leaving unresolvable import '{href}' in {}", document.url);
            return Ok(());
        };
        let import_bundle = self.manifest.bundle_for(&import_url).map(|b| b.url.clone());

        // Lazy imports are exempt: every occurrence is processed.
        if !lazy {
            if self.strip_set.contains(&import_url) {
                log::debug!("Stripping repeated import of {import_url}");
                tree::remove_with_trailing_whitespace(link);
                return Ok(());
            }
            self.strip_set.insert(import_url.clone());
        }

        let Some(import_bundle) = import_bundle else {
            if self.config.is_excluded(&import_url) {
                log::debug!("Leaving excluded import {import_url}");
            } else {
                log::warn!("Import {import_url} belongs to no bundle");
                self.record(host_bundle, Provenance::Missing, import_url);
            }
            return Ok(());
        };

        if import_url == document.url {
            tree::remove_with_trailing_whitespace(link);
            return Err(BundlerError::SelfImport(import_url.to_string()));
        }

        if import_bundle != *host_bundle {
            // A bundle named after the import itself was only just marked above.
            if !lazy && import_url != import_bundle && self.strip_set.contains(&import_bundle) {
                log::debug!("Stripping redundant link to bundle {import_bundle}");
                tree::remove_with_trailing_whitespace(link);
                return Ok(());
            }
            log::debug!("Linking {import_url} through bundle {import_bundle}");
            tree::set_attr(link, "href", relative_url(&document.url, &import_bundle));
            if !lazy {
                self.strip_set.insert(import_bundle);
            }
            return Ok(());
        }

        if lazy {
            return Ok(());
        }

        let resolver = self.resolver;
        let Some(resource) = resolver
            .reachable(document, DependencyKind::HtmlImport)
            .into_iter()
            .find(|resource| resource.url == import_url)
        else {
            log::debug!("Import {import_url} is not reachable from {}", document.url);
            return Ok(());
        };

        let in_templates = self.config.rewrite_urls_in_templates();
        let fragment = Fragment::parse(&resource.raw_text);
        emulate_base_tag(fragment.root(), &import_url, in_templates);
        rewrite_ast_base_url(fragment.root(), &import_url, &document.url, in_templates);

        if self.config.sourcemaps()
            && let Err(e) = compose_fragment_script_maps(
                resolver,
                fragment.root(),
                &import_url,
                &resource.raw_text,
            )
            .await
        {
            log::warn!("Skipping source maps for {import_url}: {e}");
        }

        let nested = tree::query_all(fragment.root(), false, matchers::is_any_html_import);

        for child in fragment.into_children() {
            link.insert_before(child);
        }
        tree::remove_with_trailing_whitespace(link);
        log::debug!("Inlined {import_url} into {}", document.url);
        self.record(host_bundle, Provenance::HtmlImport, import_url);

        for nested_link in nested {
            let result = Box::pin(self.inline_html_import(document, &nested_link, host_bundle)).await;
            recover(result, &document.url)?;
        }
        Ok(())
    }
}
