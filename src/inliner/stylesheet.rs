//! Stylesheet link inlining
//!
//! A stylesheet link becomes a `<style>` element holding the stylesheet's
//! text, with every `url()` re-based from the stylesheet's location to the
//! place the rules now live.

use kuchiki::NodeRef;
use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use super::context::{BundlePass, Provenance};
use crate::base_url::rewrite_css_text_base_url;
use crate::dom::{Document, matchers, tree};
use crate::errors::BundlerResult;
use crate::resolver::{DependencyKind, Resolver};
use crate::utils::{ASSETPATH_ATTR, resolve_url};

lazy_static! {
    static ref STYLE_END_TAG: Regex =
        Regex::new(r"(?i)</(style)").expect("BUG: hardcoded style end tag regex is invalid");
}

/// Make CSS text safe to embed between `<style>` tags
#[must_use]
pub fn escape_style_text(text: &str) -> String {
    STYLE_END_TAG.replace_all(text, r"<\/$1").into_owned()
}

impl<R: Resolver> BundlePass<'_, R> {
    /// Base URL the rules of a stylesheet linked by `link` resolve against
    ///
    /// Inside a module container with an `assetpath`, and with template URL
    /// rewriting off, that is the asset path; otherwise the document URL.
    fn stylesheet_base(&self, document: &Document, link: &NodeRef) -> Url {
        if self.config.rewrite_urls_in_templates() {
            return document.url.clone();
        }
        tree::closest_ancestor(link, &document.ast, matchers::is_module_container)
            .and_then(|module| tree::get_attr(&module, ASSETPATH_ATTR))
            .and_then(|assetpath| resolve_url(&document.url, &assetpath).ok())
            .unwrap_or_else(|| document.url.clone())
    }

    /// Replace a stylesheet `link` with an equivalent `<style>` element
    pub async fn inline_stylesheet(
        &mut self,
        document: &Document,
        link: &NodeRef,
        host_bundle: &Url,
    ) -> BundlerResult<()> {
        let Some(href) = tree::get_attr(link, "href") else {
            return Ok(());
        };
        let Some(style_url) = self.resolver.resolve(&href, &document.url) else {
            log::debug!("Leaving unresolvable stylesheet '{href}' in {}", document.url);
            return Ok(());
        };
        if self.config.is_excluded(&style_url) {
            log::debug!("Leaving excluded stylesheet {style_url}");
            return Ok(());
        }

        let resolver = self.resolver;
        let Some(resource) = resolver
            .reachable(document, DependencyKind::HtmlStyle)
            .into_iter()
            .find(|resource| resource.url == style_url)
        else {
            log::warn!("Stylesheet {style_url} is not available to {}", document.url);
            self.record(host_bundle, Provenance::Missing, style_url);
            return Ok(());
        };

        let base = self.stylesheet_base(document, link);
        let css = rewrite_css_text_base_url(&resource.raw_text, &style_url, &base);

        let style = tree::create_element("style")?;
        if let Some(media) = tree::get_attr(link, "media") {
            tree::set_attr(&style, "media", media);
        }
        tree::set_text_content(&style, &escape_style_text(&css));
        tree::replace_node(link, style);

        log::debug!("Inlined stylesheet {style_url} into {}", document.url);
        self.record(host_bundle, Provenance::Style, style_url);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_style_text() {
        assert_eq!(
            escape_style_text("a::after { content: '</Style>' }"),
            r"a::after { content: '<\/Style>' }"
        );
    }
}
