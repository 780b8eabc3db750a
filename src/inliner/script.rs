//! External script inlining

use kuchiki::NodeRef;
use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use super::context::{BundlePass, Provenance};
use crate::dom::{Document, tree};
use crate::errors::BundlerResult;
use crate::resolver::{DependencyKind, Resolver};
use crate::sourcemap::{MapOffsets, compose_inline_script_map};

lazy_static! {
    static ref SCRIPT_END_TAG: Regex =
        Regex::new(r"(?i)</(script)").expect("BUG: hardcoded script end tag regex is invalid");
}

/// Make script text safe to embed between `<script>` tags
///
/// `</script` would end the element early and `<!--` would switch the HTML
/// tokenizer into its escaped state.
#[must_use]
pub fn escape_script_text(text: &str) -> String {
    SCRIPT_END_TAG
        .replace_all(text, r"<\/$1")
        .replace("<!--", r"<\!--")
}

impl<R: Resolver> BundlePass<'_, R> {
    /// Replace `<script src>` with the script's own text
    ///
    /// Unresolvable or excluded scripts are left alone. Scripts missing from
    /// the document's dependency graph are recorded as missing.
    pub async fn inline_script(
        &mut self,
        document: &Document,
        script: &NodeRef,
        host_bundle: &Url,
    ) -> BundlerResult<()> {
        let Some(src) = tree::get_attr(script, "src") else {
            return Ok(());
        };
        let Some(script_url) = self.resolver.resolve(&src, &document.url) else {
            log::debug!("Leaving unresolvable script '{src}' in {}", document.url);
            return Ok(());
        };
        if self.config.is_excluded(&script_url) {
            log::debug!("Leaving excluded script {script_url}");
            return Ok(());
        }

        let resolver = self.resolver;
        let Some(resource) = resolver
            .reachable(document, DependencyKind::HtmlScript)
            .into_iter()
            .find(|resource| resource.url == script_url)
        else {
            log::warn!("Script {script_url} is not available to {}", document.url);
            self.record(host_bundle, Provenance::Missing, script_url);
            return Ok(());
        };

        let text = if self.config.sourcemaps() {
            // The leading line break keeps the script off the tag's line.
            let prefixed = format!("\n{}", resource.raw_text);
            let offsets = MapOffsets::new(-1, 0, 1, 0);
            match compose_inline_script_map(resolver, &script_url, &prefixed, offsets).await {
                Ok(composed) => composed,
                Err(e) => {
                    log::warn!("Skipping source map for {script_url}: {e}");
                    prefixed
                }
            }
        } else {
            resource.raw_text.clone()
        };

        tree::remove_attr(script, "src");
        tree::set_text_content(script, &escape_script_text(&text));
        log::debug!("Inlined script {script_url} into {}", document.url);
        self.record(host_bundle, Provenance::Script, script_url);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_script_text() {
        assert_eq!(
            escape_script_text(r#"document.write("</SCRIPT>"); x = "<!--";"#),
            r#"document.write("<\/SCRIPT>"); x = "<\!--";"#
        );
        assert_eq!(escape_script_text("a < b"), "a < b");
    }
}
