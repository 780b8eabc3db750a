//! `<base>` element emulation for inlined markup
//!
//! A `<base>` inside an imported document only governed that document. Once
//! its markup is spliced into a host, the element is removed and its effect
//! is baked into the markup instead.

use kuchiki::NodeRef;
use url::Url;

use super::rewrite_ast_base_url;
use crate::dom::{matchers, tree};
use crate::utils::resolve_url;

/// Remove `<base>` elements under `root`, applying the first one's effect
///
/// A base `href` re-bases every relative reference from the declared base to
/// `doc_url`. A base `target` is copied onto each `<a>` and `<form>` that
/// lacks one.
pub fn emulate_base_tag(root: &NodeRef, doc_url: &Url, rewrite_urls_in_templates: bool) {
    let bases = tree::query_all(root, false, matchers::is_base);
    let Some(first) = bases.first() else {
        return;
    };
    let href = tree::get_attr(first, "href");
    let target = tree::get_attr(first, "target");

    for base in &bases {
        tree::remove_with_trailing_whitespace(base);
    }

    if let Some(href) = href {
        match resolve_url(doc_url, &href) {
            Ok(base_url) => rewrite_ast_base_url(root, &base_url, doc_url, rewrite_urls_in_templates),
            Err(e) => log::warn!("Ignoring <base href> in {doc_url}: {e}"),
        }
    }

    if let Some(target) = target {
        let untargeted = tree::query_all(root, rewrite_urls_in_templates, |node| {
            matchers::is_anchor_or_form(node) && !tree::has_attr(node, "target")
        });
        for node in untargeted {
            tree::set_attr(&node, "target", target.clone());
        }
    }
}
