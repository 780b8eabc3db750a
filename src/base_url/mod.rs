//! Base URL rewriting
//!
//! When markup moves from one document into another, every relative
//! reference in it has to keep pointing at the same resource. This module
//! re-expresses hrefs, `url()` tokens, style attributes and module asset
//! paths relative to the new location, and folds literal `<base>` elements
//! into the markup they govern.

pub mod base_tag;
pub mod css;

use kuchiki::NodeRef;
use url::Url;

use crate::dom::{matchers, tree};
use crate::utils::{
    ASSETPATH_ATTR, URL_ATTRS, is_absolute_url, is_templated_url, relative_path, relative_url,
    resolve_url, same_origin, url_directory,
};

pub use base_tag::emulate_base_tag;
pub use css::rewrite_css_text_base_url;

/// Re-express `href`, written relative to `old_base`, relative to `new_base`
///
/// Absolute and data-bound hrefs pass through unchanged. Cross-origin
/// targets come back fully absolute.
#[must_use]
pub fn rewrite_href_base_url(href: &str, old_base: &Url, new_base: &Url) -> String {
    if old_base == new_base || is_absolute_url(href) || is_templated_url(href) {
        return href.to_string();
    }
    match resolve_url(old_base, href) {
        Ok(absolute) => relative_url(new_base, &absolute),
        Err(e) => {
            log::debug!("Leaving href untouched: {e}");
            href.to_string()
        }
    }
}

/// Re-base all relative references under `root` from `old_base` to `new_base`
///
/// Covers URL-bearing attributes, `<style>` text and module asset paths.
/// With `rewrite_urls_in_templates` off, template contents are skipped and
/// styles inside module containers are left for the module's asset path to
/// resolve at runtime.
pub fn rewrite_ast_base_url(
    root: &NodeRef,
    old_base: &Url,
    new_base: &Url,
    rewrite_urls_in_templates: bool,
) {
    rewrite_element_attrs(root, old_base, new_base, rewrite_urls_in_templates);
    rewrite_style_elements(root, old_base, new_base, rewrite_urls_in_templates);
    set_module_assetpaths(root, old_base, new_base);
}

fn in_module_container(node: &NodeRef, root: &NodeRef) -> bool {
    tree::closest_ancestor(node, root, matchers::is_module_container).is_some()
}

fn rewrite_element_attrs(
    root: &NodeRef,
    old_base: &Url,
    new_base: &Url,
    rewrite_urls_in_templates: bool,
) {
    let nodes = tree::query_all(root, rewrite_urls_in_templates, matchers::has_url_attr);
    for node in nodes {
        // Lazy imports inside a module resolve against the module at load time.
        if matchers::is_lazy_import(&node) && in_module_container(&node, root) {
            continue;
        }
        for attr in URL_ATTRS {
            let Some(value) = tree::get_attr(&node, attr) else {
                continue;
            };
            if is_templated_url(&value) {
                continue;
            }
            let rewritten = if attr == "style" {
                rewrite_css_text_base_url(&value, old_base, new_base)
            } else {
                rewrite_href_base_url(&value, old_base, new_base)
            };
            if rewritten != value {
                tree::set_attr(&node, attr, rewritten);
            }
        }
    }
}

fn rewrite_style_elements(
    root: &NodeRef,
    old_base: &Url,
    new_base: &Url,
    rewrite_urls_in_templates: bool,
) {
    let styles = tree::query_all(root, rewrite_urls_in_templates, matchers::is_style);
    for style in styles {
        if !rewrite_urls_in_templates && in_module_container(&style, root) {
            continue;
        }
        let css = tree::text_content(&style);
        let rewritten = rewrite_css_text_base_url(&css, old_base, new_base);
        if rewritten != css {
            tree::set_text_content(&style, &rewritten);
        }
    }
}

fn set_module_assetpaths(root: &NodeRef, old_base: &Url, new_base: &Url) {
    let modules = tree::query_all(root, false, |node| {
        matchers::is_module_container(node) && !tree::has_attr(node, ASSETPATH_ATTR)
    });
    if modules.is_empty() {
        return;
    }

    let old_dir = url_directory(old_base);
    let assetpath = if same_origin(new_base, &old_dir) {
        relative_path(new_base, &old_dir)
    } else {
        old_dir.to_string()
    };
    // Same directory as the new document: the document base already works.
    if assetpath.is_empty() {
        return;
    }
    for module in modules {
        tree::set_attr(&module, ASSETPATH_ATTR, assetpath.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Fragment, serialize_node};

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn rebase(html: &str, old: &str, new: &str, in_templates: bool) -> String {
        let fragment = Fragment::parse(html);
        rewrite_ast_base_url(fragment.root(), &url(old), &url(new), in_templates);
        serialize_node(fragment.root()).unwrap()
    }

    #[test]
    fn test_rewrite_href_algebra() {
        let old = url("https://example.com/components/x/el.html");
        let new = url("https://example.com/index.html");
        assert_eq!(rewrite_href_base_url("a.png", &old, &new), "components/x/a.png");
        assert_eq!(rewrite_href_base_url("../y/b.css?v=1#f", &old, &new), "components/y/b.css?v=1#f");
        assert_eq!(rewrite_href_base_url("/root.css", &old, &new), "/root.css");
        assert_eq!(rewrite_href_base_url("https://cdn.com/a.js", &old, &new), "https://cdn.com/a.js");
        assert_eq!(rewrite_href_base_url("[[path]]a.png", &old, &new), "[[path]]a.png");
    }

    #[test]
    fn test_rewrites_url_attributes() {
        let out = rebase(
            r#"<a href="page.html">p</a><img src="img/a.png"><form action="submit"></form><div style="background: url('bg.png')"></div>"#,
            "https://example.com/lib/el.html",
            "https://example.com/index.html",
            false,
        );
        assert!(out.contains(r#"href="lib/page.html""#));
        assert!(out.contains(r#"src="lib/img/a.png""#));
        assert!(out.contains(r#"action="lib/submit""#));
        assert!(out.contains(r#"style="background: url('lib/bg.png')""#));
    }

    #[test]
    fn test_rewrites_style_elements_outside_modules_only() {
        let out = rebase(
            "<style>a { b: url(x.png) }</style><dom-module id=\"m\"><style>c { d: url(y.png) }</style></dom-module>",
            "https://example.com/lib/el.html",
            "https://example.com/index.html",
            false,
        );
        assert!(out.contains("url(lib/x.png)"));
        assert!(out.contains("url(y.png)"));
    }

    #[test]
    fn test_rewrites_module_styles_when_templates_enabled() {
        let out = rebase(
            "<dom-module id=\"m\"><template><style>c { d: url(y.png) }</style><img src=\"i.png\"></template></dom-module>",
            "https://example.com/lib/el.html",
            "https://example.com/index.html",
            true,
        );
        assert!(out.contains("url(lib/y.png)"));
        assert!(out.contains(r#"src="lib/i.png""#));
    }

    #[test]
    fn test_template_contents_skipped_by_default() {
        let out = rebase(
            r#"<template><img src="i.png"></template>"#,
            "https://example.com/lib/el.html",
            "https://example.com/index.html",
            false,
        );
        assert!(out.contains(r#"src="i.png""#));
    }

    #[test]
    fn test_sets_module_assetpath() {
        let out = rebase(
            r#"<dom-module id="a"></dom-module><dom-module id="b" assetpath="../other/"></dom-module>"#,
            "https://example.com/lib/el/el.html",
            "https://example.com/app/index.html",
            false,
        );
        assert!(out.contains(r#"<dom-module assetpath="../lib/el/" id="a">"#));
        assert!(out.contains(r#"<dom-module assetpath="../lib/other/" id="b">"#));
    }

    #[test]
    fn test_same_directory_leaves_assetpath_unset() {
        let out = rebase(
            r#"<dom-module id="a"></dom-module>"#,
            "https://example.com/app/el.html",
            "https://example.com/app/index.html",
            false,
        );
        assert!(!out.contains("assetpath"));
    }

    #[test]
    fn test_lazy_import_inside_module_is_exempt() {
        let out = rebase(
            r#"<dom-module id="a"><link rel="lazy-import" href="lazy.html"></dom-module><link rel="lazy-import" href="other.html">"#,
            "https://example.com/lib/el.html",
            "https://example.com/index.html",
            false,
        );
        assert!(out.contains(r#"href="lazy.html""#));
        assert!(out.contains(r#"href="lib/other.html""#));
    }

    #[test]
    fn test_identity_rebase_is_noop() {
        let html = r#"<a href="./x/../y.html">y</a><style>a{b:url(./q.png)}</style><dom-module id="m"></dom-module>"#;
        let before = serialize_node(Fragment::parse(html).root()).unwrap();
        let after = rebase(
            html,
            "https://example.com/a/b.html",
            "https://example.com/a/b.html",
            true,
        );
        assert_eq!(before, after);
    }
}
