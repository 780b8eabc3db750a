//! Predicates that classify reference tags
//!
//! Link, script and style tags are plain elements; what makes one an HTML
//! import, a lazy import or a stylesheet is its tag name plus `rel`, `type`
//! and the presence of `href`/`src`.

use kuchiki::NodeRef;

use super::tree::{get_attr, has_attr, is_tag};
use crate::utils::{
    JAVASCRIPT_TYPES, MODULE_CONTAINER_TAG, REL_IMPORT, REL_LAZY_IMPORT, REL_STYLESHEET, URL_ATTRS,
};

/// Whitespace-separated `rel` tokens, lowercased
fn rel_tokens(node: &NodeRef) -> Vec<String> {
    get_attr(node, "rel")
        .map(|rel| {
            rel.split_ascii_whitespace()
                .map(str::to_ascii_lowercase)
                .collect()
        })
        .unwrap_or_default()
}

fn has_rel(node: &NodeRef, token: &str) -> bool {
    rel_tokens(node).iter().any(|t| t == token)
}

fn has_type(node: &NodeRef, expected: &str) -> bool {
    get_attr(node, "type").is_some_and(|t| t.trim().eq_ignore_ascii_case(expected))
}

/// `<link rel="import" href>` that is not a CSS import
#[must_use]
pub fn is_html_import(node: &NodeRef) -> bool {
    is_tag(node, "link") && has_rel(node, REL_IMPORT) && has_attr(node, "href") && !has_type(node, "css")
}

/// `<link rel="lazy-import" href>`
#[must_use]
pub fn is_lazy_import(node: &NodeRef) -> bool {
    is_tag(node, "link") && has_rel(node, REL_LAZY_IMPORT) && has_attr(node, "href")
}

/// Either an eager or a lazy HTML import
#[must_use]
pub fn is_any_html_import(node: &NodeRef) -> bool {
    is_html_import(node) || is_lazy_import(node)
}

/// `<link rel="stylesheet" href>` or `<link rel="import" type="css" href>`
#[must_use]
pub fn is_stylesheet_link(node: &NodeRef) -> bool {
    is_tag(node, "link")
        && has_attr(node, "href")
        && (has_rel(node, REL_STYLESHEET) || (has_rel(node, REL_IMPORT) && has_type(node, "css")))
}

/// Whether a script `type` attribute denotes classic JavaScript
#[must_use]
pub fn is_javascript_type(type_attr: Option<&str>) -> bool {
    let Some(type_attr) = type_attr else {
        return true;
    };
    let mime = type_attr
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime.is_empty() || JAVASCRIPT_TYPES.contains(&mime.as_str())
}

fn is_javascript(node: &NodeRef) -> bool {
    is_tag(node, "script") && is_javascript_type(get_attr(node, "type").as_deref())
}

/// `<script src>` with a JavaScript type
#[must_use]
pub fn is_external_script(node: &NodeRef) -> bool {
    is_javascript(node) && has_attr(node, "src")
}

/// `<script>` without `src` and with a JavaScript type
#[must_use]
pub fn is_inline_javascript(node: &NodeRef) -> bool {
    is_javascript(node) && !has_attr(node, "src")
}

/// A `<style>` element holding CSS
#[must_use]
pub fn is_style(node: &NodeRef) -> bool {
    is_tag(node, "style") && get_attr(node, "type").is_none_or(|t| {
        let t = t.trim();
        t.is_empty() || t.eq_ignore_ascii_case("text/css")
    })
}

#[must_use]
pub fn is_base(node: &NodeRef) -> bool {
    is_tag(node, "base")
}

/// Legacy module container (`<dom-module>`)
#[must_use]
pub fn is_module_container(node: &NodeRef) -> bool {
    is_tag(node, MODULE_CONTAINER_TAG)
}

#[must_use]
pub fn is_anchor_or_form(node: &NodeRef) -> bool {
    is_tag(node, "a") || is_tag(node, "form")
}

/// Element carrying at least one URL-bearing attribute
#[must_use]
pub fn has_url_attr(node: &NodeRef) -> bool {
    URL_ATTRS.iter().any(|attr| has_attr(node, attr))
}
