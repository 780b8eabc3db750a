//! Tree navigation and mutation helpers over kuchiki nodes
//!
//! `<template>` contents live in a separate fragment that is not a child of
//! the template element, so traversal has to opt in to visiting them and
//! ancestor walks have to hop from that fragment back to its template.

use kuchiki::traits::TendrilSink;
use kuchiki::NodeRef;

use crate::errors::{BundlerError, BundlerResult};

/// Local tag name of an element node
#[must_use]
pub fn tag_name(node: &NodeRef) -> Option<String> {
    node.as_element().map(|e| e.name.local.to_string())
}

/// True if `node` is an element named `tag` (ASCII case-insensitive)
#[must_use]
pub fn is_tag(node: &NodeRef, tag: &str) -> bool {
    node.as_element().is_some_and(|e| {
        let name: &str = &e.name.local;
        name.eq_ignore_ascii_case(tag)
    })
}

#[must_use]
pub fn get_attr(node: &NodeRef, name: &str) -> Option<String> {
    let element = node.as_element()?;
    let attrs = element.attributes.borrow();
    attrs.get(name).map(str::to_string)
}

#[must_use]
pub fn has_attr(node: &NodeRef, name: &str) -> bool {
    node.as_element()
        .is_some_and(|e| e.attributes.borrow().contains(name))
}

pub fn set_attr(node: &NodeRef, name: &str, value: impl Into<String>) {
    if let Some(element) = node.as_element() {
        element.attributes.borrow_mut().insert(name, value.into());
    }
}

pub fn remove_attr(node: &NodeRef, name: &str) {
    if let Some(element) = node.as_element() {
        element.attributes.borrow_mut().remove(name);
    }
}

/// Concatenated text of all descendant text nodes
#[must_use]
pub fn text_content(node: &NodeRef) -> String {
    node.text_contents()
}

/// Replace all children of `node` with a single text node
pub fn set_text_content(node: &NodeRef, text: &str) {
    let children: Vec<NodeRef> = node.children().collect();
    for child in children {
        child.detach();
    }
    node.append(NodeRef::new_text(text));
}

/// Build a detached, empty element
///
/// Parsed rather than constructed so no namespace/qualified-name plumbing
/// leaks into callers.
pub fn create_element(tag: &str) -> BundlerResult<NodeRef> {
    let document = kuchiki::parse_html().one(format!("<{tag}></{tag}>"));
    let element = document
        .select_first(tag)
        .map_err(|()| BundlerError::Dom(format!("Failed to create <{tag}> element")))?;
    let node = element.as_node().clone();
    node.detach();
    Ok(node)
}

/// Template contents of a `<template>` element, if any
#[must_use]
pub fn template_contents(node: &NodeRef) -> Option<NodeRef> {
    node.as_element().and_then(|e| e.template_contents.clone())
}

/// Child nodes, optionally substituting template contents for a template's
/// (always empty) direct children
fn child_nodes(node: &NodeRef, include_templates: bool) -> Vec<NodeRef> {
    if include_templates && let Some(contents) = template_contents(node) {
        return contents.children().collect();
    }
    node.children().collect()
}

/// Every element below `root` in document order, optionally descending into
/// template contents
#[must_use]
pub fn descendant_elements(root: &NodeRef, include_templates: bool) -> Vec<NodeRef> {
    let mut out = Vec::new();
    let mut stack: Vec<NodeRef> = child_nodes(root, include_templates);
    stack.reverse();

    while let Some(node) = stack.pop() {
        if node.as_element().is_none() {
            continue;
        }
        let mut children = child_nodes(&node, include_templates);
        children.reverse();
        stack.extend(children);
        out.push(node);
    }
    out
}

/// Elements below `root` matching `predicate`, in document order
#[must_use]
pub fn query_all(
    root: &NodeRef,
    include_templates: bool,
    predicate: impl Fn(&NodeRef) -> bool,
) -> Vec<NodeRef> {
    descendant_elements(root, include_templates)
        .into_iter()
        .filter(|node| predicate(node))
        .collect()
}

/// `(contents fragment, owning template)` for every template under `root`
fn template_hosts(root: &NodeRef) -> Vec<(NodeRef, NodeRef)> {
    descendant_elements(root, true)
        .into_iter()
        .filter_map(|node| template_contents(&node).map(|contents| (contents, node)))
        .collect()
}

/// Proper ancestors of `node`, nearest first, hopping from template contents
/// to the owning template element
///
/// The template index is built on the first hop and reused for the rest.
#[must_use]
pub fn ancestors_across_templates(node: &NodeRef, root: &NodeRef) -> Vec<NodeRef> {
    let mut out = Vec::new();
    let mut hosts: Option<Vec<(NodeRef, NodeRef)>> = None;
    let mut current = node.clone();
    loop {
        let next = match current.parent() {
            Some(parent) => parent,
            None if current != *root => {
                let hosts = hosts.get_or_insert_with(|| template_hosts(root));
                match hosts.iter().find(|(contents, _)| *contents == current) {
                    Some((_, host)) => host.clone(),
                    None => break,
                }
            }
            None => break,
        };
        out.push(next.clone());
        current = next;
    }
    out
}

/// Nearest ancestor matching `predicate`, crossing template boundaries
#[must_use]
pub fn closest_ancestor(
    node: &NodeRef,
    root: &NodeRef,
    predicate: impl Fn(&NodeRef) -> bool,
) -> Option<NodeRef> {
    ancestors_across_templates(node, root)
        .into_iter()
        .find(|ancestor| predicate(ancestor))
}

/// True if the node is a text node containing only whitespace
#[must_use]
pub fn is_blank_text(node: &NodeRef) -> bool {
    node.as_text()
        .is_some_and(|text| text.borrow().chars().all(char::is_whitespace))
}

/// Detach `node` along with an immediately following whitespace-only text node
pub fn remove_with_trailing_whitespace(node: &NodeRef) {
    if let Some(next) = node.next_sibling()
        && is_blank_text(&next)
    {
        next.detach();
    }
    node.detach();
}

/// Replace `old` with `new` in place
pub fn replace_node(old: &NodeRef, new: NodeRef) {
    old.insert_before(new);
    old.detach();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Fragment;

    #[test]
    fn test_descendants_skip_templates_unless_requested() {
        let fragment =
            Fragment::parse(r#"<div><a href="x"></a></div><template><img src="y.png"></template>"#);
        let without: Vec<_> = descendant_elements(fragment.root(), false)
            .iter()
            .filter_map(tag_name)
            .collect();
        assert_eq!(without, vec!["div", "a", "template"]);

        let with: Vec<_> = descendant_elements(fragment.root(), true)
            .iter()
            .filter_map(tag_name)
            .collect();
        assert_eq!(with, vec!["div", "a", "template", "img"]);
    }

    #[test]
    fn test_closest_ancestor_crosses_template_boundary() {
        let fragment = Fragment::parse(
            r#"<dom-module id="m"><template><style>a{}</style></template></dom-module>"#,
        );
        let style = query_all(fragment.root(), true, |n| is_tag(n, "style"))
            .pop()
            .unwrap();
        let module = closest_ancestor(&style, fragment.root(), |n| is_tag(n, "dom-module"));
        assert!(module.is_some());
        assert_eq!(get_attr(&module.unwrap(), "id").as_deref(), Some("m"));
    }

    #[test]
    fn test_ancestors_hop_nested_templates() {
        let fragment = Fragment::parse(
            r#"<dom-module id="m"><template><div><template><style>a{}</style></template></div></template></dom-module>"#,
        );
        let style = query_all(fragment.root(), true, |n| is_tag(n, "style"))
            .pop()
            .unwrap();
        let names: Vec<String> = ancestors_across_templates(&style, fragment.root())
            .iter()
            .filter_map(tag_name)
            .collect();
        assert_eq!(names, vec!["template", "div", "template", "dom-module"]);
    }

    #[test]
    fn test_set_text_content_replaces_children() {
        let node = create_element("style").unwrap();
        set_text_content(&node, "a{}");
        set_text_content(&node, "b{}");
        assert_eq!(text_content(&node), "b{}");
        assert_eq!(node.children().count(), 1);
    }

    #[test]
    fn test_remove_with_trailing_whitespace() {
        let fragment = Fragment::parse("<p>a</p><link rel=\"import\" href=\"x\">\n  <p>b</p>");
        let link = query_all(fragment.root(), false, |n| is_tag(n, "link"))
            .pop()
            .unwrap();
        remove_with_trailing_whitespace(&link);
        let html = crate::dom::serialize_node(fragment.root()).unwrap();
        assert_eq!(html, "<p>a</p><p>b</p>");
    }

    #[test]
    fn test_attribute_helpers() {
        let node = create_element("link").unwrap();
        set_attr(&node, "href", "a.css");
        assert!(has_attr(&node, "href"));
        assert_eq!(get_attr(&node, "href").as_deref(), Some("a.css"));
        remove_attr(&node, "href");
        assert!(!has_attr(&node, "href"));
    }
}
