//! Parsed documents and fragments
//!
//! A [`Document`] owns its kuchiki tree. Nodes hold weak parent links, so
//! moving a node between trees is a detach + append, never a copy.

use std::io;

use html5ever::QualName;
use html5ever::serialize::{Serialize, SerializeOpts, Serializer, TraversalScope, serialize};
use kuchiki::traits::TendrilSink;
use kuchiki::{NodeData, NodeRef};
use url::Url;

use crate::errors::{BundlerError, BundlerResult};

/// A parsed HTML document with its URL and original text
#[derive(Debug)]
pub struct Document {
    pub url: Url,
    pub ast: NodeRef,
    pub raw_text: String,
}

impl Document {
    /// Parse `text` as a full HTML document located at `url`
    pub fn parse(url: Url, text: impl Into<String>) -> Self {
        let raw_text = text.into();
        let ast = kuchiki::parse_html().one(raw_text.as_str());
        Self { url, ast, raw_text }
    }

    /// Parse the original text again, yielding an independent tree
    #[must_use]
    pub fn reparse(&self) -> Self {
        Self::parse(self.url.clone(), self.raw_text.clone())
    }

    /// Serialize the current tree to HTML
    pub fn serialize(&self) -> BundlerResult<String> {
        serialize_node(&self.ast)
    }
}

/// Serialize any node (document, fragment or element) to HTML
///
/// `<template>` elements are written with their contents.
pub fn serialize_node(node: &NodeRef) -> BundlerResult<String> {
    let mut html_output = Vec::new();
    serialize(
        &mut html_output,
        &TemplateAware(node),
        SerializeOpts {
            traversal_scope: TraversalScope::IncludeNode,
            ..Default::default()
        },
    )?;
    String::from_utf8(html_output)
        .map_err(|e| BundlerError::Dom(format!("Serialized HTML is not UTF-8: {e}")))
}

/// Serialization view of a node that descends into template contents,
/// which kuchiki keeps outside the element's children
struct TemplateAware<'a>(&'a NodeRef);

impl Serialize for TemplateAware<'_> {
    fn serialize<S: Serializer>(
        &self,
        serializer: &mut S,
        traversal_scope: TraversalScope,
    ) -> io::Result<()> {
        let node = self.0;
        let include_node = matches!(traversal_scope, TraversalScope::IncludeNode);

        match node.data() {
            NodeData::Element(element) => {
                if include_node {
                    let attributes = element.attributes.borrow();
                    let attrs: Vec<(QualName, &str)> = attributes
                        .map
                        .iter()
                        .map(|(name, attr)| {
                            (
                                QualName::new(attr.prefix.clone(), name.ns.clone(), name.local.clone()),
                                attr.value.as_str(),
                            )
                        })
                        .collect();
                    serializer.start_elem(
                        element.name.clone(),
                        attrs.iter().map(|(name, value)| (name, *value)),
                    )?;
                }

                let children_of = element.template_contents.as_ref().unwrap_or(node);
                for child in children_of.children() {
                    TemplateAware(&child).serialize(serializer, TraversalScope::IncludeNode)?;
                }

                if include_node {
                    serializer.end_elem(element.name.clone())?;
                }
                Ok(())
            }
            NodeData::Document(_) | NodeData::DocumentFragment => {
                for child in node.children() {
                    TemplateAware(&child).serialize(serializer, TraversalScope::IncludeNode)?;
                }
                Ok(())
            }
            _ if !include_node => Ok(()),
            NodeData::Doctype(doctype) => serializer.write_doctype(&doctype.name),
            NodeData::Text(text) => serializer.write_text(&text.borrow()),
            NodeData::Comment(text) => serializer.write_comment(&text.borrow()),
            NodeData::ProcessingInstruction(contents) => {
                let contents = contents.borrow();
                serializer.write_processing_instruction(&contents.0, &contents.1)
            }
        }
    }
}

/// A parsed subtree with no implicit `<html>`/`<head>`/`<body>` wrappers
///
/// Its children are moved into a host document when inlined; the fragment
/// root itself is then dropped.
#[derive(Debug)]
pub struct Fragment {
    root: NodeRef,
}

impl Fragment {
    /// Parse `text` without the wrapper elements the HTML parser inserts
    ///
    /// Children of the implied `<head>` and `<body>` are lifted, in order,
    /// into a single fragment root. Doctypes are dropped.
    pub fn parse(text: &str) -> Self {
        let parsed = kuchiki::parse_html().one(text);
        let root = NodeRef::new(NodeData::DocumentFragment);

        let top_level: Vec<NodeRef> = parsed.children().collect();
        for node in top_level {
            match node.data() {
                NodeData::Doctype(_) => {}
                NodeData::Element(element) if &*element.name.local == "html" => {
                    let sections: Vec<NodeRef> = node.children().collect();
                    for section in sections {
                        if is_wrapper(&section) {
                            let children: Vec<NodeRef> = section.children().collect();
                            for child in children {
                                root.append(child);
                            }
                        } else {
                            root.append(section);
                        }
                    }
                }
                _ => root.append(node),
            }
        }

        Self { root }
    }

    /// Root node whose children are the fragment's top-level nodes
    #[must_use]
    pub fn root(&self) -> &NodeRef {
        &self.root
    }

    /// Detach and return the top-level nodes, consuming the fragment
    #[must_use]
    pub fn into_children(self) -> Vec<NodeRef> {
        let children: Vec<NodeRef> = self.root.children().collect();
        for child in &children {
            child.detach();
        }
        children
    }
}

fn is_wrapper(node: &NodeRef) -> bool {
    node.as_element()
        .is_some_and(|element| matches!(&*element.name.local, "head" | "body"))
}
