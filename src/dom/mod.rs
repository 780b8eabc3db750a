//! HTML document model
//!
//! Thin layer over kuchiki: documents and context-free fragments, tree
//! helpers that understand `<template>` contents, reference-tag predicates
//! and a scanner that recovers script positions from serialized text.

pub mod document;
pub mod matchers;
pub mod scanner;
pub mod tree;

pub use document::{Document, Fragment, serialize_node};
pub use scanner::{TextPosition, position_at, script_content_starts};
