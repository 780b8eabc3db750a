//! Inliners
//!
//! All inlining runs through a [`BundlePass`], which threads the resolver,
//! the manifest, the configuration and the pass-scoped `StripSet` through
//! every operation. Each inliner mutates the host document in place and
//! degrades locally on per-reference failures.

pub mod context;
pub mod document_bundler;
pub mod html_import;
pub mod script;
pub mod stylesheet;

pub use context::BundlePass;
pub use document_bundler::BundledDocument;
pub use script::escape_script_text;
pub use stylesheet::escape_style_text;
