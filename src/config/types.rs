//! Core configuration type for bundling passes
//!
//! `BundlerConfig` carries the switches every inliner consults: whether to
//! compose source maps, whether template contents are re-based, which kinds
//! of external resources get inlined, and which URLs are never touched.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::utils::is_excluded;

/// Main configuration struct for bundling operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BundlerConfig {
    /// Compose and relocate source maps for inline scripts
    pub(crate) sourcemaps: bool,

    /// Re-base URLs inside `<template>` contents and module styles too
    ///
    /// Off by default: template markup and module styles are resolved
    /// against the module's asset path at runtime.
    pub(crate) rewrite_urls_in_templates: bool,

    /// Replace `<script src>` with the script's text
    pub(crate) inline_scripts: bool,

    /// Replace stylesheet links with `<style>` elements
    pub(crate) inline_css: bool,

    /// URL prefixes that are never inlined nor reported missing
    pub(crate) excludes: Vec<String>,
}

impl Default for BundlerConfig {
    fn default() -> Self {
        Self {
            sourcemaps: false,
            rewrite_urls_in_templates: false,
            inline_scripts: true,
            inline_css: true,
            excludes: Vec::new(),
        }
    }
}

impl BundlerConfig {
    /// Check whether `url` matches any exclusion entry (exact or prefix)
    #[must_use]
    pub fn is_excluded(&self, url: &Url) -> bool {
        is_excluded(url, &self.excludes)
    }
}
