//! Builder for `BundlerConfig`
//!
//! Every field has a default, so the builder can be built straight away.
//! `build()` validates the exclusion list before handing out a config.

use anyhow::{Context, Result};
use url::Url;

use super::types::BundlerConfig;
use crate::errors::BundlerError;

/// Validate one exclusion entry
///
/// Entries are matched as string prefixes of resolved URLs. An entry that
/// has a scheme must parse as a URL; a bare entry must at least be
/// non-blank, since an empty prefix would exclude everything.
fn validate_exclude(entry: &str) -> std::result::Result<(), BundlerError> {
    if entry.trim().is_empty() {
        return Err(BundlerError::Config("exclude entries must not be empty".to_string()));
    }
    if entry.contains("://") {
        Url::parse(entry)
            .map_err(|e| BundlerError::Config(format!("invalid exclude URL '{entry}': {e}")))?;
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct BundlerConfigBuilder {
    pub(crate) sourcemaps: bool,
    pub(crate) rewrite_urls_in_templates: bool,
    pub(crate) inline_scripts: bool,
    pub(crate) inline_css: bool,
    pub(crate) excludes: Vec<String>,
}

impl Default for BundlerConfigBuilder {
    fn default() -> Self {
        let defaults = BundlerConfig::default();
        Self {
            sourcemaps: defaults.sourcemaps,
            rewrite_urls_in_templates: defaults.rewrite_urls_in_templates,
            inline_scripts: defaults.inline_scripts,
            inline_css: defaults.inline_css,
            excludes: defaults.excludes,
        }
    }
}

impl BundlerConfig {
    /// Create a builder for configuring a `BundlerConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> BundlerConfigBuilder {
        BundlerConfigBuilder::default()
    }
}

impl BundlerConfigBuilder {
    pub fn build(self) -> Result<BundlerConfig> {
        for entry in &self.excludes {
            validate_exclude(entry).context("Failed to build bundler configuration")?;
        }

        Ok(BundlerConfig {
            sourcemaps: self.sourcemaps,
            rewrite_urls_in_templates: self.rewrite_urls_in_templates,
            inline_scripts: self.inline_scripts,
            inline_css: self.inline_css,
            excludes: self.excludes,
        })
    }
}
