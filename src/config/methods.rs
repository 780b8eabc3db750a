//! Fluent setters on `BundlerConfigBuilder`

use super::builder::BundlerConfigBuilder;

impl BundlerConfigBuilder {
    /// Compose source maps for inline scripts
    ///
    /// Every inline script in the output gets a trailing inline map: an
    /// existing map is shifted to the script's final position, otherwise an
    /// identity map pointing back at the script's original location is
    /// synthesized.
    ///
    /// # Example
    /// ```rust
    /// # use kodegen_tools_htmlbundle::config::BundlerConfig;
    /// # fn main() -> anyhow::Result<()> {
    /// let config = BundlerConfig::builder().sourcemaps(true).build()?;
    /// assert!(config.sourcemaps());
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn sourcemaps(mut self, enabled: bool) -> Self {
        self.sourcemaps = enabled;
        self
    }

    /// Re-base URLs inside template contents and module styles as well
    #[must_use]
    pub fn rewrite_urls_in_templates(mut self, enabled: bool) -> Self {
        self.rewrite_urls_in_templates = enabled;
        self
    }

    #[must_use]
    pub fn inline_scripts(mut self, enabled: bool) -> Self {
        self.inline_scripts = enabled;
        self
    }

    #[must_use]
    pub fn inline_css(mut self, enabled: bool) -> Self {
        self.inline_css = enabled;
        self
    }

    /// Add one URL prefix that is never inlined nor reported missing
    #[must_use]
    pub fn exclude(mut self, prefix: impl Into<String>) -> Self {
        self.excludes.push(prefix.into());
        self
    }

    /// Add several URL prefixes, after any already added
    #[must_use]
    pub fn excludes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excludes.extend(prefixes.into_iter().map(Into::into));
        self
    }
}
