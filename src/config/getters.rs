//! Getter methods for `BundlerConfig`

use super::types::BundlerConfig;

impl BundlerConfig {
    #[must_use]
    pub fn sourcemaps(&self) -> bool {
        self.sourcemaps
    }

    #[must_use]
    pub fn rewrite_urls_in_templates(&self) -> bool {
        self.rewrite_urls_in_templates
    }

    #[must_use]
    pub fn inline_scripts(&self) -> bool {
        self.inline_scripts
    }

    #[must_use]
    pub fn inline_css(&self) -> bool {
        self.inline_css
    }

    #[must_use]
    pub fn excludes(&self) -> &[String] {
        &self.excludes
    }
}
