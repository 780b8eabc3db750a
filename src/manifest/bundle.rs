//! Output bundles and their provenance records

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use url::Url;

/// One output unit: the documents emitted together, plus a record of what
/// was inlined into it and what could not be found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundle {
    pub url: Url,
    /// Files assigned to this bundle by the manifest
    pub files: BTreeSet<Url>,
    pub missing_imports: BTreeSet<Url>,
    pub inlined_html_imports: BTreeSet<Url>,
    pub inlined_scripts: BTreeSet<Url>,
    pub inlined_styles: BTreeSet<Url>,
}

impl Bundle {
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self {
            url,
            files: BTreeSet::new(),
            missing_imports: BTreeSet::new(),
            inlined_html_imports: BTreeSet::new(),
            inlined_scripts: BTreeSet::new(),
            inlined_styles: BTreeSet::new(),
        }
    }

    /// Total number of resources inlined into this bundle
    #[must_use]
    pub fn inlined_count(&self) -> usize {
        self.inlined_html_imports.len() + self.inlined_scripts.len() + self.inlined_styles.len()
    }

    /// Check if any referenced resource could not be found
    #[must_use]
    pub fn has_missing(&self) -> bool {
        !self.missing_imports.is_empty()
    }

    /// Clear provenance from a previous pass, keeping the file assignment
    pub fn reset_provenance(&mut self) {
        self.missing_imports.clear();
        self.inlined_html_imports.clear();
        self.inlined_scripts.clear();
        self.inlined_styles.clear();
    }
}

/// URLs already inlined or linked during the current pass
///
/// Created fresh for every pass; membership decides whether a later eager
/// reference to the same URL is stripped.
#[derive(Debug, Default, Clone)]
pub struct StripSet {
    urls: HashSet<Url>,
}

impl StripSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `url`; returns `false` if it was already present
    pub fn insert(&mut self, url: Url) -> bool {
        self.urls.insert(url)
    }

    #[must_use]
    pub fn contains(&self, url: &Url) -> bool {
        self.urls.contains(url)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
