//! Bundle manifest
//!
//! Maps every resolved URL to the bundle that owns it. The assignment is
//! decided outside this crate; the bundler only reads ownership and writes
//! provenance.

pub mod bundle;

use std::collections::{BTreeMap, HashMap};

use url::Url;

pub use bundle::{Bundle, StripSet};

/// Many-to-one mapping of file URLs to bundles
#[derive(Debug, Default, Clone)]
pub struct Manifest {
    bundles: BTreeMap<Url, Bundle>,
    owners: HashMap<Url, Url>,
}

impl Manifest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bundle and the files it owns
    ///
    /// A file already owned by another bundle keeps its first owner.
    pub fn add_bundle(&mut self, url: Url, files: impl IntoIterator<Item = Url>) -> &mut Bundle {
        let bundle = self
            .bundles
            .entry(url.clone())
            .or_insert_with(|| Bundle::new(url.clone()));

        for file in files {
            match self.owners.get(&file) {
                Some(owner) if *owner != url => {
                    log::warn!("{file} already belongs to bundle {owner}; ignoring claim by {url}");
                }
                _ => {
                    self.owners.insert(file.clone(), url.clone());
                    bundle.files.insert(file);
                }
            }
        }
        bundle
    }

    /// Bundle owning `url`, if any
    #[must_use]
    pub fn bundle_for(&self, url: &Url) -> Option<&Bundle> {
        self.owners.get(url).and_then(|owner| self.bundles.get(owner))
    }

    /// Bundle by its own URL
    #[must_use]
    pub fn bundle(&self, bundle_url: &Url) -> Option<&Bundle> {
        self.bundles.get(bundle_url)
    }

    pub fn bundle_mut(&mut self, bundle_url: &Url) -> Option<&mut Bundle> {
        self.bundles.get_mut(bundle_url)
    }

    /// All bundles in URL order
    pub fn bundles(&self) -> impl Iterator<Item = &Bundle> {
        self.bundles.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }
}
