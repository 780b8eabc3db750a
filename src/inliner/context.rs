//! Pass context shared by all inliners
//!
//! One `BundlePass` is one bundling pass: it borrows the resolver, owns the
//! manifest whose bundles collect provenance, and owns the `StripSet` that
//! deduplicates eager references.

use std::collections::BTreeSet;

use url::Url;

use crate::config::BundlerConfig;
use crate::errors::BundlerResult;
use crate::manifest::{Bundle, Manifest, StripSet};
use crate::resolver::Resolver;

/// Which provenance set of a bundle to record into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Provenance {
    Missing,
    HtmlImport,
    Script,
    Style,
}

pub struct BundlePass<'r, R: Resolver> {
    pub(crate) resolver: &'r R,
    pub(crate) manifest: Manifest,
    pub(crate) strip_set: StripSet,
    pub(crate) config: BundlerConfig,
}

impl<'r, R: Resolver> BundlePass<'r, R> {
    #[must_use]
    pub fn new(resolver: &'r R, manifest: Manifest, config: BundlerConfig) -> Self {
        Self {
            resolver,
            manifest,
            strip_set: StripSet::new(),
            config,
        }
    }

    #[must_use]
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Finish the pass, handing back the manifest with its provenance
    #[must_use]
    pub fn into_manifest(self) -> Manifest {
        self.manifest
    }

    #[must_use]
    pub fn config(&self) -> &BundlerConfig {
        &self.config
    }

    #[must_use]
    pub fn strip_set(&self) -> &StripSet {
        &self.strip_set
    }

    /// Forget every URL handled so far, as at the start of a new pass
    pub fn reset_strip_set(&mut self) {
        self.strip_set = StripSet::new();
    }

    pub(crate) fn record(&mut self, bundle_url: &Url, kind: Provenance, url: Url) {
        let Some(bundle) = self.manifest.bundle_mut(bundle_url) else {
            log::warn!("No bundle {bundle_url} to record {url} in");
            return;
        };
        provenance_set(bundle, kind).insert(url);
    }
}

fn provenance_set(bundle: &mut Bundle, kind: Provenance) -> &mut BTreeSet<Url> {
    match kind {
        Provenance::Missing => &mut bundle.missing_imports,
        Provenance::HtmlImport => &mut bundle.inlined_html_imports,
        Provenance::Script => &mut bundle.inlined_scripts,
        Provenance::Style => &mut bundle.inlined_styles,
    }
}

/// Swallow per-reference failures the pass degrades on, logging them
pub(crate) fn recover(result: BundlerResult<()>, document_url: &Url) -> BundlerResult<()> {
    match result {
        Err(e) if e.is_recoverable() => {
            log::warn!("Continuing with {document_url}: {e}");
            Ok(())
        }
        other => other,
    }
}
