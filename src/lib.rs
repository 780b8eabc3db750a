pub mod base_url;
pub mod config;
pub mod dom;
pub mod errors;
pub mod inliner;
pub mod manifest;
pub mod resolver;
pub mod sourcemap;
pub mod utils;

pub use base_url::{
    emulate_base_tag, rewrite_ast_base_url, rewrite_css_text_base_url, rewrite_href_base_url,
};
pub use config::{BundlerConfig, BundlerConfigBuilder};
pub use dom::{Document, Fragment};
pub use errors::{BundlerError, BundlerResult};
pub use inliner::{BundlePass, BundledDocument};
pub use manifest::{Bundle, Manifest, StripSet};
pub use resolver::{DependencyKind, MemoryResolver, Resolver, Resource};
pub use sourcemap::{compose_inline_script_map, relocate_inline_script_maps};

/// Bundle every bundle of `manifest` in one pass
///
/// Returns the bundled documents in bundle-URL order together with the
/// manifest, whose bundles now carry their provenance.
pub async fn bundle<R: Resolver>(
    resolver: &R,
    manifest: Manifest,
    config: BundlerConfig,
) -> BundlerResult<(Vec<BundledDocument>, Manifest)> {
    let mut pass = BundlePass::new(resolver, manifest, config);
    let documents = pass.bundle_all().await?;
    Ok((documents, pass.into_manifest()))
}
