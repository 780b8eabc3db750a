//! Error types for bundling operations
//!
//! Most of these are recovered locally by the inliners: a reference that
//! cannot be resolved, loaded or mapped is logged, recorded on the bundle
//! where appropriate, and left in place. Only failures on the host document
//! itself reach the caller.

use thiserror::Error;

/// Result type alias for bundling operations
pub type BundlerResult<T> = Result<T, BundlerError>;

/// Error types for bundling operations
#[derive(Debug, Error)]
pub enum BundlerError {
    /// An href/src could not be resolved against its base
    #[error("Unable to resolve '{href}' against '{base}'")]
    UnresolvableUrl { href: String, base: String },

    /// The URL resolves but no bundle or dependency set owns it
    #[error("Missing resource: {0}")]
    MissingResource(String),

    /// A document imports itself
    #[error("Document imports itself: {0}")]
    SelfImport(String),

    /// An existing source map reference could not be loaded
    #[error("Failed to load source map {url}: {message}")]
    SourceMapLoad { url: String, message: String },

    /// Source map JSON or mappings could not be decoded
    #[error("Invalid source map: {0}")]
    InvalidSourceMap(String),

    /// Tree manipulation failed
    #[error("DOM error: {0}")]
    Dom(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// IO error (serialization)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Base64 decoding error
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// URL parse error
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl BundlerError {
    /// Check whether the inliners degrade on this error instead of failing the pass
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            BundlerError::UnresolvableUrl { .. }
                | BundlerError::MissingResource(_)
                | BundlerError::SelfImport(_)
                | BundlerError::SourceMapLoad { .. }
                | BundlerError::InvalidSourceMap(_)
                | BundlerError::Base64(_)
                | BundlerError::Json(_)
        )
    }
}
