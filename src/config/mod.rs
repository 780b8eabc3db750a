//! Configuration module for bundling
//!
//! This module provides the `BundlerConfig` struct and its builder for
//! configuring bundling passes with validation and sensible defaults.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod methods;
pub mod types;

// Re-exports for public API
pub use builder::BundlerConfigBuilder;
pub use types::BundlerConfig;
