//! Shared constants for the bundler
//!
//! Attribute names, tag names and textual markers used across the DOM,
//! base URL and source map modules.

/// Attributes that carry a URL and must be re-based when markup moves
///
/// `style` is routed through the CSS `url()` rewriter, the rest through
/// the href rewriter.
pub const URL_ATTRS: [&str; 5] = ["href", "src", "action", "style", "assetpath"];

/// `rel` token of an eager HTML import
pub const REL_IMPORT: &str = "import";

/// `rel` token of a lazy HTML import (loaded at runtime, never inlined)
pub const REL_LAZY_IMPORT: &str = "lazy-import";

/// `rel` token of a stylesheet link
pub const REL_STYLESHEET: &str = "stylesheet";

/// Legacy module container element
pub const MODULE_CONTAINER_TAG: &str = "dom-module";

/// Attribute on the module container holding its asset-path override
pub const ASSETPATH_ATTR: &str = "assetpath";

/// Script `type` values that denote classic JavaScript
///
/// An absent or empty `type` also counts as JavaScript.
pub const JAVASCRIPT_TYPES: [&str; 8] = [
    "text/javascript",
    "application/javascript",
    "application/ecmascript",
    "application/x-javascript",
    "text/ecmascript",
    "text/jscript",
    "text/x-javascript",
    "text/livescript",
];

/// Prefix of the inline source map comment appended to scripts
pub const INLINE_SOURCEMAP_PREFIX: &str =
    "\n//# sourceMappingURL=data:application/json;charset=utf8;base64,";
