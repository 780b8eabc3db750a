//! Source maps for inlined scripts
//!
//! Hand-rolled Source Map v3 support: the Base64 VLQ codec, the JSON model,
//! a small JavaScript tokenizer for identity maps, and the composer that
//! keeps inline script maps pointing at the right lines as markup moves.

pub mod composer;
pub mod map;
pub mod tokenizer;
pub mod vlq;

pub use composer::{
    MapOffsets, compose_fragment_script_maps, compose_inline_script_map, has_map_reference,
    inline_map_of, relocate_inline_script_maps, split_map_reference,
};
pub use map::{Mapping, OriginalPosition, RawSourceMap, SourceMapBuilder};
pub use tokenizer::{Token, TokenKind, tokenize};
