//! Composition of source maps for relocated inline scripts
//!
//! Every inline script ends up with a trailing inline source map comment.
//! An existing map (inline `data:` URL or external file) is re-anchored by
//! shifting its generated positions. Without one, an identity map is built
//! from the script's tokens, pointing back at the script's own URL.
//!
//! Inlining happens in two phases. While a fragment is parsed its script
//! maps are made relative to each script's start. Once a document is fully
//! assembled, [`relocate_inline_script_maps`] shifts every map to the
//! script's final position in the serialized output.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use kuchiki::NodeRef;
use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use super::map::{Mapping, OriginalPosition, RawSourceMap, SourceMapBuilder};
use super::tokenizer::tokenize;
use crate::dom::{Document, matchers, script_content_starts, tree};
use crate::errors::{BundlerError, BundlerResult};
use crate::resolver::Resolver;
use crate::utils::{INLINE_SOURCEMAP_PREFIX, resolve_url};

lazy_static! {
    static ref SOURCE_MAPPING_URL: Regex =
        Regex::new(r#"(?:\r?\n)?//[#@][ \t]*sourceMappingURL=([^\s'"]+)\s*$"#)
            .expect("BUG: hardcoded sourceMappingURL regex is invalid");
}

/// Line/column shifts applied while composing a script's map
///
/// `original_*` shift the original side of synthesized identity mappings.
/// `generated_*` shift the generated side of an existing map. Column shifts
/// only apply to positions on the script's first line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapOffsets {
    pub original_line: i64,
    pub original_column: i64,
    pub generated_line: i64,
    pub generated_column: i64,
}

impl MapOffsets {
    #[must_use]
    pub const fn new(
        original_line: i64,
        original_column: i64,
        generated_line: i64,
        generated_column: i64,
    ) -> Self {
        Self {
            original_line,
            original_column,
            generated_line,
            generated_column,
        }
    }
}

/// Split `text` into its body and the URL of a trailing source map comment
#[must_use]
pub fn split_map_reference(text: &str) -> (&str, Option<&str>) {
    match SOURCE_MAPPING_URL.captures(text) {
        Some(caps) => {
            let (Some(whole), Some(url)) = (caps.get(0), caps.get(1)) else {
                return (text, None);
            };
            (&text[..whole.start()], Some(url.as_str()))
        }
        None => (text, None),
    }
}

/// Whether `text` ends with a source map comment
#[must_use]
pub fn has_map_reference(text: &str) -> bool {
    split_map_reference(text).1.is_some()
}

/// Load the map a script references, returning it with the URL its
/// relative `sources` resolve against
async fn load_existing_map<R: Resolver>(
    resolver: &R,
    script_url: &Url,
    reference: &str,
) -> BundlerResult<(RawSourceMap, Url)> {
    if let Some(data) = reference.strip_prefix("data:") {
        let (header, payload) = data.split_once(',').ok_or_else(|| {
            BundlerError::InvalidSourceMap("data: URL without payload".to_string())
        })?;
        let json = if header
            .split(';')
            .any(|part| part.eq_ignore_ascii_case("base64"))
        {
            String::from_utf8(STANDARD.decode(payload)?)
                .map_err(|e| BundlerError::InvalidSourceMap(e.to_string()))?
        } else {
            urlencoding::decode(payload)
                .map_err(|e| BundlerError::InvalidSourceMap(e.to_string()))?
                .into_owned()
        };
        return Ok((RawSourceMap::from_json(&json)?, script_url.clone()));
    }

    let map_url = resolve_url(script_url, reference)?;
    let json = resolver
        .load(&map_url)
        .await
        .map_err(|e| BundlerError::SourceMapLoad {
            url: map_url.to_string(),
            message: e.to_string(),
        })?;
    Ok((RawSourceMap::from_json(&json)?, map_url))
}

/// Absolute form of a map's source entry
fn resolve_source(map: &RawSourceMap, map_url: &Url, source: &str) -> String {
    let joined = match map.source_root.as_deref().filter(|root| !root.is_empty()) {
        Some(root) => format!("{}/{}", root.trim_end_matches('/'), source),
        None => source.to_string(),
    };
    resolve_url(map_url, &joined)
        .map(|url| url.to_string())
        .unwrap_or(joined)
}

/// Shift the generated side of an existing map, keeping sourced mappings only
fn offset_existing_map(
    map: &RawSourceMap,
    map_url: &Url,
    offsets: MapOffsets,
) -> BundlerResult<RawSourceMap> {
    let mut builder = SourceMapBuilder::new(map.file.clone());
    for (index, source) in map.sources.iter().enumerate() {
        if let Some(content) = map.source_content(index) {
            builder.set_source_content(&resolve_source(map, map_url, source), content);
        }
    }

    for mapping in map.decode_mappings()? {
        let Some(original) = mapping.original else {
            continue;
        };
        let line = i64::from(mapping.generated_line) + offsets.generated_line;
        let column = i64::from(mapping.generated_column)
            + if mapping.generated_line == 1 {
                offsets.generated_column
            } else {
                0
            };
        let (Ok(line), Ok(column)) = (u32::try_from(line), u32::try_from(column)) else {
            continue;
        };
        if line == 0 {
            continue;
        }
        builder.add_mapping(Mapping {
            generated_line: line,
            generated_column: column,
            original: Some(OriginalPosition {
                source: resolve_source(map, map_url, &original.source),
                ..original
            }),
        });
    }
    Ok(builder.build())
}

/// One mapping per token, from the token's position back into `script_url`
fn identity_map(script_url: &Url, script_text: &str, offsets: MapOffsets) -> RawSourceMap {
    let source = script_url.to_string();
    let mut builder = SourceMapBuilder::new(None);
    for token in tokenize(script_text) {
        let line = i64::from(token.line) + offsets.original_line;
        let column = i64::from(token.column)
            + if token.line == 1 {
                offsets.original_column
            } else {
                0
            };
        let (Ok(line), Ok(column)) = (u32::try_from(line), u32::try_from(column)) else {
            continue;
        };
        if line == 0 {
            continue;
        }
        builder.add_mapping(Mapping {
            generated_line: token.line,
            generated_column: token.column,
            original: Some(OriginalPosition {
                source: source.clone(),
                line,
                column,
                name: token.name().map(str::to_string),
            }),
        });
    }
    builder.build()
}

/// Append `map` to `body` as an inline base64 comment
fn append_inline_map(body: &str, map: &RawSourceMap) -> BundlerResult<String> {
    let json = map.to_json()?;
    let body = body.strip_suffix('\n').unwrap_or(body);
    let encoded = STANDARD.encode(json);
    let mut out = String::with_capacity(body.len() + INLINE_SOURCEMAP_PREFIX.len() + encoded.len() + 1);
    out.push_str(body);
    out.push_str(INLINE_SOURCEMAP_PREFIX);
    out.push_str(&encoded);
    out.push('\n');
    Ok(out)
}

/// Attach a composed inline source map to `script_text`
///
/// A trailing map reference that cannot be loaded or decoded is dropped and
/// replaced by an identity map.
pub async fn compose_inline_script_map<R: Resolver>(
    resolver: &R,
    script_url: &Url,
    script_text: &str,
    offsets: MapOffsets,
) -> BundlerResult<String> {
    let (body, reference) = split_map_reference(script_text);

    let existing = match reference {
        Some(reference) => match load_existing_map(resolver, script_url, reference).await {
            Ok(found) => Some(found),
            Err(e) => {
                log::warn!("Dropping source map reference in {script_url}: {e}");
                None
            }
        },
        None => None,
    };

    let map = match existing {
        Some((map, map_url)) => match offset_existing_map(&map, &map_url, offsets) {
            Ok(shifted) => shifted,
            Err(e) => {
                log::warn!("Dropping undecodable source map {map_url}: {e}");
                identity_map(script_url, body, offsets)
            }
        },
        None => identity_map(script_url, body, offsets),
    };

    append_inline_map(body, &map)
}

/// Compose maps for every inline script under a freshly parsed `root`
///
/// `raw_text` is the text `root` was parsed from; the n-th script element in
/// tree order (template contents included) is the n-th script start tag in
/// the text. Generated positions end up relative to each script's start.
pub async fn compose_fragment_script_maps<R: Resolver>(
    resolver: &R,
    root: &NodeRef,
    url: &Url,
    raw_text: &str,
) -> BundlerResult<()> {
    let scripts = tree::query_all(root, true, |node| tree::is_tag(node, "script"));
    let starts = script_content_starts(raw_text);
    if scripts.len() != starts.len() {
        log::warn!(
            "Script positions in {url} do not line up ({} elements, {} tags); skipping source maps",
            scripts.len(),
            starts.len()
        );
        return Ok(());
    }

    for (script, start) in scripts.iter().zip(starts) {
        if !matchers::is_inline_javascript(script) {
            continue;
        }
        let text = tree::text_content(script);
        if text.trim().is_empty() {
            continue;
        }
        let line = i64::from(start.line) - 1;
        let column = i64::from(start.column);
        let offsets = MapOffsets::new(line, column, -line, -column);
        let composed = compose_inline_script_map(resolver, url, &text, offsets).await?;
        tree::set_text_content(script, &composed);
    }
    Ok(())
}

/// Shift every inline script map to the script's position in the
/// serialized `document`
///
/// Scripts without a map are left alone. Positions come from a single
/// serialization; scripts are updated last to first, so rewriting one map
/// never moves a script that is still waiting for its update.
pub async fn relocate_inline_script_maps<R: Resolver>(
    resolver: &R,
    document: &Document,
) -> BundlerResult<()> {
    let scripts = tree::query_all(&document.ast, true, |node| tree::is_tag(node, "script"));
    let starts = script_content_starts(&document.serialize()?);
    if starts.len() != scripts.len() {
        log::warn!(
            "Script positions in {} do not line up after serialization ({} elements, {} tags); leaving maps as they are",
            document.url,
            scripts.len(),
            starts.len()
        );
        return Ok(());
    }

    for (script, start) in scripts.iter().zip(starts).rev() {
        if !matchers::is_inline_javascript(script) {
            continue;
        }
        let text = tree::text_content(script);
        if !has_map_reference(&text) {
            continue;
        }
        let offsets = MapOffsets::new(
            0,
            0,
            i64::from(start.line) - 1,
            i64::from(start.column),
        );
        let relocated = compose_inline_script_map(resolver, &document.url, &text, offsets).await?;
        tree::set_text_content(script, &relocated);
    }
    Ok(())
}

/// Decode the inline map attached to `script_text`, if any
pub fn inline_map_of(script_text: &str) -> BundlerResult<Option<RawSourceMap>> {
    let Some(reference) = split_map_reference(script_text).1 else {
        return Ok(None);
    };
    let Some(payload) = reference
        .strip_prefix("data:")
        .and_then(|data| data.split_once(','))
        .map(|(_, payload)| payload)
    else {
        return Ok(None);
    };
    let json = String::from_utf8(STANDARD.decode(payload)?)
        .map_err(|e| BundlerError::InvalidSourceMap(e.to_string()))?;
    RawSourceMap::from_json(&json).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Fragment;
    use crate::resolver::MemoryResolver;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn decoded(script_text: &str) -> Vec<Mapping> {
        inline_map_of(script_text)
            .unwrap()
            .expect("script has an inline map")
            .decode_mappings()
            .unwrap()
    }

    fn generated_lines(mappings: &[Mapping]) -> Vec<u32> {
        mappings.iter().map(|m| m.generated_line).collect()
    }

    #[test]
    fn test_split_map_reference() {
        let (body, reference) = split_map_reference("a();\n//# sourceMappingURL=a.js.map\n");
        assert_eq!(body, "a();");
        assert_eq!(reference, Some("a.js.map"));

        let (body, reference) = split_map_reference("a(); // sourceMappingURL=nope");
        assert_eq!(body, "a(); // sourceMappingURL=nope");
        assert!(reference.is_none());
    }

    #[tokio::test]
    async fn test_identity_map_with_offsets() {
        let resolver = MemoryResolver::new();
        let script_url = url("https://example.com/app.js");
        let text = "\nfoo(bar);\n";
        let out = compose_inline_script_map(&resolver, &script_url, text, MapOffsets::new(-1, 0, 1, 0))
            .await
            .unwrap();

        assert!(out.starts_with("\nfoo(bar);\n//# sourceMappingURL=data:application/json;charset=utf8;base64,"));
        assert!(out.ends_with('\n'));
        assert_eq!(out.matches("sourceMappingURL").count(), 1);

        let mappings = decoded(&out);
        assert_eq!(mappings.len(), 5);
        let first = &mappings[0];
        assert_eq!((first.generated_line, first.generated_column), (2, 0));
        let original = first.original.as_ref().unwrap();
        assert_eq!(original.source, "https://example.com/app.js");
        assert_eq!((original.line, original.column), (1, 0));
        assert_eq!(original.name.as_deref(), Some("foo"));
    }

    #[tokio::test]
    async fn test_existing_external_map_is_offset() {
        let resolver = MemoryResolver::from_entries([(
            "https://example.com/js/app.js.map",
            r#"{"version":3,"sourceRoot":"src","sources":["app.ts"],"names":[],"mappings":"AAAA;AACA,IAAI;A"}"#,
        )])
        .unwrap();
        let script_url = url("https://example.com/js/app.js");
        let text = "a;\nb + c;\n//# sourceMappingURL=app.js.map";

        let out = compose_inline_script_map(&resolver, &script_url, text, MapOffsets::new(-1, 0, 1, 4))
            .await
            .unwrap();
        assert!(!out.contains("app.js.map"));

        let mappings = decoded(&out);
        // The unsourced segment on the last line is dropped.
        assert_eq!(mappings.len(), 3);
        let positions: Vec<(u32, u32)> = mappings
            .iter()
            .map(|m| (m.generated_line, m.generated_column))
            .collect();
        assert_eq!(positions, vec![(2, 4), (3, 0), (3, 4)]);
        assert_eq!(
            mappings[0].original.as_ref().unwrap().source,
            "https://example.com/js/src/app.ts"
        );
    }

    #[tokio::test]
    async fn test_broken_map_reference_falls_back_to_identity() {
        let resolver = MemoryResolver::new();
        let script_url = url("https://example.com/app.js");
        let text = "x;\n//# sourceMappingURL=missing.map\n";
        let out = compose_inline_script_map(&resolver, &script_url, text, MapOffsets::default())
            .await
            .unwrap();
        assert!(!out.contains("missing.map"));
        let mappings = decoded(&out);
        assert_eq!(generated_lines(&mappings), vec![1, 1]);
        assert_eq!(mappings[0].original.as_ref().unwrap().source, "https://example.com/app.js");
    }

    #[tokio::test]
    async fn test_percent_encoded_inline_map() {
        let resolver = MemoryResolver::new();
        let json = r#"{"version":3,"sources":["orig.js"],"names":[],"mappings":"AAAA"}"#;
        let text = format!(
            "x;\n//# sourceMappingURL=data:application/json,{}",
            urlencoding::encode(json)
        );
        let out = compose_inline_script_map(
            &resolver,
            &url("https://example.com/lib/page.html"),
            &text,
            MapOffsets::new(0, 0, 4, 2),
        )
        .await
        .unwrap();
        let mappings = decoded(&out);
        assert_eq!(mappings.len(), 1);
        assert_eq!((mappings[0].generated_line, mappings[0].generated_column), (5, 2));
        assert_eq!(
            mappings[0].original.as_ref().unwrap().source,
            "https://example.com/lib/orig.js"
        );
    }

    #[tokio::test]
    async fn test_script_in_host_line_ten_maps_to_host_lines() {
        let resolver = MemoryResolver::new();
        let doc_url = url("https://example.com/index.html");
        let html = format!("<body>{}<script>x\n+\ny</script>\n</body>", "<p>pad</p>\n".repeat(9));
        let document = Document::parse(doc_url.clone(), html.clone());

        compose_fragment_script_maps(&resolver, &document.ast, &doc_url, &html)
            .await
            .unwrap();
        let script = tree::query_all(&document.ast, false, |n| tree::is_tag(n, "script")).remove(0);
        let relative = decoded(&tree::text_content(&script));
        assert_eq!(generated_lines(&relative), vec![1, 2, 3]);

        relocate_inline_script_maps(&resolver, &document).await.unwrap();
        let relocated = decoded(&tree::text_content(&script));
        assert_eq!(generated_lines(&relocated), vec![10, 11, 12]);
        let originals: Vec<(u32, u32)> = relocated
            .iter()
            .map(|m| {
                let original = m.original.as_ref().unwrap();
                (original.line, original.column)
            })
            .collect();
        assert_eq!(originals, vec![(10, 8), (11, 0), (12, 0)]);
        assert_eq!(relocated[0].generated_column, 8);
    }

    #[tokio::test]
    async fn test_fragment_skips_external_and_non_js_scripts() {
        let resolver = MemoryResolver::new();
        let html = r#"<script src="a.js"></script><script type="text/template">t</script><script>go()</script>"#;
        let fragment = Fragment::parse(html);
        compose_fragment_script_maps(&resolver, fragment.root(), &url("https://example.com/f.html"), html)
            .await
            .unwrap();
        let scripts = tree::query_all(fragment.root(), false, |n| tree::is_tag(n, "script"));
        assert!(!has_map_reference(&tree::text_content(&scripts[0])));
        assert_eq!(tree::text_content(&scripts[1]), "t");
        assert!(has_map_reference(&tree::text_content(&scripts[2])));
    }

    #[tokio::test]
    async fn test_relocation_covers_scripts_sharing_a_line_and_templates() {
        let resolver = MemoryResolver::new();
        let doc_url = url("https://example.com/index.html");
        let html = "<body><template><script>a()</script></template><script>b()</script><script>c()</script>\n</body>";
        let document = Document::parse(doc_url.clone(), html);

        compose_fragment_script_maps(&resolver, &document.ast, &doc_url, html)
            .await
            .unwrap();
        relocate_inline_script_maps(&resolver, &document).await.unwrap();

        let serialized = document.serialize().unwrap();
        let starts = script_content_starts(&serialized);
        let scripts = tree::query_all(&document.ast, true, |n| tree::is_tag(n, "script"));
        assert_eq!(scripts.len(), 3);
        for (script, start) in scripts.iter().zip(starts) {
            let first = decoded(&tree::text_content(script)).remove(0);
            assert_eq!(
                (first.generated_line, first.generated_column),
                (start.line, start.column)
            );
        }
    }

    #[tokio::test]
    async fn test_relocation_skips_scripts_without_maps() {
        let resolver = MemoryResolver::new();
        let document = Document::parse(url("https://example.com/index.html"), "<script>plain()</script>");
        relocate_inline_script_maps(&resolver, &document).await.unwrap();
        let script = tree::query_all(&document.ast, false, |n| tree::is_tag(n, "script")).remove(0);
        assert_eq!(tree::text_content(&script), "plain()");
    }
}
