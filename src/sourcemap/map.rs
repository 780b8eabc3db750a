//! Source Map v3 model
//!
//! [`RawSourceMap`] is the JSON shape. [`Mapping`] is one decoded segment
//! with 1-based lines and 0-based columns. [`SourceMapBuilder`] collects
//! mappings and encodes them back into the compact `mappings` string.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::vlq;
use crate::errors::{BundlerError, BundlerResult};

/// Source map JSON document (version 3)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSourceMap {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources_content: Option<Vec<Option<String>>>,
    #[serde(default)]
    pub names: Vec<String>,
    pub mappings: String,
}

/// Position in an original source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalPosition {
    pub source: String,
    pub line: u32,
    pub column: u32,
    pub name: Option<String>,
}

/// One decoded mapping segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    pub generated_line: u32,
    pub generated_column: u32,
    pub original: Option<OriginalPosition>,
}

impl RawSourceMap {
    /// Parse and validate source map JSON
    pub fn from_json(json: &str) -> BundlerResult<Self> {
        let map: RawSourceMap = serde_json::from_str(json)?;
        if map.version != 3 {
            return Err(BundlerError::InvalidSourceMap(format!(
                "Unsupported source map version {}",
                map.version
            )));
        }
        Ok(map)
    }

    pub fn to_json(&self) -> BundlerResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Content recorded for `sources[index]`, if any
    #[must_use]
    pub fn source_content(&self, index: usize) -> Option<&str> {
        self.sources_content
            .as_ref()
            .and_then(|contents| contents.get(index))
            .and_then(|content| content.as_deref())
    }

    /// Decode the `mappings` field
    ///
    /// Source names are returned exactly as listed in `sources`; callers
    /// resolve them against `sourceRoot` and the map location.
    pub fn decode_mappings(&self) -> BundlerResult<Vec<Mapping>> {
        let mut mappings = Vec::new();
        let mut source: i64 = 0;
        let mut original_line: i64 = 0;
        let mut original_column: i64 = 0;
        let mut name: i64 = 0;

        for (line_index, line) in self.mappings.split(';').enumerate() {
            let generated_line = u32::try_from(line_index + 1).map_err(|_| {
                BundlerError::InvalidSourceMap("Too many generated lines".to_string())
            })?;
            let mut generated_column: i64 = 0;

            for segment in line.split(',').filter(|s| !s.is_empty()) {
                let fields = vlq::decode_segment(segment)?;
                if !matches!(fields.len(), 1 | 4 | 5) {
                    return Err(BundlerError::InvalidSourceMap(format!(
                        "Segment '{segment}' has {} fields",
                        fields.len()
                    )));
                }
                generated_column += fields[0];

                let original = if fields.len() >= 4 {
                    source += fields[1];
                    original_line += fields[2];
                    original_column += fields[3];
                    let source_name = lookup(&self.sources, source, "source")?;
                    let symbol = if fields.len() == 5 {
                        name += fields[4];
                        Some(lookup(&self.names, name, "name")?)
                    } else {
                        None
                    };
                    Some(OriginalPosition {
                        source: source_name,
                        line: to_u32(original_line + 1)?,
                        column: to_u32(original_column)?,
                        name: symbol,
                    })
                } else {
                    None
                };

                mappings.push(Mapping {
                    generated_line,
                    generated_column: to_u32(generated_column)?,
                    original,
                });
            }
        }
        Ok(mappings)
    }
}

fn lookup(table: &[String], index: i64, what: &str) -> BundlerResult<String> {
    usize::try_from(index)
        .ok()
        .and_then(|i| table.get(i))
        .cloned()
        .ok_or_else(|| BundlerError::InvalidSourceMap(format!("{what} index {index} out of range")))
}

fn to_u32(value: i64) -> BundlerResult<u32> {
    u32::try_from(value)
        .map_err(|_| BundlerError::InvalidSourceMap(format!("Position {value} out of range")))
}

/// Accumulates mappings and produces a [`RawSourceMap`]
#[derive(Debug, Default)]
pub struct SourceMapBuilder {
    file: Option<String>,
    sources: Vec<String>,
    source_ids: HashMap<String, usize>,
    sources_content: Vec<Option<String>>,
    names: Vec<String>,
    name_ids: HashMap<String, usize>,
    mappings: Vec<Mapping>,
}

impl SourceMapBuilder {
    #[must_use]
    pub fn new(file: Option<String>) -> Self {
        Self {
            file,
            ..Self::default()
        }
    }

    /// Index of `source`, registering it on first use
    pub fn add_source(&mut self, source: &str) -> usize {
        if let Some(&id) = self.source_ids.get(source) {
            return id;
        }
        let id = self.sources.len();
        self.sources.push(source.to_string());
        self.sources_content.push(None);
        self.source_ids.insert(source.to_string(), id);
        id
    }

    pub fn set_source_content(&mut self, source: &str, content: impl Into<String>) {
        let id = self.add_source(source);
        self.sources_content[id] = Some(content.into());
    }

    fn add_name(&mut self, name: &str) -> usize {
        if let Some(&id) = self.name_ids.get(name) {
            return id;
        }
        let id = self.names.len();
        self.names.push(name.to_string());
        self.name_ids.insert(name.to_string(), id);
        id
    }

    pub fn add_mapping(&mut self, mapping: Mapping) {
        if let Some(original) = &mapping.original {
            self.add_source(&original.source);
            if let Some(name) = &original.name {
                self.add_name(name);
            }
        }
        self.mappings.push(mapping);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Encode all mappings, ordered by generated position
    #[must_use]
    pub fn build(mut self) -> RawSourceMap {
        self.mappings
            .sort_by_key(|m| (m.generated_line, m.generated_column));

        let mut encoded = String::new();
        let mut current_line = 1;
        let mut previous_column: i64 = 0;
        let mut previous_source: i64 = 0;
        let mut previous_original_line: i64 = 0;
        let mut previous_original_column: i64 = 0;
        let mut previous_name: i64 = 0;
        let mut first_in_line = true;

        for mapping in &self.mappings {
            while current_line < mapping.generated_line {
                encoded.push(';');
                current_line += 1;
                previous_column = 0;
                first_in_line = true;
            }
            if !first_in_line {
                encoded.push(',');
            }
            first_in_line = false;

            let column = i64::from(mapping.generated_column);
            vlq::encode(column - previous_column, &mut encoded);
            previous_column = column;

            let Some(original) = &mapping.original else {
                continue;
            };
            let source = self.source_ids[&original.source] as i64;
            vlq::encode(source - previous_source, &mut encoded);
            previous_source = source;

            let line = i64::from(original.line) - 1;
            vlq::encode(line - previous_original_line, &mut encoded);
            previous_original_line = line;

            let column = i64::from(original.column);
            vlq::encode(column - previous_original_column, &mut encoded);
            previous_original_column = column;

            if let Some(name) = &original.name {
                let name = self.name_ids[name] as i64;
                vlq::encode(name - previous_name, &mut encoded);
                previous_name = name;
            }
        }

        let sources_content = self
            .sources_content
            .iter()
            .any(Option::is_some)
            .then_some(self.sources_content);

        RawSourceMap {
            version: 3,
            file: self.file,
            source_root: None,
            sources: self.sources,
            sources_content,
            names: self.names,
            mappings: encoded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(gl: u32, gc: u32, source: &str, ol: u32, oc: u32, name: Option<&str>) -> Mapping {
        Mapping {
            generated_line: gl,
            generated_column: gc,
            original: Some(OriginalPosition {
                source: source.to_string(),
                line: ol,
                column: oc,
                name: name.map(str::to_string),
            }),
        }
    }

    #[test]
    fn test_build_then_decode_preserves_mappings() {
        let mut builder = SourceMapBuilder::new(Some("out.js".to_string()));
        builder.add_mapping(mapping(3, 4, "b.js", 1, 0, None));
        builder.add_mapping(mapping(1, 0, "a.js", 1, 0, Some("foo")));
        builder.add_mapping(mapping(1, 6, "a.js", 2, 2, Some("bar")));
        builder.add_mapping(Mapping {
            generated_line: 3,
            generated_column: 9,
            original: None,
        });

        let map = builder.build();
        // Registration order, not generated order.
        assert_eq!(map.sources, vec!["b.js", "a.js"]);
        assert_eq!(map.names, vec!["foo", "bar"]);
        assert!(map.sources_content.is_none());

        let decoded = map.decode_mappings().unwrap();
        assert_eq!(
            decoded,
            vec![
                mapping(1, 0, "a.js", 1, 0, Some("foo")),
                mapping(1, 6, "a.js", 2, 2, Some("bar")),
                mapping(3, 4, "b.js", 1, 0, None),
                Mapping {
                    generated_line: 3,
                    generated_column: 9,
                    original: None,
                },
            ]
        );
    }

    #[test]
    fn test_decodes_hand_written_map() {
        let json = r#"{"version":3,"sources":["x.ts"],"names":[],"mappings":"AAAA;;EACE"}"#;
        let map = RawSourceMap::from_json(json).unwrap();
        let decoded = map.decode_mappings().unwrap();
        assert_eq!(
            decoded,
            vec![mapping(1, 0, "x.ts", 1, 0, None), mapping(3, 2, "x.ts", 2, 2, None)]
        );
    }

    #[test]
    fn test_rejects_wrong_version_and_bad_indexes() {
        let v2 = r#"{"version":2,"sources":[],"names":[],"mappings":""}"#;
        assert!(matches!(
            RawSourceMap::from_json(v2),
            Err(BundlerError::InvalidSourceMap(_))
        ));

        let bad_source = RawSourceMap::from_json(
            r#"{"version":3,"sources":[],"names":[],"mappings":"AAAA"}"#,
        )
        .unwrap();
        assert!(bad_source.decode_mappings().is_err());
    }

    #[test]
    fn test_sources_content_kept_when_set() {
        let mut builder = SourceMapBuilder::new(None);
        builder.set_source_content("a.js", "var a;");
        builder.add_mapping(mapping(1, 0, "a.js", 1, 0, None));
        let map = builder.build();
        assert_eq!(map.source_content(0), Some("var a;"));
        let json = map.to_json().unwrap();
        assert!(json.contains(r#""sourcesContent":["var a;"]"#));
        assert!(!json.contains("sourceRoot"));
    }
}
