//! Core types for source mapping

use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in text: 1-based line, 0-based column
///
/// Columns count UTF-16 code units, which is what browsers use when they
/// apply a source map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LineCol {
    /// Line number (1-indexed)
    pub line: u32,
    /// Column number (0-indexed)
    pub column: u32,
}

impl LineCol {
    pub fn new(line: u32, column: u32) -> Self {
        LineCol { line, column }
    }
}

/// A single mapping from a generated position to an original one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    /// Position in the generated text
    pub generated: LineCol,
    /// Position in the original source, if this mapping has one
    pub original: Option<LineCol>,
    /// Original source file (required when `original` is set)
    pub source: Option<String>,
    /// Original identifier name
    pub name: Option<String>,
}

impl Mapping {
    /// A mapping that only marks a generated position
    pub fn generated_only(generated: LineCol) -> Self {
        Mapping {
            generated,
            original: None,
            source: None,
            name: None,
        }
    }

    /// A mapping from a generated position to a position in `source`
    pub fn original(generated: LineCol, source: impl Into<String>, original: LineCol) -> Self {
        Mapping {
            generated,
            original: Some(original),
            source: Some(source.into()),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// The serialized (JSON) form of a revision 3 source map
///
/// Fields are declared in the order they are written, so the JSON text of a
/// map is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSourceMap {
    pub version: u32,
    pub sources: Vec<String>,
    #[serde(default)]
    pub names: Vec<String>,
    pub mappings: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources_content: Option<Vec<Option<String>>>,
}

impl fmt::Display for RawSourceMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
