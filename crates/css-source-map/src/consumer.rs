//! Reading existing source maps and querying original positions

use crate::error::SourceMapError;
use crate::types::{LineCol, Mapping, RawSourceMap};
use crate::utils::join_url;
use sourcemap::{SourceMap, Token};

/// Result of looking a generated position up in a source map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalPosition {
    /// The original source (resolved against `sourceRoot`)
    pub source: String,
    /// Position in the original source
    pub position: LineCol,
    /// Original identifier name, if recorded
    pub name: Option<String>,
}

/// A parsed source map that answers "where did this come from" queries
///
/// Decoding and lookups go through [`sourcemap::SourceMap`].
#[derive(Debug, Clone)]
pub struct SourceMapConsumer {
    map: SourceMap,
    /// Resolved against `sourceRoot`, in map order
    sources: Vec<String>,
    /// Sorted by generated position
    mappings: Vec<Mapping>,
}

impl SourceMapConsumer {
    pub fn from_json(text: &str) -> Result<Self, SourceMapError> {
        Self::from_raw(serde_json::from_str(text)?)
    }

    pub fn from_raw(raw: RawSourceMap) -> Result<Self, SourceMapError> {
        if raw.version != 3 {
            return Err(SourceMapError::UnsupportedVersion(raw.version));
        }

        let sources: Vec<String> = raw
            .sources
            .iter()
            .map(|source| match raw.source_root.as_deref() {
                Some(root) if !root.is_empty() => join_url(root, source),
                _ => source.clone(),
            })
            .collect();

        // Sources are already joined with the root, so the decoder gets none.
        let raw = RawSourceMap {
            sources: sources.clone(),
            source_root: None,
            ..raw
        };
        let map = SourceMap::from_slice(&serde_json::to_vec(&raw)?)?;

        let mut mappings: Vec<Mapping> = map.tokens().map(token_mapping).collect();
        mappings.sort_by(|a, b| a.generated.cmp(&b.generated));

        Ok(SourceMapConsumer {
            map,
            sources,
            mappings,
        })
    }

    pub fn file(&self) -> Option<&str> {
        self.map.get_file()
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Decoded mappings in generated order
    pub fn mappings(&self) -> &[Mapping] {
        &self.mappings
    }

    /// Embedded content of `source`, if the map carries it
    pub fn source_content_for(&self, source: &str) -> Option<&str> {
        let idx = self.sources.iter().position(|s| s == source)?;
        self.map.get_source_contents(u32::try_from(idx).ok()?)
    }

    /// Find the original position of a generated position
    ///
    /// Uses the closest mapping at or before `generated` on the same line;
    /// when several share that position, the first one wins. Returns `None`
    /// when that line has no such mapping or the mapping carries no original
    /// position.
    pub fn original_position_for(&self, generated: LineCol) -> Option<OriginalPosition> {
        let line = generated.line.checked_sub(1)?;
        let token = self.map.lookup_token(line, generated.column)?;
        if token.get_dst_line() != line {
            return None;
        }

        Some(OriginalPosition {
            source: token.get_source()?.to_string(),
            position: LineCol::new(token.get_src_line().saturating_add(1), token.get_src_col()),
            name: token.get_name().map(str::to_string),
        })
    }
}

fn token_mapping(token: Token<'_>) -> Mapping {
    let generated = LineCol::new(token.get_dst_line().saturating_add(1), token.get_dst_col());
    match token.get_source() {
        Some(source) => Mapping {
            generated,
            original: Some(LineCol::new(
                token.get_src_line().saturating_add(1),
                token.get_src_col(),
            )),
            source: Some(source.to_string()),
            name: token.get_name().map(str::to_string),
        },
        None => Mapping::generated_only(generated),
    }
}
