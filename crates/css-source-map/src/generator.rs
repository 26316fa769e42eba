//! Incremental source map construction

use crate::consumer::SourceMapConsumer;
use crate::error::SourceMapError;
use crate::types::{LineCol, Mapping, RawSourceMap};
use crate::utils::join_url;
use serde::{Serialize, Serializer};
use sourcemap::SourceMapBuilder;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

/// Collects mappings while text is generated
///
/// This is the live, queryable form of a source map. Call
/// [`SourceMapGenerator::to_json`] for the serialized form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceMapGenerator {
    file: Option<String>,
    source_root: Option<String>,
    sources: Vec<String>,
    names: Vec<String>,
    mappings: Vec<Mapping>,
    sources_content: HashMap<String, String>,
}

impl SourceMapGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name of the generated file this map describes
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_source_root(mut self, source_root: impl Into<String>) -> Self {
        self.source_root = Some(source_root.into());
        self
    }

    /// Record one mapping
    ///
    /// Generated lines start at 1. A mapping with an original position must
    /// name its source, and its original line must also start at 1.
    pub fn add_mapping(&mut self, mapping: Mapping) -> Result<(), SourceMapError> {
        validate_mapping(&mapping)?;

        if let Some(source) = &mapping.source {
            push_unique(&mut self.sources, source);
        }
        if let Some(name) = &mapping.name {
            push_unique(&mut self.names, name);
        }
        self.mappings.push(mapping);
        Ok(())
    }

    /// Attach (or with `None`, remove) the full text of a source
    pub fn set_source_content(&mut self, source: impl Into<String>, content: Option<String>) {
        let source = source.into();
        match content {
            Some(content) => {
                self.sources_content.insert(source, content);
            }
            None => {
                self.sources_content.remove(&source);
            }
        }
    }

    /// Rewrite every mapping into `source_file` through `consumer`
    ///
    /// After this call the map points past `source_file` at the sources the
    /// consumer's map describes. Their paths are resolved against
    /// `source_map_path` when given. Mappings the consumer cannot place are
    /// left untouched.
    pub fn apply_source_map(
        &mut self,
        consumer: &SourceMapConsumer,
        source_file: &str,
        source_map_path: Option<&str>,
    ) {
        let resolve = |source: &str| match source_map_path {
            Some(path) => join_url(path, source),
            None => source.to_string(),
        };

        for mapping in &mut self.mappings {
            if mapping.source.as_deref() != Some(source_file) {
                continue;
            }
            let Some(original) = mapping.original else {
                continue;
            };
            let Some(found) = consumer.original_position_for(original) else {
                continue;
            };

            mapping.source = Some(resolve(&found.source));
            mapping.original = Some(found.position);
            if found.name.is_some() {
                mapping.name = found.name;
            }
        }

        let mut sources = Vec::new();
        let mut names = Vec::new();
        for mapping in &self.mappings {
            if let Some(source) = &mapping.source {
                push_unique(&mut sources, source);
            }
            if let Some(name) = &mapping.name {
                push_unique(&mut names, name);
            }
        }
        self.sources = sources;
        self.names = names;

        for source in consumer.sources() {
            if let Some(content) = consumer.source_content_for(source) {
                self.sources_content
                    .insert(resolve(source), content.to_string());
            }
        }
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    /// Mappings in the order they were added
    pub fn mappings(&self) -> &[Mapping] {
        &self.mappings
    }

    /// Sources in first-use order
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn source_content(&self, source: &str) -> Option<&str> {
        self.sources_content.get(source).map(String::as_str)
    }

    /// Produce the serialized form of this map
    ///
    /// Mappings are encoded by the `sourcemap` crate. Sources and names keep
    /// first-use order, and `sourcesContent` is only present when some
    /// source carries content.
    pub fn to_json(&self) -> Result<RawSourceMap, SourceMapError> {
        let mut builder = SourceMapBuilder::new(self.file.as_deref());
        builder.set_source_root(self.source_root.as_deref());

        let ids: Vec<u32> = self
            .sources
            .iter()
            .map(|source| builder.add_source(source))
            .collect();
        for (source, id) in self.sources.iter().zip(ids) {
            if let Some(content) = self.sources_content.get(source) {
                builder.set_source_contents(id, Some(content.as_str()));
            }
        }
        for name in &self.names {
            builder.add_name(name);
        }

        // The encoder walks tokens in insertion order and expects generated
        // lines to ascend.
        let mut sorted: Vec<&Mapping> = self.mappings.iter().collect();
        sorted.sort_by(|a, b| compare_by_generated(a, b));

        for mapping in sorted {
            let (source, original) = match (&mapping.source, mapping.original) {
                (Some(source), Some(original)) => (Some(source.as_str()), original),
                _ => (None, LineCol::new(1, 0)),
            };
            builder.add(
                mapping.generated.line.saturating_sub(1),
                mapping.generated.column,
                original.line.saturating_sub(1),
                original.column,
                source,
                source.and(mapping.name.as_deref()),
                false,
            );
        }

        let mut encoded = Vec::new();
        builder.into_sourcemap().to_writer(&mut encoded)?;
        Ok(serde_json::from_slice(&encoded)?)
    }
}

impl fmt::Display for SourceMapGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw = self.to_json().map_err(|_| fmt::Error)?;
        fmt::Display::fmt(&raw, f)
    }
}

impl Serialize for SourceMapGenerator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

fn validate_mapping(mapping: &Mapping) -> Result<(), SourceMapError> {
    if mapping.generated.line == 0 {
        return Err(SourceMapError::invalid_mapping(format!(
            "generated line must be at least 1 (column {})",
            mapping.generated.column
        )));
    }

    match mapping.original {
        Some(original) => {
            if original.line == 0 {
                return Err(SourceMapError::invalid_mapping(format!(
                    "original line must be at least 1 (generated {}:{})",
                    mapping.generated.line, mapping.generated.column
                )));
            }
            if mapping.source.is_none() {
                return Err(SourceMapError::invalid_mapping(format!(
                    "original position without a source (generated {}:{})",
                    mapping.generated.line, mapping.generated.column
                )));
            }
        }
        None => {
            if mapping.source.is_some() || mapping.name.is_some() {
                return Err(SourceMapError::invalid_mapping(format!(
                    "source or name without an original position (generated {}:{})",
                    mapping.generated.line, mapping.generated.column
                )));
            }
        }
    }

    Ok(())
}

fn push_unique(items: &mut Vec<String>, item: &str) {
    if !items.iter().any(|existing| existing == item) {
        items.push(item.to_string());
    }
}

/// Generated position first, then source, original position and name.
/// A missing source or name sorts after a present one.
fn compare_by_generated(a: &Mapping, b: &Mapping) -> Ordering {
    a.generated
        .cmp(&b.generated)
        .then_with(|| compare_optional(a.source.as_deref(), b.source.as_deref()))
        .then_with(|| a.original.cmp(&b.original))
        .then_with(|| compare_optional(a.name.as_deref(), b.name.as_deref()))
}

fn compare_optional(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => a.cmp(b),
    }
}
