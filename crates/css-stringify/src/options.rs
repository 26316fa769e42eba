/*
 * options.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Stringify configuration.
//!
//! Options are plain serde data so hosts can build them in code, decode them
//! from JSON alongside a tree, or keep them in a TOML file:
//!
//! ```toml
//! compress = false
//! sourcemap = "generator"
//! indent = "\t"
//! inputSourcemaps = false
//! ```

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Indentation unit used by the identity strategy unless configured
pub const DEFAULT_INDENT: &str = "  ";

/// Whether, and in which form, a source map is produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourceMapMode {
    /// No map; the result is the bare code (`sourcemap: false` or absent)
    #[default]
    Disabled,
    /// Finalized, serialized map (`sourcemap: true`)
    Serialized,
    /// The live generator object (`sourcemap: "generator"`)
    Generator,
}

impl SourceMapMode {
    pub fn is_enabled(self) -> bool {
        self != SourceMapMode::Disabled
    }
}

/// Accepted spellings of the `sourcemap` option
#[derive(Deserialize)]
#[serde(untagged)]
enum SourceMapSetting {
    Flag(bool),
    Mode(String),
}

impl<'de> Deserialize<'de> for SourceMapMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<SourceMapSetting>::deserialize(deserializer)? {
            None | Some(SourceMapSetting::Flag(false)) => Ok(SourceMapMode::Disabled),
            Some(SourceMapSetting::Flag(true)) => Ok(SourceMapMode::Serialized),
            Some(SourceMapSetting::Mode(mode)) if mode == "generator" => {
                Ok(SourceMapMode::Generator)
            }
            Some(SourceMapSetting::Mode(mode)) => Err(D::Error::custom(format!(
                "unknown sourcemap mode `{}` (expected true, false or \"generator\")",
                mode
            ))),
        }
    }
}

impl Serialize for SourceMapMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SourceMapMode::Disabled => serializer.serialize_bool(false),
            SourceMapMode::Serialized => serializer.serialize_bool(true),
            SourceMapMode::Generator => serializer.serialize_str("generator"),
        }
    }
}

/// Options recognized by [`crate::stringify`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StringifyOptions {
    /// Use the compressed strategy
    pub compress: bool,

    pub sourcemap: SourceMapMode,

    /// Indentation unit for the identity strategy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent: Option<String>,

    /// Chain input source maps referenced from embedded source content.
    ///
    /// Defaults to `true`.
    pub input_sourcemaps: bool,

    /// Options the dispatcher does not interpret, kept for the strategies
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Default for StringifyOptions {
    fn default() -> Self {
        Self {
            compress: false,
            sourcemap: SourceMapMode::Disabled,
            indent: None,
            input_sourcemaps: true,
            extra: BTreeMap::new(),
        }
    }
}

impl StringifyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compressed(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    pub fn with_sourcemap(mut self, mode: SourceMapMode) -> Self {
        self.sourcemap = mode;
        self
    }

    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = Some(indent.into());
        self
    }

    pub fn with_input_sourcemaps(mut self, enabled: bool) -> Self {
        self.input_sourcemaps = enabled;
        self
    }

    /// The configured indentation unit, or [`DEFAULT_INDENT`]
    pub fn indentation(&self) -> &str {
        self.indent.as_deref().unwrap_or(DEFAULT_INDENT)
    }
}
