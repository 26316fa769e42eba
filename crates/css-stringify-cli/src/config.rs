/*
 * config.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Stringify options from a TOML file plus command-line overrides.

use anyhow::{Context, Result};
use css_stringify::{SourceMapMode, StringifyOptions};
use std::fs;
use std::path::Path;

/// Flags that take precedence over the config file
#[derive(Debug, Default)]
pub struct Overrides {
    pub compress: bool,
    pub sourcemap: bool,
    pub indent: Option<String>,
    pub no_input_sourcemaps: bool,
}

/// Read options from `path`, or start from the defaults when there is none.
pub fn load_options(path: Option<&Path>) -> Result<StringifyOptions> {
    let Some(path) = path else {
        return Ok(StringifyOptions::default());
    };

    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse_options(&text).with_context(|| format!("Invalid config file {}", path.display()))
}

pub fn parse_options(text: &str) -> Result<StringifyOptions> {
    Ok(toml::from_str(text)?)
}

impl Overrides {
    pub fn apply(self, mut options: StringifyOptions) -> StringifyOptions {
        if self.compress {
            options.compress = true;
        }
        // Keep "generator" from the file; it serializes the same way
        if self.sourcemap && !options.sourcemap.is_enabled() {
            options.sourcemap = SourceMapMode::Serialized;
        }
        if let Some(indent) = self.indent {
            options.indent = Some(indent);
        }
        if self.no_input_sourcemaps {
            options.input_sourcemaps = false;
        }
        options
    }
}
