//! Locating the source map that belongs to a piece of CSS
//!
//! CSS produced by another tool (a preprocessor, a minifier) usually ends
//! with a `/*# sourceMappingURL=... */` annotation. This module finds that
//! annotation and loads the map it points to, either inline from a `data:`
//! URI or from a file next to the CSS.

use crate::error::SourceMapError;
use crate::types::RawSourceMap;
use crate::utils::{is_absolute_url, join_url, url_dirname};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// Trailing `sourceMappingURL` annotation, in block or line comment form.
/// Group 1 holds the block-comment URL, group 2 the line-comment URL.
static SOURCE_MAPPING_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?:/\*(?:\s*\r?\n(?://)?)?(?:[#@] sourceMappingURL=([^\s'"]*))\s*\*/|//(?:[#@] sourceMappingURL=([^\s'"]*)))\s*\z"#,
    )
    .unwrap()
});

/// Prefix some servers put in front of JSON to defeat XSSI
const XSSI_PREFIX: &str = ")]}'";

/// A source map found through a `sourceMappingURL` annotation
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSourceMap {
    pub map: RawSourceMap,
    /// The annotation's URL as written
    pub url: String,
    /// Path the map's `sources` are relative to (the map file, or the CSS
    /// file itself for inline maps)
    pub sources_relative_to: String,
}

/// The URL of the trailing `sourceMappingURL` annotation, if any
pub fn source_mapping_url(code: &str) -> Option<&str> {
    let captures = SOURCE_MAPPING_URL.captures(code)?;
    captures
        .get(1)
        .or_else(|| captures.get(2))
        .map(|url| url.as_str())
}

/// Load the source map referenced by `code`
///
/// `code_path` is the URL-style path of the file `code` came from; relative
/// map URLs resolve against its directory and are loaded with `read`.
/// Returns `Ok(None)` when `code` carries no annotation.
pub fn resolve_source_map(
    code: &str,
    code_path: &str,
    read: &dyn Fn(&Path) -> std::io::Result<String>,
) -> Result<Option<ResolvedSourceMap>, SourceMapError> {
    let Some(url) = source_mapping_url(code) else {
        return Ok(None);
    };

    if let Some(data) = url.strip_prefix("data:") {
        let text = decode_data_uri(data)?;
        return Ok(Some(ResolvedSourceMap {
            map: parse_map(&text)?,
            url: url.to_string(),
            sources_relative_to: code_path.to_string(),
        }));
    }

    if is_absolute_url(url) {
        return Err(SourceMapError::Io {
            path: url.to_string(),
            source: std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "remote source maps are not fetched",
            ),
        });
    }

    let map_path = join_url(&url_dirname(code_path), url);
    let text = read(Path::new(&map_path)).map_err(|source| SourceMapError::Io {
        path: map_path.clone(),
        source,
    })?;

    Ok(Some(ResolvedSourceMap {
        map: parse_map(&text)?,
        url: url.to_string(),
        sources_relative_to: map_path,
    }))
}

fn parse_map(text: &str) -> Result<RawSourceMap, SourceMapError> {
    let text = text.strip_prefix(XSSI_PREFIX).unwrap_or(text);
    Ok(serde_json::from_str(text)?)
}

/// Decode the part of a `data:` URI after the scheme
fn decode_data_uri(data: &str) -> Result<String, SourceMapError> {
    let Some((meta, payload)) = data.split_once(',') else {
        return Err(SourceMapError::InvalidDataUri {
            reason: "missing ',' separator".to_string(),
        });
    };

    let mut params = meta.split(';');
    let mime = params.next().unwrap_or_default();
    if !matches!(mime, "" | "application/json" | "text/json") {
        return Err(SourceMapError::InvalidDataUri {
            reason: format!("unexpected media type `{}`", mime),
        });
    }

    if params.any(|param| param == "base64") {
        let bytes = STANDARD.decode(payload)?;
        String::from_utf8(bytes).map_err(|err| SourceMapError::InvalidDataUri {
            reason: err.to_string(),
        })
    } else {
        percent_decode(payload)
    }
}

fn percent_decode(input: &str) -> Result<String, SourceMapError> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = input
                .get(i + 1..i + 3)
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                .ok_or_else(|| SourceMapError::InvalidDataUri {
                    reason: format!("bad percent escape at byte {}", i),
                })?;
            out.push(hex);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    String::from_utf8(out).map_err(|err| SourceMapError::InvalidDataUri {
        reason: err.to_string(),
    })
}
