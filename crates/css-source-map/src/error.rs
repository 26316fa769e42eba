//! Error types for source map operations.

use thiserror::Error;

/// Errors that can occur while building, reading or resolving source maps
#[derive(Debug, Error)]
pub enum SourceMapError {
    /// A mapping with impossible positions or a missing source
    #[error("Invalid mapping: {reason}")]
    InvalidMapping { reason: String },

    /// The source map codec rejected a map (bad `mappings`, source or
    /// name references)
    #[error("Invalid source map: {0}")]
    Codec(#[from] sourcemap::Error),

    /// Only revision 3 maps are understood
    #[error("Unsupported source map version {0} (expected 3)")]
    UnsupportedVersion(u32),

    /// A `data:` URI that does not carry a JSON source map
    #[error("Invalid source map data URI: {reason}")]
    InvalidDataUri { reason: String },

    /// Source map text is not valid JSON
    #[error("Invalid source map JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Base64 payload of a data URI could not be decoded
    #[error("Invalid base64 in source map data URI: {0}")]
    Base64(#[from] base64::DecodeError),

    /// A referenced source map file could not be read
    #[error("Failed to read source map {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl SourceMapError {
    pub(crate) fn invalid_mapping(reason: impl Into<String>) -> Self {
        Self::InvalidMapping {
            reason: reason.into(),
        }
    }
}
