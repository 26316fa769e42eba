/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for css-stringify

use css_source_map::SourceMapError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StringifyError {
    /// No tree was supplied
    #[error("AST node is required for compilation")]
    InvalidInput,

    /// The JSON form of the tree does not describe a stylesheet node
    #[error("Invalid stylesheet AST: {0}")]
    InvalidAst(#[source] serde_json::Error),

    /// Recording a mapping or resolving an input map failed
    #[error("Source map error: {0}")]
    SourceMap(#[from] SourceMapError),

    #[error("Failed to derive cache key for {kind} node: {source}")]
    CacheKey {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Source map finalization ran out of order. This is a bug in the
    /// caller of the tracker, not a problem with the input.
    #[error("Source map finalized out of order: {0}")]
    MapFinalization(&'static str),
}

pub type Result<T> = std::result::Result<T, StringifyError>;
