//! Source maps for generated CSS
//!
//! This crate implements revision 3 source maps as consumed by browsers and
//! bundlers. It records mappings while text is generated, reads existing maps
//! back, and chains an input map onto a generated one. The base64 VLQ
//! `mappings` codec is the [`sourcemap`] crate's; this crate owns the
//! mapping model, map chaining and `sourceMappingURL` resolution.
//!
//! # Overview
//!
//! The core types are:
//! - [`SourceMapGenerator`]: Collects mappings and produces a [`RawSourceMap`]
//! - [`SourceMapConsumer`]: Answers original-position queries for a parsed map
//! - [`resolve_source_map`]: Locates the map referenced by a `sourceMappingURL`
//!
//! # Example
//!
//! ```rust
//! use css_source_map::*;
//!
//! let mut generator = SourceMapGenerator::new();
//! generator
//!     .add_mapping(Mapping::original(
//!         LineCol::new(1, 0),
//!         "style.css",
//!         LineCol::new(3, 4),
//!     ))
//!     .unwrap();
//!
//! let raw = generator.to_json().unwrap();
//! assert_eq!(raw.sources, vec!["style.css".to_string()]);
//! assert_eq!(raw.mappings, "AAEI");
//! ```

pub mod consumer;
pub mod error;
pub mod generator;
pub mod resolve;
pub mod types;
pub mod utils;

// Re-export main types
pub use consumer::{OriginalPosition, SourceMapConsumer};
pub use error::SourceMapError;
pub use generator::SourceMapGenerator;
pub use resolve::{ResolvedSourceMap, resolve_source_map, source_mapping_url};
pub use types::{LineCol, Mapping, RawSourceMap};
pub use utils::{join_url, normalize_url_path, to_url_path, url_dirname};
