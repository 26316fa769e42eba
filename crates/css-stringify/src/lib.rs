//! Stringify CSS syntax trees back to text.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! This crate provides:
//! - The stylesheet AST, as produced by the reworkcss `css` parser (JSON tagged by `type`)
//! - Identity and compressed rendering strategies
//! - A memoizing compile dispatcher with optional source map output
//!
//! ```rust
//! use css_stringify::{Node, SourceMapMode, StringifyOptions, stringify};
//!
//! let sheet = Node::stylesheet(vec![Node::rule(
//!     ["a", "b"],
//!     vec![Node::declaration("color", "red")],
//! )]);
//!
//! let compressed = StringifyOptions::new().compressed(true);
//! assert_eq!(stringify(Some(&sheet), &compressed).unwrap().code(), "a,b{color:red;}");
//!
//! let mapped = StringifyOptions::new().with_sourcemap(SourceMapMode::Serialized);
//! let out = stringify(Some(&sheet), &mapped).unwrap();
//! assert!(out.map().is_some());
//! ```

pub mod ast;
mod compiler;
pub mod compress;
pub mod error;
pub mod identity;
pub mod options;
pub mod source_map_support;
pub mod strategy;
mod stringify;

pub use ast::{Location, Node, Position};
pub use error::{Result, StringifyError};
pub use options::{DEFAULT_INDENT, SourceMapMode, StringifyOptions};
pub use source_map_support::SourceMapTracker;
pub use strategy::{Emitter, Render, Strategy};
pub use stringify::{FileReader, SourceMap, Stringified, Stringifier, stringify, stringify_json};
