/*
 * stringify.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The compile dispatcher.
//!
//! [`Stringifier`] owns the strategy picked for an invocation together with
//! a cache of rendered output. Structurally equal nodes are rendered once:
//! the cache is keyed by the node's canonical JSON serialization, so two
//! separately built but equal trees share an entry.
//!
//! When a source map is requested the dispatcher attaches a
//! [`SourceMapTracker`] for exactly one render, finalizes the map, and
//! returns it alongside the code from that same render.

use crate::ast::Node;
use crate::error::{Result, StringifyError};
use crate::options::{SourceMapMode, StringifyOptions};
use crate::source_map_support::SourceMapTracker;
use crate::strategy::{Render, Strategy};
use css_source_map::{RawSourceMap, SourceMapError, SourceMapGenerator};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::Path;

/// Loads source map files referenced from embedded source content
pub type FileReader = Box<dyn Fn(&Path) -> io::Result<String> + Send>;

/// A finalized source map, in the form the options asked for
#[derive(Debug, Clone, PartialEq)]
pub enum SourceMap {
    /// `sourcemap: "generator"`: the generator itself, open to further edits
    Generator(SourceMapGenerator),
    /// `sourcemap: true`: the serialized map
    Json(RawSourceMap),
}

impl SourceMap {
    pub fn to_json(&self) -> std::result::Result<RawSourceMap, SourceMapError> {
        match self {
            SourceMap::Generator(generator) => generator.to_json(),
            SourceMap::Json(raw) => Ok(raw.clone()),
        }
    }
}

impl fmt::Display for SourceMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceMap::Generator(generator) => fmt::Display::fmt(generator, f),
            SourceMap::Json(raw) => fmt::Display::fmt(raw, f),
        }
    }
}

/// Result of a stringify call
#[derive(Debug, Clone, PartialEq)]
pub enum Stringified {
    /// Source maps disabled
    Code(String),
    WithMap { code: String, map: SourceMap },
}

impl Stringified {
    pub fn code(&self) -> &str {
        match self {
            Stringified::Code(code) | Stringified::WithMap { code, .. } => code,
        }
    }

    pub fn map(&self) -> Option<&SourceMap> {
        match self {
            Stringified::Code(_) => None,
            Stringified::WithMap { map, .. } => Some(map),
        }
    }

    pub fn into_code(self) -> String {
        match self {
            Stringified::Code(code) | Stringified::WithMap { code, .. } => code,
        }
    }
}

fn read_from_disk(path: &Path) -> io::Result<String> {
    std::fs::read_to_string(path)
}

/// Memoizing compile dispatcher for one invocation
pub struct Stringifier<R: Render = Strategy> {
    strategy: R,
    options: StringifyOptions,
    /// Canonical node serialization -> rendered output
    cache: HashMap<String, String>,
    read_file: FileReader,
}

impl Stringifier<Strategy> {
    /// Create a dispatcher using the strategy `options` selects.
    pub fn new(options: StringifyOptions) -> Self {
        let strategy = Strategy::select(&options);
        tracing::debug!(
            strategy = strategy.name(),
            sourcemap = ?options.sourcemap,
            "Selected stringify strategy"
        );
        Self {
            strategy,
            options,
            cache: HashMap::new(),
            read_file: Box::new(read_from_disk),
        }
    }
}

impl<R: Render> Stringifier<R> {
    /// Replace the selected strategy, keeping the options.
    ///
    /// The cache starts empty since it holds the old strategy's output.
    pub fn with_strategy<S: Render>(self, strategy: S) -> Stringifier<S> {
        Stringifier {
            strategy,
            options: self.options,
            cache: HashMap::new(),
            read_file: self.read_file,
        }
    }

    /// Read input source maps through `read` instead of the filesystem.
    pub fn with_file_reader<F>(mut self, read: F) -> Self
    where
        F: Fn(&Path) -> io::Result<String> + Send + 'static,
    {
        self.read_file = Box::new(read);
        self
    }

    pub fn options(&self) -> &StringifyOptions {
        &self.options
    }

    pub fn strategy(&self) -> &R {
        &self.strategy
    }

    /// Number of distinct nodes rendered so far
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    fn cache_key(node: &Node) -> Result<String> {
        serde_json::to_string(node).map_err(|source| StringifyError::CacheKey {
            kind: node.kind(),
            source,
        })
    }

    /// Render `node`, reusing earlier output for a structurally equal node.
    pub fn compile(&mut self, node: &Node) -> Result<String> {
        let key = Self::cache_key(node)?;
        if let Some(code) = self.cache.get(&key) {
            tracing::trace!(kind = node.kind(), "Stringify cache hit");
            return Ok(code.clone());
        }

        tracing::trace!(kind = node.kind(), "Stringify cache miss");
        let code = self.strategy.render(node)?;
        self.cache.insert(key, code.clone());
        Ok(code)
    }

    /// Render `node` unconditionally and refresh its cache entry.
    ///
    /// Used while a tracker is attached: cached text would leave the
    /// tracker with no mappings.
    fn compile_fresh(&mut self, node: &Node) -> Result<String> {
        let key = Self::cache_key(node)?;
        let code = self.strategy.render(node)?;
        self.cache.insert(key, code.clone());
        Ok(code)
    }

    /// Stringify `node` according to the dispatcher's options.
    ///
    /// # Errors
    ///
    /// [`StringifyError::InvalidInput`] when `node` is `None`, before any
    /// other work. Source map failures surface as
    /// [`StringifyError::SourceMap`].
    pub fn stringify(&mut self, node: Option<&Node>) -> Result<Stringified> {
        let Some(node) = node else {
            return Err(StringifyError::InvalidInput);
        };

        let mode = self.options.sourcemap;
        if !mode.is_enabled() {
            return Ok(Stringified::Code(self.compile(node)?));
        }

        tracing::debug!(mode = ?mode, kind = node.kind(), "Stringifying with source map");

        SourceMapTracker::attach(&mut self.strategy, &self.options);
        let rendered = self.compile_fresh(node);
        // Detach before propagating so a failed render leaves no tracker behind
        let mut tracker = SourceMapTracker::detach(&mut self.strategy)?;
        let code = rendered?;

        tracker.apply_source_maps(&*self.read_file)?;
        tracing::debug!(
            sources = tracker.generator().sources().len(),
            mappings = tracker.generator().mappings().len(),
            "Source map finalized"
        );

        let map = match mode {
            SourceMapMode::Generator => SourceMap::Generator(tracker.into_generator()),
            _ => SourceMap::Json(tracker.to_json()?),
        };
        Ok(Stringified::WithMap { code, map })
    }
}

impl<R: Render + fmt::Debug> fmt::Debug for Stringifier<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stringifier")
            .field("strategy", &self.strategy)
            .field("options", &self.options)
            .field("cached", &self.cache.len())
            .finish_non_exhaustive()
    }
}

/// Stringify `node` with a fresh dispatcher.
///
/// Returns [`Stringified::Code`] unless `options.sourcemap` is enabled, in
/// which case the code comes back together with its map.
///
/// # Example
///
/// ```rust
/// use css_stringify::{Node, StringifyOptions, stringify};
///
/// let rule = Node::rule(["a"], vec![Node::declaration("color", "red")]);
/// let out = stringify(Some(&rule), &StringifyOptions::default()).unwrap();
/// assert_eq!(out.code(), "a {\n  color: red;\n}");
/// ```
pub fn stringify(node: Option<&Node>, options: &StringifyOptions) -> Result<Stringified> {
    let Some(node) = node else {
        return Err(StringifyError::InvalidInput);
    };
    Stringifier::new(options.clone()).stringify(Some(node))
}

/// Stringify the JSON form of a tree.
///
/// JSON `null` is the absent node.
pub fn stringify_json(value: &serde_json::Value, options: &StringifyOptions) -> Result<Stringified> {
    if value.is_null() {
        return Err(StringifyError::InvalidInput);
    }
    let node = Node::deserialize(value).map_err(StringifyError::InvalidAst)?;
    stringify(Some(&node), options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Location, Position};
    use crate::strategy::Emitter;
    use serde_json::json;

    /// Renders a node's kind and counts how often it is asked to
    #[derive(Debug, Default)]
    struct CountingStrategy {
        emitter: Emitter,
        renders: usize,
    }

    impl Render for CountingStrategy {
        fn render(&mut self, node: &Node) -> Result<String> {
            self.renders += 1;
            self.emitter.emit(node.kind(), node.position())
        }

        fn emitter_mut(&mut self) -> &mut Emitter {
            &mut self.emitter
        }
    }

    fn counting(options: StringifyOptions) -> Stringifier<CountingStrategy> {
        Stringifier::new(options).with_strategy(CountingStrategy::default())
    }

    fn red_rule() -> Node {
        Node::rule(["a"], vec![Node::declaration("color", "red")])
    }

    fn at(line: u32, column: u32) -> Position {
        Position::new(Location::new(line, column), Location::new(line, column + 1))
    }

    #[test]
    fn test_missing_node_is_invalid_input() {
        let err = stringify(None, &StringifyOptions::default()).unwrap_err();
        assert!(matches!(err, StringifyError::InvalidInput));
        assert_eq!(err.to_string(), "AST node is required for compilation");
    }

    #[test]
    fn test_missing_node_rejected_for_every_option_combination() {
        let modes = [
            SourceMapMode::Disabled,
            SourceMapMode::Serialized,
            SourceMapMode::Generator,
        ];
        for compress in [false, true] {
            for mode in modes {
                let options = StringifyOptions::new()
                    .compressed(compress)
                    .with_sourcemap(mode);
                let mut stringifier = counting(options.clone());

                assert!(matches!(
                    stringifier.stringify(None),
                    Err(StringifyError::InvalidInput)
                ));
                assert_eq!(stringifier.strategy().renders, 0);
                assert!(matches!(
                    stringify(None, &options),
                    Err(StringifyError::InvalidInput)
                ));
            }
        }
    }

    #[test]
    fn test_equal_nodes_render_once() {
        let mut stringifier = counting(StringifyOptions::default());

        let first = stringifier.stringify(Some(&red_rule())).unwrap();
        let second = stringifier.stringify(Some(&red_rule())).unwrap();

        assert_eq!(first, second);
        assert_eq!(stringifier.strategy().renders, 1);
        assert_eq!(stringifier.cached_len(), 1);
    }

    #[test]
    fn test_different_nodes_render_separately() {
        let mut stringifier = counting(StringifyOptions::default());
        let blue = Node::rule(["a"], vec![Node::declaration("color", "blue")]);

        stringifier.compile(&red_rule()).unwrap();
        stringifier.compile(&blue).unwrap();
        stringifier.compile(&red_rule()).unwrap();

        assert_eq!(stringifier.strategy().renders, 2);
        assert_eq!(stringifier.cached_len(), 2);
    }

    #[test]
    fn test_cache_key_ignores_json_field_order() {
        let a: Node = serde_json::from_value(json!({
            "type": "declaration", "property": "color", "value": "red"
        }))
        .unwrap();
        let b: Node = serde_json::from_value(json!({
            "value": "red", "property": "color", "type": "declaration"
        }))
        .unwrap();

        let mut stringifier = counting(StringifyOptions::default());
        stringifier.compile(&a).unwrap();
        stringifier.compile(&b).unwrap();
        assert_eq!(stringifier.strategy().renders, 1);
    }

    #[test]
    fn test_disabled_returns_bare_code() {
        let out = stringify(Some(&red_rule()), &StringifyOptions::default()).unwrap();
        assert_eq!(out, Stringified::Code("a {\n  color: red;\n}".to_string()));
        assert!(out.map().is_none());
    }

    #[test]
    fn test_compress_selects_compressed() {
        let options = StringifyOptions::new().compressed(true);
        let out = stringify(Some(&red_rule()), &options).unwrap();
        assert_eq!(out.code(), "a{color:red;}");
    }

    #[test]
    fn test_serialized_map() {
        let node = Node::rule(
            ["a"],
            vec![Node::declaration("color", "red").with_position(at(1, 5))],
        )
        .with_position(at(1, 1));
        let options = StringifyOptions::new().with_sourcemap(SourceMapMode::Serialized);

        let out = stringify(Some(&node), &options).unwrap();
        assert_eq!(out.code(), "a {\n  color: red;\n}");

        let Some(SourceMap::Json(raw)) = out.map() else {
            panic!("expected a serialized map, got {:?}", out.map());
        };
        assert_eq!(raw.version, 3);
        assert_eq!(raw.sources, vec!["source.css".to_string()]);
        assert_eq!(raw.mappings, "AAAA;EAAI");
    }

    #[test]
    fn test_generator_map_is_live() {
        let node = red_rule().with_position(at(1, 1).with_source("in.css"));
        let options = StringifyOptions::new().with_sourcemap(SourceMapMode::Generator);

        let out = stringify(Some(&node), &options).unwrap();
        let Some(SourceMap::Generator(generator)) = out.map() else {
            panic!("expected a generator, got {:?}", out.map());
        };
        assert_eq!(generator.sources(), &["in.css".to_string()]);
        assert_eq!(generator.mappings().len(), 1);
    }

    #[test]
    fn test_code_same_with_and_without_map() {
        let node = Node::stylesheet(vec![
            red_rule().with_position(at(1, 1)),
            Node::media("print", vec![red_rule().with_position(at(3, 1))])
                .with_position(at(2, 1)),
        ]);

        for compress in [false, true] {
            let plain = StringifyOptions::new().compressed(compress);
            let mapped = plain.clone().with_sourcemap(SourceMapMode::Serialized);

            let without = stringify(Some(&node), &plain).unwrap();
            let with = stringify(Some(&node), &mapped).unwrap();
            assert_eq!(without.code(), with.code());
        }
    }

    #[test]
    fn test_reused_dispatcher_maps_every_call() {
        let node = red_rule().with_position(at(1, 1));
        let options = StringifyOptions::new().with_sourcemap(SourceMapMode::Serialized);
        let mut stringifier = Stringifier::new(options);

        let first = stringifier.stringify(Some(&node)).unwrap();
        let second = stringifier.stringify(Some(&node)).unwrap();

        assert_eq!(first, second);
        assert_eq!(second.map().map(|map| map.to_json().unwrap().mappings), Some("AAAA".to_string()));
    }

    #[test]
    fn test_failed_render_detaches_tracker() {
        // Fails inside the block, after the rule has nested one level
        let bad = Node::rule(
            ["a"],
            vec![Node::declaration("color", "red").with_position(at(1, 0))],
        );
        let options = StringifyOptions::new().with_sourcemap(SourceMapMode::Serialized);
        let mut stringifier = Stringifier::new(options);

        let err = stringifier.stringify(Some(&bad)).unwrap_err();
        assert!(matches!(err, StringifyError::SourceMap(_)));

        let good = Node::rule(["b"], vec![Node::declaration("color", "blue")])
            .with_position(at(1, 1));
        let out = stringifier.stringify(Some(&good)).unwrap();
        assert_eq!(out.code(), "b {\n  color: blue;\n}");
        assert_eq!(out.map().unwrap().to_json().unwrap().mappings, "AAAA");
    }

    #[test]
    fn test_input_map_read_through_injected_reader() {
        let content = "a{color:red}\n/*# sourceMappingURL=a.css.map */";
        let node = red_rule().with_position(at(1, 1).with_source("css/a.css").with_content(content));
        let options = StringifyOptions::new().with_sourcemap(SourceMapMode::Serialized);

        let mut stringifier = Stringifier::new(options).with_file_reader(|path: &Path| {
            assert_eq!(path, Path::new("css/a.css.map"));
            Ok(r#"{"version":3,"sources":["a.scss"],"names":[],"mappings":"AAAA"}"#.to_string())
        });

        let out = stringifier.stringify(Some(&node)).unwrap();
        let raw = out.map().unwrap().to_json().unwrap();
        assert_eq!(raw.sources, vec!["css/a.scss".to_string()]);
    }

    #[test]
    fn test_dispatcher_can_move_to_another_thread() {
        fn assert_send<T: Send>() {}
        assert_send::<Stringifier>();
        assert_send::<Strategy>();

        let mut stringifier = Stringifier::new(StringifyOptions::default());
        let handle = std::thread::spawn(move || stringifier.stringify(Some(&red_rule())));
        let out = handle.join().unwrap().unwrap();
        assert_eq!(out.code(), "a {\n  color: red;\n}");
    }

    #[test]
    fn test_stringify_json() {
        let value = json!({
            "type": "stylesheet",
            "stylesheet": {
                "rules": [{
                    "type": "rule",
                    "selectors": ["a"],
                    "declarations": [
                        {"type": "declaration", "property": "color", "value": "red"}
                    ]
                }]
            }
        });
        let out = stringify_json(&value, &StringifyOptions::default()).unwrap();
        assert_eq!(out.code(), "a {\n  color: red;\n}");
    }

    #[test]
    fn test_stringify_json_null_and_malformed() {
        let options = StringifyOptions::default();
        assert!(matches!(
            stringify_json(&serde_json::Value::Null, &options),
            Err(StringifyError::InvalidInput)
        ));
        assert!(matches!(
            stringify_json(&json!({"type": "bogus"}), &options),
            Err(StringifyError::InvalidAst(_))
        ));
    }
}
