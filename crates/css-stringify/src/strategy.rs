/*
 * strategy.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Rendering strategies and strategy selection.
 */

//! Rendering strategies and strategy selection.
//!
//! The dispatcher only ever talks to a strategy through [`Render`]. The two
//! built-in strategies are picked once per invocation by
//! [`Strategy::select`]:
//!
//! - [`Identity`] - faithful, indented output
//! - [`Compressed`] - output without optional whitespace
//!
//! Every strategy owns an [`Emitter`]. Text goes through the emitter in
//! output order, which is what lets a [`SourceMapTracker`] follow along when
//! one is attached.

use crate::ast::{Node, Position};
use crate::compress::Compressed;
use crate::error::Result;
use crate::identity::Identity;
use crate::options::StringifyOptions;
use crate::source_map_support::SourceMapTracker;

/// Capability every rendering strategy provides.
pub trait Render {
    /// Render `node` (and everything below it) to text.
    ///
    /// # Errors
    ///
    /// Returns an error if position tracking rejects a node position.
    fn render(&mut self, node: &Node) -> Result<String>;

    /// The emitter this strategy writes through.
    fn emitter_mut(&mut self) -> &mut Emitter;
}

/// Output primitive shared by the strategies
#[derive(Debug, Default)]
pub struct Emitter {
    tracker: Option<SourceMapTracker>,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pass `text` through, recording a mapping for `position` when a
    /// tracker is attached.
    pub fn emit(&mut self, text: &str, position: Option<&Position>) -> Result<String> {
        if let Some(tracker) = self.tracker.as_mut() {
            tracker.record(text, position)?;
        }
        Ok(text.to_string())
    }

    pub fn attach(&mut self, tracker: SourceMapTracker) {
        self.tracker = Some(tracker);
    }

    pub fn detach(&mut self) -> Option<SourceMapTracker> {
        self.tracker.take()
    }

    pub fn is_tracking(&self) -> bool {
        self.tracker.is_some()
    }
}

/// The built-in strategies
#[derive(Debug)]
pub enum Strategy {
    Identity(Identity),
    Compressed(Compressed),
}

impl Strategy {
    /// Pick the strategy `options` asks for.
    ///
    /// The options are handed to the strategy as is; it reads what it needs.
    pub fn select(options: &StringifyOptions) -> Self {
        if options.compress {
            Strategy::Compressed(Compressed::new(options.clone()))
        } else {
            Strategy::Identity(Identity::new(options.clone()))
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Identity(_) => "identity",
            Strategy::Compressed(_) => "compressed",
        }
    }
}

impl Render for Strategy {
    fn render(&mut self, node: &Node) -> Result<String> {
        match self {
            Strategy::Identity(strategy) => strategy.render(node),
            Strategy::Compressed(strategy) => strategy.render(node),
        }
    }

    fn emitter_mut(&mut self) -> &mut Emitter {
        match self {
            Strategy::Identity(strategy) => strategy.emitter_mut(),
            Strategy::Compressed(strategy) => strategy.emitter_mut(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_by_compress_flag() {
        let identity = Strategy::select(&StringifyOptions::default());
        assert_eq!(identity.name(), "identity");

        let compressed = Strategy::select(&StringifyOptions::new().compressed(true));
        assert_eq!(compressed.name(), "compressed");
    }

    #[test]
    fn test_options_handed_to_strategy() {
        let mut options = StringifyOptions::new().with_indent("\t");
        options
            .extra
            .insert("source".to_string(), serde_json::json!("site.css"));

        let Strategy::Identity(identity) = Strategy::select(&options) else {
            panic!("expected identity strategy");
        };
        assert_eq!(identity.options(), &options);

        let compressed_options = options.clone().compressed(true);
        let Strategy::Compressed(compressed) = Strategy::select(&compressed_options) else {
            panic!("expected compressed strategy");
        };
        assert_eq!(compressed.options().extra.get("source"), options.extra.get("source"));
    }

    #[test]
    fn test_selected_strategies_render_differently() {
        let node = Node::rule(["a"], vec![Node::declaration("color", "red")]);

        let mut identity = Strategy::select(&StringifyOptions::default());
        let mut compressed = Strategy::select(&StringifyOptions::new().compressed(true));

        assert_eq!(identity.render(&node).unwrap(), "a {\n  color: red;\n}");
        assert_eq!(compressed.render(&node).unwrap(), "a{color:red;}");
    }

    #[test]
    fn test_emitter_without_tracker_passes_text_through() {
        let mut emitter = Emitter::new();
        assert!(!emitter.is_tracking());
        assert_eq!(emitter.emit("a {", None).unwrap(), "a {");
        assert!(emitter.detach().is_none());
    }
}
