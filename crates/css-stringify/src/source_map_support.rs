/*
 * source_map_support.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Position tracking that turns emitted text into source map mappings.
//!
//! A [`SourceMapTracker`] is attached to a strategy's [`Emitter`] for the
//! length of one render. Every emitted fragment advances the generated
//! position; fragments that carry a node position also record a mapping
//! back into the original stylesheet. Once rendering is done,
//! [`SourceMapTracker::apply_source_maps`] embeds the original sources and
//! chains any source map those sources point to.
//!
//! [`Emitter`]: crate::strategy::Emitter

use crate::ast::Position;
use crate::error::{Result, StringifyError};
use crate::options::StringifyOptions;
use crate::strategy::Render;
use css_source_map::{
    LineCol, Mapping, RawSourceMap, SourceMapConsumer, SourceMapError, SourceMapGenerator,
    resolve_source_map, to_url_path, url_dirname,
};
use std::io;
use std::path::Path;

/// Source name used for positions that do not name their file
pub const DEFAULT_SOURCE: &str = "source.css";

#[derive(Debug, Clone)]
pub struct SourceMapTracker {
    /// Generated line, 1-based
    line: u32,
    /// Generated column, 1-based, in UTF-16 code units
    column: u32,
    generator: SourceMapGenerator,
    /// Sources that supplied content, in first-seen order
    files: Vec<(String, String)>,
    input_sourcemaps: bool,
    finalized: bool,
}

impl SourceMapTracker {
    pub fn new(options: &StringifyOptions) -> Self {
        Self {
            line: 1,
            column: 1,
            generator: SourceMapGenerator::new(),
            files: Vec::new(),
            input_sourcemaps: options.input_sourcemaps,
            finalized: false,
        }
    }

    /// Start tracking everything `strategy` emits.
    pub fn attach<R: Render + ?Sized>(strategy: &mut R, options: &StringifyOptions) {
        strategy.emitter_mut().attach(Self::new(options));
    }

    /// Stop tracking and hand back the tracker `attach` installed.
    pub fn detach<R: Render + ?Sized>(strategy: &mut R) -> Result<Self> {
        strategy
            .emitter_mut()
            .detach()
            .ok_or(StringifyError::MapFinalization(
                "no source map tracker was attached",
            ))
    }

    /// Account for `text` having been emitted, mapping its start to
    /// `position` when one is given.
    pub(crate) fn record(&mut self, text: &str, position: Option<&Position>) -> Result<()> {
        if let Some(position) = position {
            let source = to_url_path(
                position
                    .source
                    .as_deref()
                    .filter(|source| !source.is_empty())
                    .unwrap_or(DEFAULT_SOURCE),
            );

            let start = position.start;
            if start.column == 0 {
                return Err(SourceMapError::InvalidMapping {
                    reason: format!(
                        "original column must start at 1 (got {}:{})",
                        start.line, start.column
                    ),
                }
                .into());
            }

            self.generator.add_mapping(Mapping::original(
                LineCol::new(self.line, self.column.saturating_sub(1)),
                source.clone(),
                LineCol::new(start.line, start.column - 1),
            ))?;
            self.add_file(source, position);
        }

        self.update_position(text);
        Ok(())
    }

    /// Positions saturate at `u32::MAX` rather than wrap.
    fn update_position(&mut self, text: &str) {
        self.line = self.line.saturating_add(saturating_u32(text.matches('\n').count()));
        match text.rfind('\n') {
            Some(index) => {
                self.column =
                    saturating_u32(text[index + 1..].encode_utf16().count()).saturating_add(1);
            }
            None => {
                self.column = self
                    .column
                    .saturating_add(saturating_u32(text.encode_utf16().count()));
            }
        }
    }

    /// Remember the first content seen for `source`
    fn add_file(&mut self, source: String, position: &Position) {
        let Some(content) = &position.content else {
            return;
        };
        if self.files.iter().any(|(file, _)| *file == source) {
            return;
        }
        self.files.push((source, content.clone()));
    }

    /// Embed source contents and chain input source maps.
    ///
    /// Input maps are looked up through each source's trailing
    /// `sourceMappingURL` annotation; relative map files are loaded with
    /// `read`. May run once per tracker.
    pub fn apply_source_maps(
        &mut self,
        read: &dyn Fn(&Path) -> io::Result<String>,
    ) -> Result<()> {
        if self.finalized {
            return Err(StringifyError::MapFinalization(
                "source maps were already applied",
            ));
        }
        self.finalized = true;

        for (file, content) in &self.files {
            self.generator
                .set_source_content(file.clone(), Some(content.clone()));

            if !self.input_sourcemaps {
                continue;
            }

            let Some(resolved) = resolve_source_map(content, file, read)? else {
                continue;
            };

            tracing::trace!(
                source = %file,
                map = %resolved.url,
                "Chaining input source map"
            );

            let consumer = SourceMapConsumer::from_raw(resolved.map)?;
            let relative_to = url_dirname(&to_url_path(&resolved.sources_relative_to));
            self.generator
                .apply_source_map(&consumer, file, Some(&relative_to));
        }

        Ok(())
    }

    pub fn generator(&self) -> &SourceMapGenerator {
        &self.generator
    }

    pub fn into_generator(self) -> SourceMapGenerator {
        self.generator
    }

    pub fn to_json(&self) -> Result<RawSourceMap> {
        Ok(self.generator.to_json()?)
    }

    /// Current generated position as (line, column), both 1-based
    pub fn position(&self) -> (u32, u32) {
        (self.line, self.column)
    }
}

fn saturating_u32(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Location, Node};
    use crate::strategy::Strategy;

    fn no_files(path: &Path) -> io::Result<String> {
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            path.display().to_string(),
        ))
    }

    fn at(line: u32, column: u32) -> Position {
        Position::new(Location::new(line, column), Location::new(line, column + 1))
    }

    #[test]
    fn test_position_advances_over_text() {
        let mut tracker = SourceMapTracker::new(&StringifyOptions::default());
        assert_eq!(tracker.position(), (1, 1));

        tracker.record("a {", None).unwrap();
        assert_eq!(tracker.position(), (1, 4));

        tracker.record("\n  color", None).unwrap();
        assert_eq!(tracker.position(), (2, 8));

        tracker.record(": red;\n}\n", None).unwrap();
        assert_eq!(tracker.position(), (4, 1));
    }

    #[test]
    fn test_columns_count_utf16_units() {
        let mut tracker = SourceMapTracker::new(&StringifyOptions::default());
        // U+1F600 is a surrogate pair
        tracker.record("content: \"\u{1F600}\"", None).unwrap();
        assert_eq!(tracker.position(), (1, 14));

        tracker.record("\n\u{e9}", None).unwrap();
        assert_eq!(tracker.position(), (2, 2));
    }

    #[test]
    fn test_position_saturates_instead_of_wrapping() {
        let mut tracker = SourceMapTracker::new(&StringifyOptions::default());
        tracker.line = u32::MAX - 1;
        tracker.column = u32::MAX - 1;

        tracker.record("abc", None).unwrap();
        assert_eq!(tracker.position(), (u32::MAX - 1, u32::MAX));

        tracker.record("\n\n\nx", None).unwrap();
        assert_eq!(tracker.position(), (u32::MAX, 2));
    }

    #[test]
    fn test_saturating_u32() {
        assert_eq!(saturating_u32(7), 7);
        assert_eq!(saturating_u32(u32::MAX as usize), u32::MAX);
        #[cfg(target_pointer_width = "64")]
        assert_eq!(saturating_u32(u32::MAX as usize + 1), u32::MAX);
    }

    #[test]
    fn test_record_adds_mapping() {
        let mut tracker = SourceMapTracker::new(&StringifyOptions::default());
        tracker.record("  ", None).unwrap();
        tracker
            .record("color: red", Some(&at(3, 5).with_source("site.css")))
            .unwrap();

        let mappings = tracker.generator().mappings();
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[0].generated, LineCol::new(1, 2));
        assert_eq!(mappings[0].original, Some(LineCol::new(3, 4)));
        assert_eq!(mappings[0].source.as_deref(), Some("site.css"));
    }

    #[test]
    fn test_missing_source_uses_default_name() {
        let mut tracker = SourceMapTracker::new(&StringifyOptions::default());
        tracker.record("a", Some(&at(1, 1))).unwrap();
        tracker
            .record("b", Some(&at(2, 1).with_source("")))
            .unwrap();
        assert_eq!(tracker.generator().sources(), &["source.css".to_string()]);
    }

    #[test]
    fn test_windows_source_paths_normalized() {
        let mut tracker = SourceMapTracker::new(&StringifyOptions::default());
        tracker
            .record("a", Some(&at(1, 1).with_source("styles\\main.css")))
            .unwrap();
        assert_eq!(
            tracker.generator().sources(),
            &["styles/main.css".to_string()]
        );
    }

    #[test]
    fn test_zero_column_rejected() {
        let mut tracker = SourceMapTracker::new(&StringifyOptions::default());
        let err = tracker.record("a", Some(&at(1, 0))).unwrap_err();
        assert!(matches!(
            err,
            StringifyError::SourceMap(SourceMapError::InvalidMapping { .. })
        ));
    }

    #[test]
    fn test_zero_line_rejected() {
        let mut tracker = SourceMapTracker::new(&StringifyOptions::default());
        let err = tracker.record("a", Some(&at(0, 1))).unwrap_err();
        assert!(matches!(err, StringifyError::SourceMap(_)));
    }

    #[test]
    fn test_first_content_wins() {
        let mut tracker = SourceMapTracker::new(&StringifyOptions::default());
        tracker
            .record("a", Some(&at(1, 1).with_source("a.css").with_content("first")))
            .unwrap();
        tracker
            .record("b", Some(&at(2, 1).with_source("a.css").with_content("second")))
            .unwrap();
        tracker.apply_source_maps(&no_files).unwrap();

        assert_eq!(tracker.generator().source_content("a.css"), Some("first"));
    }

    #[test]
    fn test_apply_twice_is_an_error() {
        let mut tracker = SourceMapTracker::new(&StringifyOptions::default());
        tracker.apply_source_maps(&no_files).unwrap();
        let err = tracker.apply_source_maps(&no_files).unwrap_err();
        assert!(matches!(err, StringifyError::MapFinalization(_)));
    }

    #[test]
    fn test_detach_without_attach_is_an_error() {
        let mut strategy = Strategy::select(&StringifyOptions::default());
        let err = SourceMapTracker::detach(&mut strategy).unwrap_err();
        assert!(matches!(err, StringifyError::MapFinalization(_)));
    }

    #[test]
    fn test_attach_tracks_a_render() {
        let options = StringifyOptions::default();
        let mut strategy = Strategy::select(&options);
        SourceMapTracker::attach(&mut strategy, &options);

        let node = Node::rule(
            ["a"],
            vec![Node::declaration("color", "red").with_position(at(1, 5))],
        )
        .with_position(at(1, 1));
        let code = strategy.render(&node).unwrap();
        let tracker = SourceMapTracker::detach(&mut strategy).unwrap();

        assert_eq!(code, "a {\n  color: red;\n}");
        assert_eq!(tracker.position(), (3, 2));
        assert_eq!(tracker.to_json().unwrap().mappings, "AAAA;EAAI");
        assert!(!strategy.emitter_mut().is_tracking());
    }

    #[test]
    fn test_input_map_chained_from_inline_annotation() {
        // Original `b` at line 1 column 0 of `input.scss` became column 0
        // of the CSS this tracker sees as its source.
        let input_map = r#"{"version":3,"sources":["input.scss"],"names":[],"mappings":"AAAA","sourcesContent":["b { x: y }"]}"#;
        let uri = format!(
            "data:application/json;base64,{}",
            base64_encode(input_map)
        );
        let content = format!("b{{x:y}}\n/*# sourceMappingURL={} */", uri);

        let mut tracker = SourceMapTracker::new(&StringifyOptions::default());
        tracker
            .record(
                "b",
                Some(&at(1, 1).with_source("dir/compiled.css").with_content(content)),
            )
            .unwrap();
        tracker.apply_source_maps(&no_files).unwrap();

        let raw = tracker.to_json().unwrap();
        assert_eq!(raw.sources, vec!["dir/input.scss".to_string()]);
        assert_eq!(
            tracker.generator().source_content("dir/input.scss"),
            Some("b { x: y }")
        );
    }

    #[test]
    fn test_input_maps_disabled() {
        let content = "b{}\n/*# sourceMappingURL=missing.map */";
        let options = StringifyOptions::new().with_input_sourcemaps(false);
        let mut tracker = SourceMapTracker::new(&options);
        tracker
            .record("b", Some(&at(1, 1).with_source("b.css").with_content(content)))
            .unwrap();

        // Would fail to read `missing.map` if resolution ran
        tracker.apply_source_maps(&no_files).unwrap();
        assert_eq!(tracker.to_json().unwrap().sources, vec!["b.css".to_string()]);
    }

    #[test]
    fn test_unreadable_input_map_is_an_error() {
        let content = "b{}\n/*# sourceMappingURL=missing.map */";
        let mut tracker = SourceMapTracker::new(&StringifyOptions::default());
        tracker
            .record("b", Some(&at(1, 1).with_source("b.css").with_content(content)))
            .unwrap();

        let err = tracker.apply_source_maps(&no_files).unwrap_err();
        assert!(matches!(
            err,
            StringifyError::SourceMap(SourceMapError::Io { .. })
        ));
    }

    fn base64_encode(text: &str) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(text)
    }
}
