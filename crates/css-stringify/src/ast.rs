/*
 * ast.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Stylesheet syntax tree.
//!
//! The tree uses the JSON vocabulary of the `css` (reworkcss) parser: every
//! node is an object tagged by `type`, and may carry a `position` pointing
//! back into the text it was parsed from. A tree serialized by that parser
//! can be decoded directly with `serde_json`.
//!
//! Field declaration order matters: the compile cache keys nodes by their
//! serialized form, which follows declaration order.

use serde::{Deserialize, Serialize};

/// A line/column pair in the original source (both 1-based)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub fn new(line: u32, column: u32) -> Self {
        Location { line, column }
    }
}

/// Where a node came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub start: Location,
    #[serde(default)]
    pub end: Location,
    /// Name of the source file; `source.css` is assumed when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Full text of the source file, embedded into generated source maps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Position {
    pub fn new(start: Location, end: Location) -> Self {
        Position {
            start,
            end,
            source: None,
            content: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }
}

/// One syntactic construct of a stylesheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Node {
    Stylesheet(Stylesheet),
    Rule(Rule),
    Declaration(Declaration),
    Comment(Comment),
    Charset(Charset),
    CustomMedia(CustomMedia),
    Document(Document),
    FontFace(FontFace),
    Host(Host),
    Import(Import),
    Keyframes(Keyframes),
    Keyframe(Keyframe),
    Media(Media),
    Namespace(Namespace),
    Page(Page),
    Supports(Supports),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stylesheet {
    pub stylesheet: StylesheetBody,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StylesheetBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub rules: Vec<Node>,
    /// Errors the parser recovered from; carried through untouched
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parsing_errors: Vec<serde_json::Value>,
}

/// `a, b { ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub selectors: Vec<String>,
    /// Declarations and comments
    #[serde(default)]
    pub declarations: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

/// `property: value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

/// `/* comment */`, text without the delimiters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Charset {
    pub charset: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

/// `@custom-media --name query;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomMedia {
    pub name: String,
    pub media: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

/// `@-vendor-document url(...) { ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub document: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default)]
    pub rules: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontFace {
    #[serde(default)]
    pub declarations: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Host {
    #[serde(default)]
    pub rules: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Import {
    pub import: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

/// `@keyframes name { ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframes {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    /// Keyframes and comments
    #[serde(default)]
    pub keyframes: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

/// `from, 50% { ... }` inside `@keyframes`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub values: Vec<String>,
    #[serde(default)]
    pub declarations: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    pub media: String,
    #[serde(default)]
    pub rules: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Namespace {
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

/// `@page :first { ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub selectors: Vec<String>,
    #[serde(default)]
    pub declarations: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supports {
    pub supports: String,
    #[serde(default)]
    pub rules: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl Node {
    pub fn stylesheet(rules: Vec<Node>) -> Self {
        Node::Stylesheet(Stylesheet {
            stylesheet: StylesheetBody {
                rules,
                ..Default::default()
            },
            position: None,
        })
    }

    pub fn rule<S: Into<String>>(
        selectors: impl IntoIterator<Item = S>,
        declarations: Vec<Node>,
    ) -> Self {
        Node::Rule(Rule {
            selectors: selectors.into_iter().map(Into::into).collect(),
            declarations,
            position: None,
        })
    }

    pub fn declaration(property: impl Into<String>, value: impl Into<String>) -> Self {
        Node::Declaration(Declaration {
            property: property.into(),
            value: value.into(),
            position: None,
        })
    }

    pub fn comment(comment: impl Into<String>) -> Self {
        Node::Comment(Comment {
            comment: comment.into(),
            position: None,
        })
    }

    pub fn media(media: impl Into<String>, rules: Vec<Node>) -> Self {
        Node::Media(Media {
            media: media.into(),
            rules,
            position: None,
        })
    }

    /// The `type` tag of this node
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Stylesheet(_) => "stylesheet",
            Node::Rule(_) => "rule",
            Node::Declaration(_) => "declaration",
            Node::Comment(_) => "comment",
            Node::Charset(_) => "charset",
            Node::CustomMedia(_) => "custom-media",
            Node::Document(_) => "document",
            Node::FontFace(_) => "font-face",
            Node::Host(_) => "host",
            Node::Import(_) => "import",
            Node::Keyframes(_) => "keyframes",
            Node::Keyframe(_) => "keyframe",
            Node::Media(_) => "media",
            Node::Namespace(_) => "namespace",
            Node::Page(_) => "page",
            Node::Supports(_) => "supports",
        }
    }

    pub fn position(&self) -> Option<&Position> {
        match self {
            Node::Stylesheet(n) => n.position.as_ref(),
            Node::Rule(n) => n.position.as_ref(),
            Node::Declaration(n) => n.position.as_ref(),
            Node::Comment(n) => n.position.as_ref(),
            Node::Charset(n) => n.position.as_ref(),
            Node::CustomMedia(n) => n.position.as_ref(),
            Node::Document(n) => n.position.as_ref(),
            Node::FontFace(n) => n.position.as_ref(),
            Node::Host(n) => n.position.as_ref(),
            Node::Import(n) => n.position.as_ref(),
            Node::Keyframes(n) => n.position.as_ref(),
            Node::Keyframe(n) => n.position.as_ref(),
            Node::Media(n) => n.position.as_ref(),
            Node::Namespace(n) => n.position.as_ref(),
            Node::Page(n) => n.position.as_ref(),
            Node::Supports(n) => n.position.as_ref(),
        }
    }

    pub fn with_position(mut self, position: Position) -> Self {
        let slot = match &mut self {
            Node::Stylesheet(n) => &mut n.position,
            Node::Rule(n) => &mut n.position,
            Node::Declaration(n) => &mut n.position,
            Node::Comment(n) => &mut n.position,
            Node::Charset(n) => &mut n.position,
            Node::CustomMedia(n) => &mut n.position,
            Node::Document(n) => &mut n.position,
            Node::FontFace(n) => &mut n.position,
            Node::Host(n) => &mut n.position,
            Node::Import(n) => &mut n.position,
            Node::Keyframes(n) => &mut n.position,
            Node::Keyframe(n) => &mut n.position,
            Node::Media(n) => &mut n.position,
            Node::Namespace(n) => &mut n.position,
            Node::Page(n) => &mut n.position,
            Node::Supports(n) => &mut n.position,
        };
        *slot = Some(position);
        self
    }
}
