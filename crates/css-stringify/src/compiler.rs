/*
 * compiler.rs
 * Copyright (c) 2025 Posit, PBC
 */

use crate::ast::{
    Charset, Comment, CustomMedia, Declaration, Document, FontFace, Host, Import, Keyframe,
    Keyframes, Media, Namespace, Node, Page, Position, Rule, Stylesheet, Supports,
};
use crate::error::Result;
use crate::strategy::Emitter;

/// Per-node-type rendering shared by the built-in strategies.
///
/// `visit` dispatches on the node type; implementors provide one method per
/// type and build their output from `emit` calls made in output order.
pub(crate) trait Compiler {
    fn emitter(&mut self) -> &mut Emitter;

    fn emit(&mut self, text: &str, position: Option<&Position>) -> Result<String> {
        self.emitter().emit(text, position)
    }

    /// Visit `nodes` in order, emitting `delim` between consecutive ones.
    fn map_visit(&mut self, nodes: &[Node], delim: &str) -> Result<String> {
        let mut buf = String::new();
        for (i, node) in nodes.iter().enumerate() {
            buf.push_str(&self.visit(node)?);
            if !delim.is_empty() && i + 1 < nodes.len() {
                buf.push_str(&self.emit(delim, None)?);
            }
        }
        Ok(buf)
    }

    fn visit(&mut self, node: &Node) -> Result<String> {
        match node {
            Node::Stylesheet(n) => self.stylesheet(n),
            Node::Rule(n) => self.rule(n),
            Node::Declaration(n) => self.declaration(n),
            Node::Comment(n) => self.comment(n),
            Node::Charset(n) => self.charset(n),
            Node::CustomMedia(n) => self.custom_media(n),
            Node::Document(n) => self.document(n),
            Node::FontFace(n) => self.font_face(n),
            Node::Host(n) => self.host(n),
            Node::Import(n) => self.import(n),
            Node::Keyframes(n) => self.keyframes(n),
            Node::Keyframe(n) => self.keyframe(n),
            Node::Media(n) => self.media(n),
            Node::Namespace(n) => self.namespace(n),
            Node::Page(n) => self.page(n),
            Node::Supports(n) => self.supports(n),
        }
    }

    fn stylesheet(&mut self, node: &Stylesheet) -> Result<String>;
    fn rule(&mut self, node: &Rule) -> Result<String>;
    fn declaration(&mut self, node: &Declaration) -> Result<String>;
    fn comment(&mut self, node: &Comment) -> Result<String>;
    fn charset(&mut self, node: &Charset) -> Result<String>;
    fn custom_media(&mut self, node: &CustomMedia) -> Result<String>;
    fn document(&mut self, node: &Document) -> Result<String>;
    fn font_face(&mut self, node: &FontFace) -> Result<String>;
    fn host(&mut self, node: &Host) -> Result<String>;
    fn import(&mut self, node: &Import) -> Result<String>;
    fn keyframes(&mut self, node: &Keyframes) -> Result<String>;
    fn keyframe(&mut self, node: &Keyframe) -> Result<String>;
    fn media(&mut self, node: &Media) -> Result<String>;
    fn namespace(&mut self, node: &Namespace) -> Result<String>;
    fn page(&mut self, node: &Page) -> Result<String>;
    fn supports(&mut self, node: &Supports) -> Result<String>;
}
