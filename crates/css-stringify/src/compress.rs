/*
 * compress.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Compressed strategy: no optional whitespace, comments dropped.

use crate::ast::{
    Charset, Comment, CustomMedia, Declaration, Document, FontFace, Host, Import, Keyframe,
    Keyframes, Media, Namespace, Node, Page, Position, Rule, Stylesheet, Supports,
};
use crate::compiler::Compiler;
use crate::error::Result;
use crate::options::StringifyOptions;
use crate::strategy::{Emitter, Render};

#[derive(Debug)]
pub struct Compressed {
    options: StringifyOptions,
    emitter: Emitter,
}

impl Compressed {
    pub fn new(options: StringifyOptions) -> Self {
        Self {
            options,
            emitter: Emitter::new(),
        }
    }

    pub fn options(&self) -> &StringifyOptions {
        &self.options
    }

    /// `header{children}` with no separators between children
    fn block(
        &mut self,
        header: &str,
        position: Option<&Position>,
        children: &[Node],
    ) -> Result<String> {
        let mut out = self.emit(header, position)?;
        out += &self.emit("{", None)?;
        out += &self.map_visit(children, "")?;
        out += &self.emit("}", None)?;
        Ok(out)
    }
}

impl Render for Compressed {
    fn render(&mut self, node: &Node) -> Result<String> {
        self.visit(node)
    }

    fn emitter_mut(&mut self) -> &mut Emitter {
        &mut self.emitter
    }
}

impl Compiler for Compressed {
    fn emitter(&mut self) -> &mut Emitter {
        &mut self.emitter
    }

    fn stylesheet(&mut self, node: &Stylesheet) -> Result<String> {
        self.map_visit(&node.stylesheet.rules, "")
    }

    // Comments vanish, but still anchor a mapping
    fn comment(&mut self, node: &Comment) -> Result<String> {
        self.emit("", node.position.as_ref())
    }

    fn import(&mut self, node: &Import) -> Result<String> {
        self.emit(&format!("@import {};", node.import), node.position.as_ref())
    }

    fn media(&mut self, node: &Media) -> Result<String> {
        let header = format!("@media {}", node.media);
        self.block(&header, node.position.as_ref(), &node.rules)
    }

    fn document(&mut self, node: &Document) -> Result<String> {
        let header = format!(
            "@{}document {}",
            node.vendor.as_deref().unwrap_or_default(),
            node.document
        );
        self.block(&header, node.position.as_ref(), &node.rules)
    }

    fn charset(&mut self, node: &Charset) -> Result<String> {
        self.emit(&format!("@charset {};", node.charset), node.position.as_ref())
    }

    fn namespace(&mut self, node: &Namespace) -> Result<String> {
        self.emit(
            &format!("@namespace {};", node.namespace),
            node.position.as_ref(),
        )
    }

    fn supports(&mut self, node: &Supports) -> Result<String> {
        let header = format!("@supports {}", node.supports);
        self.block(&header, node.position.as_ref(), &node.rules)
    }

    fn keyframes(&mut self, node: &Keyframes) -> Result<String> {
        let header = format!(
            "@{}keyframes {}",
            node.vendor.as_deref().unwrap_or_default(),
            node.name
        );
        self.block(&header, node.position.as_ref(), &node.keyframes)
    }

    fn keyframe(&mut self, node: &Keyframe) -> Result<String> {
        let header = node.values.join(",");
        self.block(&header, node.position.as_ref(), &node.declarations)
    }

    fn page(&mut self, node: &Page) -> Result<String> {
        let header = format!("@page {}", node.selectors.join(", "));
        self.block(&header, node.position.as_ref(), &node.declarations)
    }

    fn font_face(&mut self, node: &FontFace) -> Result<String> {
        self.block("@font-face", node.position.as_ref(), &node.declarations)
    }

    fn host(&mut self, node: &Host) -> Result<String> {
        self.block("@host", node.position.as_ref(), &node.rules)
    }

    fn custom_media(&mut self, node: &CustomMedia) -> Result<String> {
        self.emit(
            &format!("@custom-media {} {};", node.name, node.media),
            node.position.as_ref(),
        )
    }

    fn rule(&mut self, node: &Rule) -> Result<String> {
        if node.declarations.is_empty() {
            return Ok(String::new());
        }
        let header = node.selectors.join(",");
        self.block(&header, node.position.as_ref(), &node.declarations)
    }

    fn declaration(&mut self, node: &Declaration) -> Result<String> {
        let mut out = self.emit(
            &format!("{}:{}", node.property, node.value),
            node.position.as_ref(),
        )?;
        out += &self.emit(";", None)?;
        Ok(out)
    }
}
