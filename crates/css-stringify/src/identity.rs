/*
 * identity.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Identity strategy: readable output, one declaration per line.

use crate::ast::{
    Charset, Comment, CustomMedia, Declaration, Document, FontFace, Host, Import, Keyframe,
    Keyframes, Media, Namespace, Node, Page, Position, Rule, Stylesheet, Supports,
};
use crate::compiler::Compiler;
use crate::error::Result;
use crate::options::StringifyOptions;
use crate::strategy::{Emitter, Render};

#[derive(Debug)]
pub struct Identity {
    options: StringifyOptions,
    emitter: Emitter,
    indentation: String,
    /// Nesting depth; top-level nodes render at level 1 with no indent
    level: usize,
}

impl Identity {
    pub fn new(options: StringifyOptions) -> Self {
        let indentation = options.indentation().to_string();
        Self {
            options,
            emitter: Emitter::new(),
            indentation,
            level: 1,
        }
    }

    pub fn options(&self) -> &StringifyOptions {
        &self.options
    }

    fn indent(&self) -> String {
        self.indentation.repeat(self.level.saturating_sub(1))
    }

    fn nest(&mut self) {
        self.level += 1;
    }

    fn unnest(&mut self) {
        self.level = self.level.saturating_sub(1).max(1);
    }

    /// `header {` block of nested rules separated by blank lines
    fn rule_block(
        &mut self,
        header: &str,
        position: Option<&Position>,
        open: &str,
        rules: &[Node],
    ) -> Result<String> {
        let mut out = self.emit(header, position)?;
        out += &self.emit(open, None)?;
        self.nest();
        out += &self.map_visit(rules, "\n\n")?;
        self.unnest();
        out += &self.emit("\n}", None)?;
        Ok(out)
    }

    /// `header{` block of declarations, one per line
    fn declaration_block(
        &mut self,
        header: &str,
        position: Option<&Position>,
        declarations: &[Node],
    ) -> Result<String> {
        let mut out = self.emit(header, position)?;
        out += &self.emit("{\n", None)?;
        self.nest();
        out += &self.map_visit(declarations, "\n")?;
        self.unnest();
        out += &self.emit("\n}", None)?;
        Ok(out)
    }
}

impl Render for Identity {
    fn render(&mut self, node: &Node) -> Result<String> {
        // A failed render can leave the nesting depth raised
        self.level = 1;
        self.visit(node)
    }

    fn emitter_mut(&mut self) -> &mut Emitter {
        &mut self.emitter
    }
}

impl Compiler for Identity {
    fn emitter(&mut self) -> &mut Emitter {
        &mut self.emitter
    }

    fn stylesheet(&mut self, node: &Stylesheet) -> Result<String> {
        self.map_visit(&node.stylesheet.rules, "\n\n")
    }

    fn comment(&mut self, node: &Comment) -> Result<String> {
        let text = format!("{}/*{}*/", self.indent(), node.comment);
        self.emit(&text, node.position.as_ref())
    }

    fn import(&mut self, node: &Import) -> Result<String> {
        self.emit(&format!("@import {};", node.import), node.position.as_ref())
    }

    fn media(&mut self, node: &Media) -> Result<String> {
        let header = format!("@media {}", node.media);
        self.rule_block(&header, node.position.as_ref(), " {\n", &node.rules)
    }

    fn document(&mut self, node: &Document) -> Result<String> {
        let header = format!(
            "@{}document {}",
            node.vendor.as_deref().unwrap_or_default(),
            node.document
        );
        self.rule_block(&header, node.position.as_ref(), "  {\n", &node.rules)
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
        self.rule_block(&header, node.position.as_ref(), " {\n", &node.rules)
    }

    fn keyframes(&mut self, node: &Keyframes) -> Result<String> {
        let header = format!(
            "@{}keyframes {}",
            node.vendor.as_deref().unwrap_or_default(),
            node.name
        );
        let mut out = self.emit(&header, node.position.as_ref())?;
        out += &self.emit(" {\n", None)?;
        self.nest();
        out += &self.map_visit(&node.keyframes, "\n")?;
        self.unnest();
        out += &self.emit("}", None)?;
        Ok(out)
    }

    fn keyframe(&mut self, node: &Keyframe) -> Result<String> {
        let indent = self.indent();
        let mut out = self.emit(&indent, None)?;
        out += &self.emit(&node.values.join(", "), node.position.as_ref())?;
        out += &self.emit(" {\n", None)?;
        self.nest();
        out += &self.map_visit(&node.declarations, "\n")?;
        self.unnest();
        let close = format!("\n{}}}\n", self.indent());
        out += &self.emit(&close, None)?;
        Ok(out)
    }

    fn page(&mut self, node: &Page) -> Result<String> {
        let header = if node.selectors.is_empty() {
            "@page ".to_string()
        } else {
            format!("@page {} ", node.selectors.join(", "))
        };
        self.declaration_block(&header, node.position.as_ref(), &node.declarations)
    }

    fn font_face(&mut self, node: &FontFace) -> Result<String> {
        self.declaration_block("@font-face ", node.position.as_ref(), &node.declarations)
    }

    fn host(&mut self, node: &Host) -> Result<String> {
        self.rule_block("@host", node.position.as_ref(), " {\n", &node.rules)
    }

    fn custom_media(&mut self, node: &CustomMedia) -> Result<String> {
        self.emit(
            &format!("@custom-media {} {};", node.name, node.media),
            node.position.as_ref(),
        )
    }

    fn rule(&mut self, node: &Rule) -> Result<String> {
        let indent = self.indent();
        if node.declarations.is_empty() {
            return Ok(String::new());
        }

        let selectors = node
            .selectors
            .iter()
            .map(|selector| format!("{}{}", indent, selector))
            .collect::<Vec<_>>()
            .join(",\n");

        let mut out = self.emit(&selectors, node.position.as_ref())?;
        out += &self.emit(" {\n", None)?;
        self.nest();
        out += &self.map_visit(&node.declarations, "\n")?;
        self.unnest();
        let close = format!("\n{}}}", self.indent());
        out += &self.emit(&close, None)?;
        Ok(out)
    }

    fn declaration(&mut self, node: &Declaration) -> Result<String> {
        let indent = self.indent();
        let mut out = self.emit(&indent, None)?;
        out += &self.emit(
            &format!("{}: {}", node.property, node.value),
            node.position.as_ref(),
        )?;
        out += &self.emit(";", None)?;
        Ok(out)
    }
}
