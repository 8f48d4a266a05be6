//! Markdown scoping via the comrak AST
//!
//! Each block node becomes one segment (headings, paragraphs, list items,
//! blockquotes, code blocks, table cells), and inline runs (emphasis,
//! strong, links, code spans) get segments of their own. Inline code maps
//! to the `code` scope and fenced blocks to `pre`, so the configured
//! skipped/ignored scope lists apply to Markdown the same way they apply
//! to HTML.

use super::Segment;
use crate::config::Config;
use crate::selector::Selector;
use comrak::nodes::{AstNode, NodeValue};
use comrak::{parse_document, Arena, ComrakOptions};

pub fn scope(content: &str, config: &Config) -> Vec<Segment> {
    let arena = Arena::new();
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;

    let root = parse_document(&arena, content, &options);
    let mut walker = Walker {
        config,
        offsets: line_offsets(content),
        segments: Vec::new(),
    };
    walker.walk(root, "text");
    walker.segments
}

/// Byte offset of the start of each 1-based line.
fn line_offsets(content: &str) -> Vec<usize> {
    let mut offsets = vec![0];
    for (idx, b) in content.bytes().enumerate() {
        if b == b'\n' {
            offsets.push(idx + 1);
        }
    }
    offsets
}

struct Walker<'a> {
    config: &'a Config,
    offsets: Vec<usize>,
    segments: Vec<Segment>,
}

impl<'a> Walker<'a> {
    fn skipped(&self, tag: &str) -> bool {
        self.config.skipped_scopes.iter().any(|s| s == tag)
    }

    fn ignored(&self, tag: &str) -> bool {
        self.config.ignored_scopes.iter().any(|s| s == tag)
    }

    fn origin_of<'b>(&self, node: &'b AstNode<'b>, fallback: usize) -> usize {
        let pos = node.data.borrow().sourcepos.start;
        if pos.line == 0 {
            return fallback;
        }
        self.offsets
            .get(pos.line - 1)
            .map(|base| base + pos.column.saturating_sub(1))
            .unwrap_or(fallback)
    }

    fn push(&mut self, text: String, selector: &str, origin: usize, summary: bool) {
        self.segments.push(Segment {
            text,
            selector: Selector::new(selector),
            origin,
            summary,
        });
    }

    fn walk<'b>(&mut self, node: &'b AstNode<'b>, ctx: &str) {
        for child in node.children() {
            let value = child.data.borrow().value.clone();
            match value {
                NodeValue::Heading(heading) => {
                    let origin = self.origin_of(child, 0);
                    let text = self.inline_text(child);
                    self.push(text, &format!("text.heading.h{}", heading.level), origin, true);
                    self.emit_inline(child, origin);
                }
                NodeValue::Paragraph => {
                    let origin = self.origin_of(child, 0);
                    let text = self.inline_text(child);
                    self.push(text, ctx, origin, true);
                    self.emit_inline(child, origin);
                }
                NodeValue::BlockQuote => self.walk(child, "text.blockquote"),
                NodeValue::Item(_) | NodeValue::TaskItem(_) => self.walk(child, "text.list"),
                NodeValue::CodeBlock(block) => {
                    if self.skipped("pre") {
                        continue;
                    }
                    let origin = self.origin_of(child, 0);
                    let text = if self.ignored("pre") {
                        String::new()
                    } else {
                        block.literal.trim_end().to_string()
                    };
                    self.push(text, "text.code.block", origin, false);
                }
                NodeValue::TableCell => {
                    let origin = self.origin_of(child, 0);
                    let text = self.inline_text(child);
                    self.push(text, "text.table.cell", origin, true);
                }
                _ => self.walk(child, ctx),
            }
        }
    }

    /// The node's inline text with markup stripped. Skipped and ignored
    /// code spans contribute nothing, so a rule scoped to the enclosing
    /// block never sees their content.
    fn inline_text<'b>(&self, node: &'b AstNode<'b>) -> String {
        let mut out = String::new();
        self.gather(node, &mut out);
        out
    }

    fn gather<'b>(&self, node: &'b AstNode<'b>, out: &mut String) {
        for child in node.children() {
            match &child.data.borrow().value {
                NodeValue::Text(text) => out.push_str(text),
                NodeValue::Code(code) => {
                    if !self.skipped("code") && !self.ignored("code") {
                        out.push_str(&code.literal);
                    }
                }
                NodeValue::SoftBreak | NodeValue::LineBreak => out.push('\n'),
                _ => self.gather(child, out),
            }
        }
    }

    /// Emit segments for the inline runs inside one block node.
    fn emit_inline<'b>(&mut self, node: &'b AstNode<'b>, block_origin: usize) {
        for child in node.children() {
            let origin = self.origin_of(child, block_origin);
            match &child.data.borrow().value {
                NodeValue::Emph => {
                    let text = self.inline_text(child);
                    self.push(text, "text.emphasis", origin, false);
                }
                NodeValue::Strong => {
                    let text = self.inline_text(child);
                    self.push(text, "text.strong", origin, false);
                }
                NodeValue::Code(code) => {
                    if self.skipped("code") {
                        continue;
                    }
                    let text = if self.ignored("code") {
                        String::new()
                    } else {
                        code.literal.clone()
                    };
                    self.push(text, "text.code.inline", origin, false);
                }
                NodeValue::Link(link) => {
                    let text = self.inline_text(child);
                    self.push(text, "text.link", origin, false);
                    self.push(link.url.clone(), "text.attr.href", origin, false);
                }
                NodeValue::Image(image) => {
                    let alt = self.inline_text(child);
                    self.push(alt, "text.attr.alt", origin, false);
                    self.push(image.url.clone(), "text.attr.src", origin, false);
                }
                _ => self.emit_inline(child, origin),
            }
        }
    }
}
