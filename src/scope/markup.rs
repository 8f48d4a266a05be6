//! HTML/XML scoping via a parsed element tree
//!
//! Walks well-formed markup and emits one segment per block-level element,
//! plus segments for inline runs and the linted attributes (`alt`,
//! `title`, `href`, `src`). `skipped_scopes` elements disappear entirely;
//! `ignored_scopes` elements and `ignored_classes` members stay in the
//! tree but contribute empty segments.

use super::Segment;
use crate::config::Config;
use crate::selector::Selector;
use roxmltree::{Document, Node};

/// Parse and walk `content`. A parse failure bubbles up so the caller can
/// demote the file to plain prose.
pub fn scope(content: &str, config: &Config) -> Result<Vec<Segment>, roxmltree::Error> {
    let doc = Document::parse(content)?;
    let mut walker = Walker {
        config,
        segments: Vec::new(),
    };
    walker.walk(doc.root(), "");
    Ok(walker.segments)
}

struct Walker<'a> {
    config: &'a Config,
    segments: Vec<Segment>,
}

fn block_selector(tag: &str, ctx: &str) -> Option<String> {
    match tag {
        "p" => Some(match ctx {
            "list" => "text.list".to_string(),
            "blockquote" => "text.blockquote".to_string(),
            _ => "text".to_string(),
        }),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => Some(format!("text.heading.{}", tag)),
        "td" | "th" => Some("text.table.cell".to_string()),
        _ => None,
    }
}

impl<'a> Walker<'a> {
    fn skipped(&self, node: &Node) -> bool {
        let tag = node.tag_name().name().to_lowercase();
        self.config.skipped_scopes.iter().any(|s| *s == tag)
    }

    fn ignored(&self, node: &Node) -> bool {
        let tag = node.tag_name().name().to_lowercase();
        if self.config.ignored_scopes.iter().any(|s| *s == tag) {
            return true;
        }
        node.attribute("class").is_some_and(|classes| {
            classes
                .split_whitespace()
                .any(|c| self.config.ignored_classes.iter().any(|i| i == c))
        })
    }

    fn push(&mut self, text: String, selector: &str, origin: usize, summary: bool) {
        self.segments.push(Segment {
            text,
            selector: Selector::new(selector),
            origin,
            summary,
        });
    }

    fn push_attrs(&mut self, node: &Node) {
        let origin = node.range().start;
        for (attr, selector) in [
            ("alt", "text.attr.alt"),
            ("title", "text.attr.title"),
            ("href", "text.attr.href"),
            ("src", "text.attr.src"),
        ] {
            if let Some(value) = node.attribute(attr) {
                self.push(value.to_string(), selector, origin, false);
            }
        }
    }

    /// Concatenated text of a node, excluding skipped/ignored descendants.
    fn gather(&self, node: &Node, out: &mut String) {
        for child in node.children() {
            if child.is_text() {
                out.push_str(child.text().unwrap_or(""));
            } else if child.is_element() && !self.skipped(&child) && !self.ignored(&child) {
                self.gather(&child, out);
            }
        }
    }

    fn text_of(&self, node: &Node) -> String {
        let mut out = String::new();
        self.gather(node, &mut out);
        out.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn origin_of(&self, node: &Node) -> usize {
        // Prefer the first text child so the segment's origin points at
        // prose rather than at the opening tag.
        node.children()
            .find(|c| c.is_text() && c.text().is_some_and(|t| !t.trim().is_empty()))
            .map(|c| {
                let range = c.range();
                let text = c.text().unwrap_or("");
                let lead = text.len() - text.trim_start().len();
                range.start + lead
            })
            .unwrap_or_else(|| node.range().start)
    }

    fn walk(&mut self, node: Node, ctx: &str) {
        for child in node.children() {
            if !child.is_element() {
                continue;
            }
            if self.skipped(&child) {
                continue;
            }

            let tag = child.tag_name().name().to_lowercase();
            let ignored = self.ignored(&child);
            self.push_attrs(&child);

            if let Some(selector) = block_selector(&tag, ctx) {
                let text = if ignored {
                    String::new()
                } else {
                    self.text_of(&child)
                };
                let origin = self.origin_of(&child);
                self.push(text, &selector, origin, true);
                self.emit_inline(&child);
                continue;
            }

            match tag.as_str() {
                "head" => {}
                "li" => {
                    self.walk(child, "list");
                    if !has_block_child(&child) {
                        let text = if ignored { String::new() } else { self.text_of(&child) };
                        self.push(text, "text.list", self.origin_of(&child), true);
                        self.emit_inline(&child);
                    }
                }
                "blockquote" => {
                    self.walk(child, "blockquote");
                    if !has_block_child(&child) {
                        let text = if ignored { String::new() } else { self.text_of(&child) };
                        self.push(text, "text.blockquote", self.origin_of(&child), true);
                    }
                }
                "pre" => {
                    let text = if ignored { String::new() } else { self.text_of(&child) };
                    self.push(text, "text.code.block", self.origin_of(&child), false);
                }
                "code" | "tt" => {
                    let text = if ignored { String::new() } else { self.text_of(&child) };
                    self.push(text, "text.code.inline", self.origin_of(&child), false);
                }
                _ => self.walk(child, ctx),
            }
        }
    }

    /// Segments for the inline runs directly inside a block element.
    fn emit_inline(&mut self, node: &Node) {
        for child in node.children() {
            if !child.is_element() || self.skipped(&child) {
                continue;
            }
            let ignored = self.ignored(&child);
            let tag = child.tag_name().name().to_lowercase();
            let selector = match tag.as_str() {
                "em" | "i" => Some("text.emphasis"),
                "strong" | "b" => Some("text.strong"),
                "a" => Some("text.link"),
                "code" | "tt" => Some("text.code.inline"),
                _ => None,
            };
            self.push_attrs(&child);
            if let Some(selector) = selector {
                let text = if ignored { String::new() } else { self.text_of(&child) };
                self.push(text, selector, self.origin_of(&child), false);
            }
        }
    }
}

fn has_block_child(node: &Node) -> bool {
    node.children().any(|c| {
        c.is_element()
            && matches!(
                c.tag_name().name().to_lowercase().as_str(),
                "p" | "ul" | "ol" | "blockquote" | "pre" | "table"
            )
    })
}
