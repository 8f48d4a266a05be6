//! The scoped document pipeline
//!
//! Converts raw source in several markup dialects into a sequence of
//! scoped text segments, each tagged with a selector path and the byte
//! offset it came from. Block and token ignores are blanked out of the
//! working copy first (length-preserving, so every offset survives), and
//! in-text comment directives are collected for the dispatcher.

pub mod code;
pub mod markdown;
pub mod markup;
pub mod prose;

use crate::config::{Config, SectionView};
use crate::file::{File, Format};
use crate::selector::Selector;
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use std::process::Command;

/// A scoped text segment.
#[derive(Debug, Clone)]
pub struct Segment {
    /// The scope-local text, possibly transformed (markup stripped)
    pub text: String,

    /// The selector path identifying this scope
    pub selector: Selector,

    /// Byte offset in the normalized source where this segment begins
    pub origin: usize,

    /// Whether the text joins the document summary
    pub summary: bool,
}

/// An in-text comment directive (`vale off`, `vale Style.Rule = NO`).
#[derive(Debug, Clone)]
pub struct Directive {
    /// Byte offset where the directive takes effect
    pub offset: usize,

    /// The directive body, including the `vale` keyword
    pub command: String,
}

/// The scoper's output for one file.
#[derive(Debug, Default)]
pub struct Scoped {
    pub segments: Vec<Segment>,
    pub directives: Vec<Directive>,
}

static HTML_COMMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--\s*(vale .*?)\s*-->").unwrap());

/// Replace every char of each pattern match with `placeholder`, keeping
/// newlines and byte lengths so offsets into the source stay valid.
fn blank_matches(content: &mut String, patterns: &[String], placeholder: char) {
    for pattern in patterns {
        let re = match Regex::new(pattern) {
            Ok(re) => re,
            Err(e) => {
                warn!("bad ignore pattern '{}': {}", pattern, e);
                continue;
            }
        };

        let ranges: Vec<(usize, usize)> = re
            .find_iter(content)
            .map(|m| (m.start(), m.end()))
            .collect();
        for (start, end) in ranges {
            let blanked: String = content[start..end]
                .chars()
                .map(|c| {
                    if c == '\n' {
                        "\n".to_string()
                    } else {
                        placeholder.to_string().repeat(c.len_utf8())
                    }
                })
                .collect();
            content.replace_range(start..end, &blanked);
        }
    }
}

fn collect_directives(content: &str) -> Vec<Directive> {
    HTML_COMMENT_RE
        .captures_iter(content)
        .filter_map(|caps| {
            let m = caps.get(1)?;
            Some(Directive {
                offset: caps.get(0)?.start(),
                command: m.as_str().to_string(),
            })
        })
        .collect()
}

fn run_transform(command: &str, path: &std::path::Path) -> Option<String> {
    let mut parts = command.split_whitespace();
    let program = parts.next()?;
    let output = Command::new(program)
        .args(parts)
        .arg(path)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout).ok()
}

/// Produce the scoped segments and directives for one file.
pub fn scope(file: &File, config: &Config, section: &SectionView) -> Scoped {
    let mut content = file.content.clone();
    blank_matches(&mut content, &section.block_ignores, ' ');
    blank_matches(&mut content, &section.token_ignores, '*');

    let mut scoped = Scoped {
        directives: collect_directives(&content),
        ..Scoped::default()
    };

    if file.simple {
        scoped.segments = prose::scope(&content);
        return scoped;
    }

    match file.format {
        Format::Prose => scoped.segments = prose::scope(&content),
        Format::Code => {
            let (segments, directives) = code::scope(&content, &file.normed_ext);
            scoped.segments = segments;
            scoped.directives.extend(directives);
            scoped.directives.sort_by_key(|d| d.offset);
        }
        Format::Markup => match file.normed_ext.as_str() {
            "md" => scoped.segments = markdown::scope(&content, config),
            "html" | "xml" | "dita" => match markup::scope(&content, config) {
                Ok(segments) => scoped.segments = segments,
                Err(e) => {
                    warn!("{}: {}; linting as prose", file.path.display(), e);
                    scoped.segments = prose::scope(&content);
                }
            },
            // Formats without a native parser go through the transform
            // command when one is configured.
            _ => {
                let transformed = file
                    .transform
                    .as_deref()
                    .and_then(|cmd| run_transform(cmd, &file.path));
                match transformed {
                    Some(html) => match markup::scope(&html, config) {
                        Ok(segments) => {
                            // Transformed output has its own geometry; the
                            // localizer falls back to searching the source.
                            scoped.segments = segments;
                        }
                        Err(e) => {
                            warn!("{}: {}; linting as prose", file.path.display(), e);
                            scoped.segments = prose::scope(&content);
                        }
                    },
                    None => {
                        warn!(
                            "{}: no transform for '{}'; linting as prose",
                            file.path.display(),
                            file.normed_ext
                        );
                        scoped.segments = prose::scope(&content);
                    }
                }
            }
        },
    }

    scoped
}
