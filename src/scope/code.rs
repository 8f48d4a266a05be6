//! Source-code scoping: comments and string literals
//!
//! A small per-language grammar (line comment marker, block comment
//! delimiters, string quotes) drives a single scan over the source.
//! Comments become `text.comment.line.<lang>` / `text.comment.block.<lang>`
//! segments, string literals `text.string.<lang>`. A comment whose body
//! starts with `vale ` is a control directive rather than prose.

use super::{Directive, Segment};
use crate::selector::Selector;

struct Grammar {
    lang: &'static str,
    exts: &'static [&'static str],
    line: &'static str,
    block: Option<(&'static str, &'static str)>,
    quotes: &'static [char],
}

const GRAMMARS: &[Grammar] = &[
    Grammar {
        lang: "rs",
        exts: &["rs"],
        line: "//",
        block: Some(("/*", "*/")),
        quotes: &['"'],
    },
    Grammar {
        lang: "go",
        exts: &["go"],
        line: "//",
        block: Some(("/*", "*/")),
        quotes: &['"', '`'],
    },
    Grammar {
        lang: "c",
        exts: &["c", "h", "cpp", "cc", "hpp", "cs", "java", "swift", "kt", "scala"],
        line: "//",
        block: Some(("/*", "*/")),
        quotes: &['"'],
    },
    Grammar {
        lang: "js",
        exts: &["js", "ts"],
        line: "//",
        block: Some(("/*", "*/")),
        quotes: &['"', '\'', '`'],
    },
    Grammar {
        lang: "py",
        exts: &["py"],
        line: "#",
        block: Some(("\"\"\"", "\"\"\"")),
        quotes: &['\''],
    },
    Grammar {
        lang: "rb",
        exts: &["rb"],
        line: "#",
        block: None,
        quotes: &['"', '\''],
    },
    Grammar {
        lang: "sh",
        exts: &["sh"],
        line: "#",
        block: None,
        quotes: &['"', '\''],
    },
    Grammar {
        lang: "php",
        exts: &["php"],
        line: "//",
        block: Some(("/*", "*/")),
        quotes: &['"', '\''],
    },
];

fn grammar_for(ext: &str) -> Option<&'static Grammar> {
    GRAMMARS.iter().find(|g| g.exts.contains(&ext))
}

/// Extract comment and string segments from source code.
pub fn scope(content: &str, ext: &str) -> (Vec<Segment>, Vec<Directive>) {
    let Some(grammar) = grammar_for(ext) else {
        return (Vec::new(), Vec::new());
    };

    let mut segments = Vec::new();
    let mut directives = Vec::new();
    let bytes = content.as_bytes();
    let mut idx = 0;

    while idx < bytes.len() {
        let rest = &content[idx..];

        if let Some((open, close)) = grammar.block {
            if rest.starts_with(open) {
                let body_start = idx + open.len();
                let body_end = content[body_start..]
                    .find(close)
                    .map(|p| body_start + p)
                    .unwrap_or(content.len());
                push_comment(
                    &mut segments,
                    &mut directives,
                    content,
                    body_start,
                    body_end,
                    &format!("text.comment.block.{}", grammar.lang),
                );
                idx = (body_end + close.len()).min(content.len());
                continue;
            }
        }

        if rest.starts_with(grammar.line) {
            let body_start = idx + grammar.line.len();
            let body_end = content[body_start..]
                .find('\n')
                .map(|p| body_start + p)
                .unwrap_or(content.len());
            push_comment(
                &mut segments,
                &mut directives,
                content,
                body_start,
                body_end,
                &format!("text.comment.line.{}", grammar.lang),
            );
            idx = body_end;
            continue;
        }

        let c = rest.chars().next().unwrap_or('\0');
        if grammar.quotes.contains(&c) || c == '"' {
            let quote = c;
            let body_start = idx + quote.len_utf8();
            let mut end = body_start;
            let mut escaped = false;
            for (off, sc) in content[body_start..].char_indices() {
                if escaped {
                    escaped = false;
                } else if sc == '\\' {
                    escaped = true;
                } else if sc == quote || sc == '\n' {
                    end = body_start + off;
                    break;
                }
                end = body_start + off + sc.len_utf8();
            }
            let text = content[body_start..end].to_string();
            if !text.trim().is_empty() {
                segments.push(Segment {
                    text,
                    selector: Selector::new(&format!("text.string.{}", grammar.lang)),
                    origin: body_start,
                    summary: false,
                });
            }
            idx = (end + quote.len_utf8()).min(content.len());
            continue;
        }

        idx += c.len_utf8().max(1);
    }

    (segments, directives)
}

fn push_comment(
    segments: &mut Vec<Segment>,
    directives: &mut Vec<Directive>,
    content: &str,
    start: usize,
    end: usize,
    selector: &str,
) {
    let raw = &content[start..end];
    let trimmed = raw.trim();
    let lead = raw.len() - raw.trim_start().len();

    if trimmed == "vale off" || trimmed == "vale on" || trimmed.starts_with("vale ") {
        directives.push(Directive {
            offset: start,
            command: trimmed.to_string(),
        });
        return;
    }
    if trimmed.is_empty() {
        return;
    }

    segments.push(Segment {
        text: trimmed.to_string(),
        selector: Selector::new(selector),
        origin: start + lead,
        summary: true,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find<'a>(segments: &'a [Segment], selector: &str) -> &'a Segment {
        segments
            .iter()
            .find(|s| s.selector.value() == selector)
            .unwrap()
    }

    #[test]
    fn test_line_comment() {
        let (segments, _) = scope("let x = 1; // the answer\n", "rs");
        let comment = find(&segments, "text.comment.line.rs");
        assert_eq!(comment.text, "the answer");
        assert_eq!(comment.origin, 14);
    }

    #[test]
    fn test_block_comment() {
        let (segments, _) = scope("/* a block\ncomment */\nfn main() {}\n", "rs");
        let comment = find(&segments, "text.comment.block.rs");
        assert_eq!(comment.text, "a block\ncomment");
    }

    #[test]
    fn test_string_literal() {
        let (segments, _) = scope("let s = \"hello world\";\n", "rs");
        let string = find(&segments, "text.string.rs");
        assert_eq!(string.text, "hello world");
        assert_eq!(string.origin, 9);
    }

    #[test]
    fn test_comment_marker_inside_string() {
        let (segments, _) = scope("let s = \"// not a comment\";\n", "rs");
        assert!(segments
            .iter()
            .all(|s| !s.selector.value().contains("comment")));
    }

    #[test]
    fn test_python_hash_comments() {
        let (segments, _) = scope("x = 1  # tweak later\n", "py");
        let comment = find(&segments, "text.comment.line.py");
        assert_eq!(comment.text, "tweak later");
    }

    #[test]
    fn test_directive_comment() {
        let (segments, directives) = scope("# vale off\nx = 1  # real comment\n", "py");
        assert_eq!(directives.len(), 1);
        assert_eq!(directives[0].command, "vale off");
        // The directive itself is not linted.
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "real comment");
    }

    #[test]
    fn test_escaped_quote() {
        let (segments, _) = scope(r#"let s = "say \"hi\" twice";"#, "rs");
        let string = find(&segments, "text.string.rs");
        assert_eq!(string.text, r#"say \"hi\" twice"#);
    }

    #[test]
    fn test_unknown_language() {
        let (segments, directives) = scope("anything", "zig");
        assert!(segments.is_empty());
        assert!(directives.is_empty());
    }
}
