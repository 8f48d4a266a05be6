//! Plain-prose scoping: one segment per blank-line-separated paragraph.

use super::Segment;
use crate::selector::Selector;

/// Split content into paragraph segments with selector `text`.
pub fn scope(content: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut start = None;
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        if line.trim().is_empty() {
            if let Some(begin) = start.take() {
                push_paragraph(&mut segments, content, begin, offset);
            }
        } else if start.is_none() {
            start = Some(offset);
        }
        offset += line.len();
    }
    if let Some(begin) = start {
        push_paragraph(&mut segments, content, begin, content.len());
    }

    segments
}

fn push_paragraph(segments: &mut Vec<Segment>, content: &str, begin: usize, end: usize) {
    let text = content[begin..end].trim_end().to_string();
    if !text.is_empty() {
        segments.push(Segment {
            text,
            selector: Selector::new("text"),
            origin: begin,
            summary: true,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_paragraph() {
        let segments = scope("Just one paragraph here.");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "Just one paragraph here.");
        assert_eq!(segments[0].origin, 0);
        assert_eq!(segments[0].selector.value(), "text");
    }

    #[test]
    fn test_blank_line_separation() {
        let segments = scope("First paragraph.\n\nSecond one\nspans two lines.\n");
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "First paragraph.");
        assert_eq!(segments[1].text, "Second one\nspans two lines.");
        assert_eq!(segments[1].origin, 18);
    }

    #[test]
    fn test_whitespace_only_lines_separate() {
        let segments = scope("a\n   \nb");
        assert_eq!(segments.len(), 2);
    }

    #[test]
    fn test_empty_content() {
        assert!(scope("").is_empty());
        assert!(scope("\n\n\n").is_empty());
    }
}
