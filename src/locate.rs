//! Alert localization
//!
//! A rule reports matches as byte offsets within the (possibly transformed)
//! text of one segment. This module maps them back to a line and rune-column
//! span in the original source.
//!
//! Three strategies, in order:
//!
//! 1. Direct mapping: when the matched region sits verbatim in the source at
//!    the segment's origin, the absolute position is `origin + offset`.
//! 2. Context search: otherwise the match text is searched for in a
//!    per-check copy of the source. Each located occurrence is blanked out
//!    in that copy so a repeated match finds the next occurrence instead of
//!    re-reporting the first.
//! 3. Fuzzy lookup: a bigram index over the file's lines picks the closest
//!    line, and the match's first word anchors the column. If that also
//!    fails, the alert is dropped.

use crate::alert::Alert;
use crate::file::File;
use crate::scope::Segment;
use std::collections::HashSet;

/// Precomputed bigram sets for each line of a file.
pub struct LineIndex {
    bigrams: Vec<HashSet<(char, char)>>,
}

impl LineIndex {
    /// Build an index over the given lines.
    pub fn new(lines: &[String]) -> Self {
        Self {
            bigrams: lines.iter().map(|l| bigram_set(l)).collect(),
        }
    }

    /// The 1-based line whose bigram set is closest to `needle`, if any
    /// line clears the similarity floor.
    pub fn closest(&self, needle: &str) -> Option<usize> {
        let target = bigram_set(needle);
        if target.is_empty() {
            return None;
        }

        let mut best = 0.0f64;
        let mut best_idx = None;
        for (idx, set) in self.bigrams.iter().enumerate() {
            if set.is_empty() {
                continue;
            }
            let overlap = set.intersection(&target).count();
            let score = (2.0 * overlap as f64) / ((set.len() + target.len()) as f64);
            if score > best {
                best = score;
                best_idx = Some(idx + 1);
            }
        }

        if best >= 0.3 {
            best_idx
        } else {
            None
        }
    }
}

fn bigram_set(text: &str) -> HashSet<(char, char)> {
    let chars: Vec<char> = text.to_lowercase().chars().collect();
    chars.windows(2).map(|w| (w[0], w[1])).collect()
}

/// Convert an absolute byte offset to a (1-based line, 1-based rune column).
fn to_line_col(lines: &[String], abs: usize) -> Option<(usize, usize)> {
    let mut consumed = 0;
    for (idx, line) in lines.iter().enumerate() {
        let end = consumed + line.len();
        if abs < end || (abs == end && idx + 1 == lines.len()) {
            let offset = abs - consumed;
            let col = line.get(..offset)?.chars().count() + 1;
            return Some((idx + 1, col));
        }
        consumed = end;
    }
    None
}

/// Replace a located occurrence with `#` so the next search for the same
/// text lands on the following occurrence. Newlines are kept so offsets
/// and line structure survive.
fn blank_region(ctx: &mut String, start: usize, len: usize) {
    let region: String = ctx[start..start + len]
        .chars()
        .map(|c| {
            if c == '\n' {
                "\n".to_string()
            } else {
                "#".repeat(c.len_utf8())
            }
        })
        .collect();
    ctx.replace_range(start..start + len, &region);
}

/// Resolve `alert`'s scope-local span into file-absolute coordinates.
///
/// Returns `false` when the match cannot be located; the caller drops the
/// alert in that case.
pub fn locate(file: &mut File, segment: &Segment, alert: &mut Alert) -> bool {
    // Whole-scope alerts (capitalization, readability) may span several
    // lines; anchor them to their first non-empty line instead.
    let needle = alert
        .match_text
        .lines()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("")
        .to_string();
    if needle.is_empty() {
        return false;
    }

    let origin = segment.origin.min(file.content.len());
    let local = if alert.match_text.len() == needle.len() {
        alert.span[0]
    } else {
        // The anchor line's offset within the original match.
        alert.span[0]
            + alert
                .match_text
                .find(needle.as_str())
                .unwrap_or(0)
    };

    // 1. Direct mapping.
    let abs = origin + local;
    if file
        .content
        .get(abs..abs + needle.len())
        .is_some_and(|region| region == needle)
    {
        return finish(file, alert, abs, &needle);
    }

    // 2. Context search, from the segment's origin first.
    if !file.contexts.contains_key(&alert.check) {
        let snapshot = file.content.clone();
        file.contexts.insert(alert.check.clone(), snapshot);
    }
    let found = match file.contexts.get_mut(&alert.check) {
        Some(ctx) => {
            let found = ctx
                .get(origin..)
                .and_then(|tail| tail.find(needle.as_str()).map(|i| origin + i))
                .or_else(|| ctx.find(needle.as_str()));
            if let Some(abs) = found {
                blank_region(ctx, abs, needle.len());
            }
            found
        }
        None => None,
    };
    if let Some(abs) = found {
        return finish(file, alert, abs, &needle);
    }

    // 3. Fuzzy lookup over the file's lines.
    let index = LineIndex::new(&file.lines);
    if let Some(line) = index.closest(&needle) {
        let anchor = needle.split_whitespace().next().unwrap_or(&needle);
        if let Some(col_byte) = file.lines[line - 1].find(anchor) {
            let col = file.lines[line - 1][..col_byte].chars().count() + 1;
            let extent = file.lines[line - 1].chars().count();
            alert.line = line;
            alert.span = [col, (col + needle.chars().count()).min(extent + 1)];
            alert.match_text = needle;
            return true;
        }
    }

    false
}

fn finish(file: &File, alert: &mut Alert, abs: usize, needle: &str) -> bool {
    let Some((line, col)) = to_line_col(&file.lines, abs) else {
        return false;
    };
    let extent = file.lines[line - 1].chars().count();
    alert.line = line;
    alert.span = [col, (col + needle.chars().count()).min(extent + 1)];
    if alert.match_text != needle {
        alert.match_text = needle.to_string();
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::Severity;
    use crate::config::Config;
    use crate::selector::Selector;

    fn make_file(content: &str) -> File {
        File::from_string(content, ".txt", &Config::new())
    }

    fn make_segment(text: &str, origin: usize) -> Segment {
        Segment {
            text: text.to_string(),
            selector: Selector::new("text"),
            origin,
            summary: false,
        }
    }

    fn make_alert(match_text: &str, span: [usize; 2]) -> Alert {
        let mut alert = Alert::new("Test.Rule", Severity::Warning, "msg");
        alert.match_text = match_text.to_string();
        alert.span = span;
        alert
    }

    #[test]
    fn test_direct_mapping() {
        let mut file = make_file("one two three\nfour five\n");
        let segment = make_segment("four five", 14);
        let mut alert = make_alert("five", [5, 9]);

        assert!(locate(&mut file, &segment, &mut alert));
        assert_eq!(alert.line, 2);
        assert_eq!(alert.span, [6, 10]);
    }

    #[test]
    fn test_search_fallback() {
        // Segment text was transformed (markup stripped), so the direct
        // mapping misses and the search path takes over.
        let mut file = make_file("my *smart* phone\n");
        let segment = make_segment("my smart phone", 0);
        let mut alert = make_alert("smart", [3, 8]);

        assert!(locate(&mut file, &segment, &mut alert));
        assert_eq!(alert.line, 1);
        assert_eq!(alert.span, [5, 10]);
    }

    #[test]
    fn test_repeated_match_blanking() {
        let mut file = make_file("foo bar foo\n");
        let segment = make_segment("**foo** bar **foo**", 0);

        let mut first = make_alert("foo", [2, 5]);
        assert!(locate(&mut file, &segment, &mut first));
        assert_eq!(first.span, [1, 4]);

        let mut second = make_alert("foo", [14, 17]);
        assert!(locate(&mut file, &segment, &mut second));
        assert_eq!(second.span, [9, 12]);
    }

    #[test]
    fn test_unicode_columns() {
        let mut file = make_file("naïve test\n");
        let segment = make_segment("naïve test", 0);
        let mut alert = make_alert("test", [7, 11]);

        assert!(locate(&mut file, &segment, &mut alert));
        assert_eq!(alert.line, 1);
        // "naïve " is six runes, so the match starts at column 7.
        assert_eq!(alert.span, [7, 11]);
    }

    #[test]
    fn test_unlocatable_dropped() {
        let mut file = make_file("completely different content\n");
        let segment = make_segment("zzz qqq xxx", 0);
        let mut alert = make_alert("qqq", [4, 7]);

        assert!(!locate(&mut file, &segment, &mut alert));
    }

    #[test]
    fn test_multiline_match_anchors_first_line() {
        let mut file = make_file("alpha beta\ngamma delta\n");
        let segment = make_segment("alpha beta\ngamma delta", 0);
        let mut alert = make_alert("alpha beta\ngamma delta", [0, 22]);

        assert!(locate(&mut file, &segment, &mut alert));
        assert_eq!(alert.line, 1);
        assert_eq!(alert.span[0], 1);
        assert_eq!(alert.match_text, "alpha beta");
    }

    #[test]
    fn test_closest_line_index() {
        let lines = vec![
            "The quick brown fox\n".to_string(),
            "jumps over the lazy dog\n".to_string(),
        ];
        let index = LineIndex::new(&lines);
        assert_eq!(index.closest("quick brown"), Some(1));
        assert_eq!(index.closest("lazy dog"), Some(2));
        assert_eq!(index.closest(""), None);
    }
}
