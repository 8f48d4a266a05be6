//! Tokenization and part-of-speech tagging
//!
//! The rest of the crate treats this module as a black box exposing
//! `words`/`sentences` tokenizers and a `tag` operation producing Penn
//! Treebank tags. The tagger is a compact closed-class lexicon with suffix
//! heuristics; it initializes lazily since most runs never need it.

pub mod readability;

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Matches one word: filenames and dotted acronyms first, then words with
/// internal apostrophes or hyphens, then plain alphanumeric runs.
static WORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{L}\p{N}]+\.\w{2,4}\b|(?:[A-Za-z]\.){2,}|[\p{L}\p{N}]+(?:['’-][\p{L}\p{N}]+)*")
        .unwrap()
});

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9][0-9,.]*$").unwrap());

/// Split text into words.
pub fn words(text: &str) -> Vec<&str> {
    WORD_RE.find_iter(text).map(|m| m.as_str()).collect()
}

/// Split text into words with their byte offsets.
pub fn word_spans(text: &str) -> Vec<(usize, &str)> {
    WORD_RE
        .find_iter(text)
        .map(|m| (m.start(), m.as_str()))
        .collect()
}

/// Abbreviations that end with a period without ending a sentence.
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "st", "jr", "sr", "vs", "etc", "e.g", "i.e", "fig", "inc",
    "ltd", "no", "dept", "est", "approx",
];

/// Split text into sentences.
pub fn sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();

    let mut idx = 0;
    while idx < bytes.len() {
        let b = bytes[idx];
        if b == b'.' || b == b'!' || b == b'?' {
            // Consume runs of terminators and closing quotes/brackets.
            let mut end = idx + 1;
            while end < bytes.len() && matches!(bytes[end], b'.' | b'!' | b'?' | b'"' | b')' | b']')
            {
                end += 1;
            }

            let followed_by_break = end >= bytes.len()
                || (bytes[end] == b' ' || bytes[end] == b'\n')
                    && text[end..]
                        .trim_start()
                        .chars()
                        .next()
                        .is_none_or(|c| c.is_uppercase() || c.is_numeric());

            let is_abbrev = b == b'.' && {
                let prior = &text[start..idx];
                let last = prior
                    .rsplit(|c: char| c.is_whitespace())
                    .next()
                    .unwrap_or("");
                ABBREVIATIONS.contains(&last.to_lowercase().trim_end_matches('.'))
            };

            if followed_by_break && !is_abbrev {
                let sentence = text[start..end].trim();
                if !sentence.is_empty() {
                    out.push(sentence);
                }
                start = end;
            }
            idx = end;
        } else {
            idx += 1;
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        out.push(tail);
    }
    out
}

/// A token of text with its part-of-speech tag.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedToken {
    pub text: String,
    pub tag: String,
}

/// Closed-class lexicon and suffix heuristics producing Penn Treebank tags.
pub struct Tagger {
    lexicon: HashMap<&'static str, &'static str>,
}

static TAGGER: Lazy<Tagger> = Lazy::new(Tagger::new);

impl Tagger {
    fn new() -> Self {
        let mut lexicon = HashMap::new();
        for (tag, entries) in [
            ("DT", &["a", "an", "the", "this", "that", "these", "those", "each", "every", "some", "any", "no"][..]),
            ("IN", &["in", "on", "at", "by", "for", "with", "about", "against", "between", "into", "through", "during", "before", "after", "above", "below", "to", "from", "up", "down", "of", "off", "over", "under", "than", "if", "because", "while", "although"][..]),
            ("CC", &["and", "but", "or", "nor", "so", "yet"][..]),
            ("PRP", &["i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us", "them"][..]),
            ("PRP$", &["my", "your", "his", "its", "our", "their"][..]),
            ("MD", &["can", "could", "may", "might", "must", "shall", "should", "will", "would"][..]),
            ("VB", &["be", "do", "have", "make", "take", "get", "go", "use", "see", "run", "write", "read"][..]),
            ("VBZ", &["is", "does", "has"][..]),
            ("VBP", &["am", "are"][..]),
            ("VBD", &["was", "were", "did", "had", "went", "made", "took", "got", "saw"][..]),
            ("RB", &["not", "very", "also", "only", "just", "then", "here", "there", "now", "always", "never", "often", "too"][..]),
            ("WDT", &["which", "whatever"][..]),
            ("WP", &["who", "whom", "what"][..]),
            ("WRB", &["when", "where", "why", "how"][..]),
            ("EX", &["there"][..]),
            ("UH", &["oh", "well", "yes"][..]),
        ] {
            for entry in entries {
                lexicon.entry(*entry).or_insert(tag);
            }
        }
        Self { lexicon }
    }

    /// Tag one word. `first` marks the start of a sentence, where
    /// capitalization carries no signal.
    fn tag_word(&self, word: &str, first: bool) -> String {
        if NUMBER_RE.is_match(word) {
            return "CD".to_string();
        }

        let lower = word.to_lowercase();
        if let Some(tag) = self.lexicon.get(lower.as_str()) {
            return (*tag).to_string();
        }

        if !first && word.chars().next().is_some_and(|c| c.is_uppercase()) {
            return "NNP".to_string();
        }

        if lower.ends_with("ly") {
            "RB".to_string()
        } else if lower.ends_with("ing") && lower.len() > 4 {
            "VBG".to_string()
        } else if lower.ends_with("ed") && lower.len() > 3 {
            "VBD".to_string()
        } else if lower.ends_with("ous")
            || lower.ends_with("ful")
            || lower.ends_with("ive")
            || lower.ends_with("able")
            || lower.ends_with("ible")
        {
            "JJ".to_string()
        } else if lower.ends_with('s') && !lower.ends_with("ss") && lower.len() > 3 {
            "NNS".to_string()
        } else {
            "NN".to_string()
        }
    }
}

/// Tag a sequence of words.
pub fn tag(tokens: &[&str]) -> Vec<TaggedToken> {
    tokens
        .iter()
        .enumerate()
        .map(|(idx, word)| TaggedToken {
            text: (*word).to_string(),
            tag: TAGGER.tag_word(word, idx == 0),
        })
        .collect()
}

/// Tokenize text, optionally attaching POS tags.
pub fn text_to_tokens(text: &str, needs_tagging: bool) -> Vec<TaggedToken> {
    let mut out = Vec::new();
    for sentence in sentences(text) {
        let toks = words(sentence);
        if needs_tagging {
            out.extend(tag(&toks));
        } else {
            out.extend(toks.iter().map(|t| TaggedToken {
                text: (*t).to_string(),
                tag: String::new(),
            }));
        }
    }
    out
}

/// Whether the POS of the matched region fails the given pattern.
///
/// The matched words are rendered as `text/TAG` pairs and tested against
/// `pos_re`; a non-match means the alert should be hidden.
pub fn pos_mismatch(loc: (usize, usize), pos_re: &Regex, text: &str) -> bool {
    let target = match text.get(loc.0..loc.1) {
        Some(t) => t,
        None => return true,
    };
    let target_words = words(target);
    if target_words.is_empty() {
        return true;
    }

    let tagged = text_to_tokens(text, true);
    for window in tagged.windows(target_words.len()) {
        if window
            .iter()
            .zip(&target_words)
            .all(|(tok, want)| tok.text == *want)
        {
            let rendered: Vec<String> = window
                .iter()
                .map(|tok| format!("{}/{}", tok.text, tok.tag))
                .collect();
            return !pos_re.is_match(&rendered.join(" "));
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words() {
        assert_eq!(words("smart phone"), vec!["smart", "phone"]);
        assert_eq!(words("it's a top-notch test"), vec!["it's", "a", "top-notch", "test"]);
        assert_eq!(words("U.S.A. rocks"), vec!["U.S.A.", "rocks"]);
    }

    #[test]
    fn test_word_spans() {
        let spans = word_spans("ab cd");
        assert_eq!(spans, vec![(0, "ab"), (3, "cd")]);
    }

    #[test]
    fn test_sentences() {
        let text = "This is one. This is two! Is this three?";
        let got = sentences(text);
        assert_eq!(got, vec!["This is one.", "This is two!", "Is this three?"]);
    }

    #[test]
    fn test_sentences_abbreviations() {
        let text = "Dr. Smith arrived. He sat down.";
        let got = sentences(text);
        assert_eq!(got, vec!["Dr. Smith arrived.", "He sat down."]);
    }

    #[test]
    fn test_tagging() {
        let tagged = tag(&["the", "cat", "quickly", "ran"]);
        assert_eq!(tagged[0].tag, "DT");
        assert_eq!(tagged[1].tag, "NN");
        assert_eq!(tagged[2].tag, "RB");
    }

    #[test]
    fn test_tagging_proper_noun() {
        let tagged = tag(&["see", "Berlin"]);
        assert_eq!(tagged[1].tag, "NNP");
    }

    #[test]
    fn test_tagging_numbers() {
        let tagged = tag(&["42", "cats"]);
        assert_eq!(tagged[0].tag, "CD");
        assert_eq!(tagged[1].tag, "NNS");
    }

    #[test]
    fn test_pos_mismatch() {
        let re = Regex::new(r"\w+/NN").unwrap();
        let text = "the cat sat";
        // "cat" tags as NN, so the pattern matches and nothing is hidden.
        assert!(!pos_mismatch((4, 7), &re, text));

        let verb_re = Regex::new(r"\w+/VBG").unwrap();
        assert!(pos_mismatch((4, 7), &verb_re, text));
    }
}
