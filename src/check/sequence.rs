//! The `sequence` extension point

use super::{assemble_pattern, format_message, CheckError, Definition};
use crate::alert::Alert;
use crate::file::File;
use crate::nlp::{self, TaggedToken};
use regex::Regex;
use serde::Deserialize;

/// A token of text with NLP-related attributes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NlpToken {
    /// A pattern the token's text must (or, with `negate`, must not) match.
    pub pattern: String,

    /// Inverts the meaning of `pattern`.
    pub negate: bool,

    /// A pattern the token's part-of-speech tag must match.
    pub tag: String,

    /// Replicates this token `skip` extra times as optional.
    pub skip: usize,

    #[serde(skip)]
    optional: bool,

    #[serde(skip)]
    re: Option<Regex>,

    #[serde(skip)]
    tag_re: Option<Regex>,
}

/// Looks for a user-defined sequence of tokens.
///
/// The first non-negated token with a pattern anchors the search; each
/// regex match of that anchor is a candidate, and the walk outward from it
/// must satisfy every sibling token. A mandatory non-match aborts the
/// candidate; an optional match terminates the walk on that side.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Sequence {
    #[serde(flatten)]
    pub definition: Definition,

    /// Makes anchor matches case-insensitive.
    pub ignorecase: bool,

    /// The token sequence, in order.
    pub tokens: Vec<NlpToken>,

    #[serde(skip)]
    needs_tagging: bool,
}

fn tokens_match(token: &NlpToken, word: &TaggedToken) -> bool {
    let tag_matched = match &token.tag_re {
        Some(re) => re.is_match(&word.tag),
        None => true,
    };
    let tag_failed = !tag_matched;

    let tok_failed = token
        .re
        .as_ref()
        .is_some_and(|re| re.is_match(&word.text) == token.negate);

    if (token.pattern.is_empty() && tag_failed)
        || (token.tag.is_empty() && tok_failed)
        || (!token.tag.is_empty() && !token.pattern.is_empty() && (tag_failed || tok_failed))
    {
        return false;
    }
    true
}

fn steps_to_string(steps: &[String]) -> String {
    let mut out = String::new();
    for step in steps {
        if step.starts_with('\'') {
            out.push_str(step);
        } else {
            out.push(' ');
            out.push_str(step);
        }
    }
    out.trim().to_string()
}

impl Sequence {
    pub fn compile(&mut self, word_template: Option<&str>) -> Result<(), CheckError> {
        // Expand `skip` into trailing optional copies.
        let mut expanded = Vec::new();
        for token in self.tokens.drain(..) {
            let skip = token.skip;
            expanded.push(token.clone());
            for _ in 0..skip {
                let mut optional = token.clone();
                optional.optional = true;
                expanded.push(optional);
            }
        }
        self.tokens = expanded;

        let name = self.definition.name.clone();
        for token in &mut self.tokens {
            if !token.tag.is_empty() {
                self.needs_tagging = true;
                token.tag_re =
                    Some(
                        Regex::new(&token.tag).map_err(|source| CheckError::Regex {
                            name: name.clone(),
                            source,
                        })?,
                    );
            }
            if !token.pattern.is_empty() {
                let pattern = assemble_pattern(
                    word_template,
                    self.ignorecase,
                    true,
                    "",
                    false,
                    &token.pattern,
                );
                token.re =
                    Some(
                        Regex::new(&pattern).map_err(|source| CheckError::Regex {
                            name: name.clone(),
                            source,
                        })?,
                    );
            }
        }

        // Sequences need sentence context, so they run against the summary.
        self.definition.scope = "summary".to_string();
        Ok(())
    }

    /// Walk outward from a candidate anchor. Returns the matched steps, or
    /// an empty list if a mandatory token failed, plus the anchor's word
    /// index for the history set.
    fn sequence_matches(
        &self,
        anchor_idx: usize,
        target: &str,
        words: &[TaggedToken],
        history: &[usize],
    ) -> (Vec<String>, usize) {
        let size = self.tokens.len();
        let mut steps = Vec::new();
        let mut index = 0;

        let Some(jdx) = words
            .iter()
            .enumerate()
            .position(|(idx, word)| word.text == target && !history.contains(&idx))
        else {
            return (Vec::new(), index);
        };
        index = jdx;

        // Left of the anchor.
        for i in 1..=anchor_idx {
            let tok = &self.tokens[anchor_idx - i];
            if jdx < i {
                if !tok.optional {
                    return (Vec::new(), index);
                }
                break;
            }
            let word = &words[jdx - i];
            steps.insert(0, word.text.clone());

            let matched = tokens_match(tok, word);
            if !matched && !tok.optional {
                return (Vec::new(), index);
            } else if matched && tok.optional {
                break;
            }
        }

        // Right of the anchor.
        for i in 1..size.saturating_sub(anchor_idx) {
            if i == 1 {
                steps.push(words[jdx].text.clone());
            }
            let tok = &self.tokens[anchor_idx + i];
            if jdx + i >= words.len() {
                if !tok.optional {
                    return (Vec::new(), index);
                }
                break;
            }
            let word = &words[jdx + i];
            steps.push(word.text.clone());

            let matched = tokens_match(tok, word);
            if !matched && !tok.optional {
                return (Vec::new(), index);
            } else if matched && tok.optional {
                break;
            }
        }

        (steps, index)
    }

    pub fn run(&self, text: &str, _file: &mut File) -> Vec<Alert> {
        let mut alerts = Vec::new();
        let mut history: Vec<usize> = Vec::new();

        for (idx, token) in self.tokens.iter().enumerate() {
            if token.negate {
                continue;
            }
            let Some(re) = &token.re else {
                continue;
            };

            let words = nlp::text_to_tokens(text, self.needs_tagging);
            for m in re.find_iter(text) {
                let target = m.as_str();
                let (steps, index) = self.sequence_matches(idx, target, &words, &history);
                history.push(index);

                if steps.is_empty() {
                    continue;
                }
                let seq = steps_to_string(&steps);
                let Some(pos) = text.find(&seq) else {
                    continue;
                };

                let subs: Vec<&str> = steps.iter().map(String::as_str).collect();
                let message = format_message(&self.definition.message, &subs);
                let description = format_message(&self.definition.description, &subs);

                alerts.push(Alert {
                    action: self.definition.action.clone(),
                    check: self.definition.name.clone(),
                    description,
                    line: 1,
                    link: self.definition.link.clone(),
                    message,
                    severity: self.definition.level,
                    span: [pos, pos + seq.len()],
                    match_text: seq,
                    hide: false,
                });
            }
            break;
        }

        alerts
    }
}
