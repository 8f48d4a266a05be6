//! The `capitalization` extension point

use super::{make_alert, CheckError, Definition};
use crate::alert::Alert;
use crate::file::File;
use regex::Regex;
use serde::Deserialize;

/// Title-case styles for the `$title` mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleStyle {
    AP,
    Chicago,
}

/// Words both styles leave lowercase mid-title.
const SMALL_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "but", "by", "for", "in", "nor", "of", "on", "or", "so", "the",
    "to", "up", "yet",
];

/// Prepositions Chicago lowercases regardless of length.
const CHICAGO_PREPOSITIONS: &[&str] = &[
    "about", "above", "across", "after", "against", "along", "among", "around", "before",
    "behind", "below", "beneath", "beside", "between", "beyond", "down", "during", "except",
    "from", "into", "like", "near", "over", "past", "since", "through", "toward", "under",
    "until", "upon", "with", "within", "without",
];

#[derive(Debug, Clone)]
enum Mode {
    Title(TitleStyle),
    Sentence,
    Lower,
    Upper,
    Pattern(Regex),
}

/// Checks a whole segment against a capitalization convention.
///
/// `match` selects the mode: `$title`, `$sentence`, `$lower`, `$upper`, or
/// a pattern the segment must match. Failures alert on the entire scope.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Capitalization {
    #[serde(flatten)]
    pub definition: Definition,

    /// `$title`, `$sentence`, `$lower`, `$upper`, or a pattern.
    #[serde(rename = "match")]
    pub match_mode: String,

    /// AP or Chicago; only applies when match is set to `$title`.
    pub style: String,

    /// An array of strings to be ignored.
    pub exceptions: Vec<String>,

    /// Suffixes indicating that the next word may differ from the mode
    /// (e.g., a colon licensing a capitalized follow-on).
    pub indicators: Vec<String>,

    #[serde(skip)]
    mode: Option<Mode>,

    #[serde(skip)]
    except_re: Option<Regex>,
}

fn starts_upper(word: &str) -> bool {
    word.chars().next().is_some_and(|c| c.is_uppercase())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

impl Capitalization {
    /// Compile the mode; `accepted` terms join the exceptions.
    pub fn compile(&mut self, accepted: &[String]) -> Result<(), CheckError> {
        self.exceptions.extend(accepted.iter().cloned());
        if !self.exceptions.is_empty() {
            self.except_re = Some(
                Regex::new(&self.exceptions.join("|")).map_err(|source| CheckError::Regex {
                    name: self.definition.name.clone(),
                    source,
                })?,
            );
        }

        self.mode = Some(match self.match_mode.as_str() {
            "$title" => {
                let style = if self.style == "Chicago" {
                    TitleStyle::Chicago
                } else {
                    TitleStyle::AP
                };
                Mode::Title(style)
            }
            "$sentence" => Mode::Sentence,
            "$lower" => Mode::Lower,
            "$upper" => Mode::Upper,
            pattern => Mode::Pattern(Regex::new(pattern).map_err(|source| CheckError::Regex {
                name: self.definition.name.clone(),
                source,
            })?),
        });
        Ok(())
    }

    fn excepted(&self, word: &str) -> bool {
        self.exceptions.iter().any(|e| e == word)
            || self.except_re.as_ref().is_some_and(|re| re.is_match(word))
    }

    fn check_title(&self, text: &str, style: TitleStyle) -> bool {
        let words: Vec<&str> = text.split_whitespace().collect();
        let last = words.len().saturating_sub(1);

        for (idx, word) in words.iter().enumerate() {
            if self.excepted(word) || !word.chars().any(|c| c.is_alphabetic()) {
                continue;
            }

            let bare = word.trim_matches(|c: char| !c.is_alphanumeric());
            let lower = bare.to_lowercase();
            let small = SMALL_WORDS.contains(&lower.as_str())
                || (style == TitleStyle::Chicago
                    && CHICAGO_PREPOSITIONS.contains(&lower.as_str()));

            let expected = if idx == 0 || idx == last || !small {
                capitalize(bare)
            } else {
                lower.clone()
            };

            if *bare != expected && bare != bare.to_uppercase().as_str() {
                return false;
            }
        }
        true
    }

    fn check_sentence(&self, text: &str) -> bool {
        let words: Vec<&str> = text.split_whitespace().collect();
        let mut prev = "";

        for (idx, &word) in words.iter().enumerate() {
            let first_alpha = word.chars().find(|c| c.is_alphabetic());
            if first_alpha.is_none() {
                prev = word;
                continue;
            }

            if idx == 0 {
                if !starts_upper(word) && !self.excepted(word) {
                    return false;
                }
            } else if starts_upper(word)
                && !self.excepted(word)
                && !self.indicators.iter().any(|i| prev.ends_with(i.as_str()))
                && word != word.to_uppercase().as_str()
            {
                return false;
            }
            prev = word;
        }
        true
    }

    fn passes(&self, text: &str) -> bool {
        match &self.mode {
            Some(Mode::Title(style)) => self.check_title(text, *style),
            Some(Mode::Sentence) => self.check_sentence(text),
            Some(Mode::Lower) => text
                .split_whitespace()
                .all(|w| self.excepted(w) || w == w.to_lowercase().as_str()),
            Some(Mode::Upper) => text
                .split_whitespace()
                .all(|w| self.excepted(w) || w == w.to_uppercase().as_str()),
            Some(Mode::Pattern(re)) => {
                re.is_match(text) || self.exceptions.iter().any(|e| e == text)
            }
            None => true,
        }
    }

    pub fn run(&self, text: &str, _file: &mut File) -> Vec<Alert> {
        let trimmed = text.trim_end();
        if trimmed.is_empty() || self.passes(trimmed) {
            Vec::new()
        } else {
            vec![make_alert(&self.definition, (0, trimmed.len()), text)]
        }
    }
}
