//! Grade-level readability metrics
//!
//! All five metrics operate on one `Assessment` of the text: word,
//! sentence, character, and syllable counts plus the number of polysyllabic
//! words. Scores approximate the U.S. school grade required to understand
//! the text.

use super::{sentences, words};

/// Aggregate counts for one body of text.
#[derive(Debug, Clone, Default)]
pub struct Assessment {
    pub num_words: f64,
    pub num_sentences: f64,
    pub num_characters: f64,
    pub num_syllables: f64,
    /// Words with three or more syllables
    pub num_polysyllable_words: f64,
}

impl Assessment {
    /// Count the text once; the individual metrics are cheap afterwards.
    pub fn new(text: &str) -> Self {
        let mut assessment = Assessment {
            num_sentences: sentences(text).len() as f64,
            ..Default::default()
        };

        for word in words(text) {
            let syllables = syllable_count(word) as f64;
            assessment.num_words += 1.0;
            assessment.num_characters += word.chars().filter(|c| c.is_alphanumeric()).count() as f64;
            assessment.num_syllables += syllables;
            if syllables >= 3.0 {
                assessment.num_polysyllable_words += 1.0;
            }
        }

        assessment
    }

    /// Flesch-Kincaid grade level.
    pub fn flesch_kincaid(&self) -> f64 {
        if self.num_words == 0.0 || self.num_sentences == 0.0 {
            return 0.0;
        }
        0.39 * (self.num_words / self.num_sentences)
            + 11.8 * (self.num_syllables / self.num_words)
            - 15.59
    }

    /// Gunning fog index.
    pub fn gunning_fog(&self) -> f64 {
        if self.num_words == 0.0 || self.num_sentences == 0.0 {
            return 0.0;
        }
        0.4 * ((self.num_words / self.num_sentences)
            + 100.0 * (self.num_polysyllable_words / self.num_words))
    }

    /// SMOG grade.
    pub fn smog(&self) -> f64 {
        if self.num_sentences == 0.0 {
            return 0.0;
        }
        1.043 * (30.0 * self.num_polysyllable_words / self.num_sentences).sqrt() + 3.1291
    }

    /// Coleman-Liau index.
    pub fn coleman_liau(&self) -> f64 {
        if self.num_words == 0.0 {
            return 0.0;
        }
        0.0588 * (self.num_characters / self.num_words * 100.0)
            - 0.296 * (self.num_sentences / self.num_words * 100.0)
            - 15.8
    }

    /// Automated readability index.
    pub fn automated_readability(&self) -> f64 {
        if self.num_words == 0.0 || self.num_sentences == 0.0 {
            return 0.0;
        }
        4.71 * (self.num_characters / self.num_words)
            + 0.5 * (self.num_words / self.num_sentences)
            - 21.43
    }
}

/// Heuristic English syllable count: vowel groups, with a correction for a
/// silent trailing "e". Every word has at least one syllable.
pub fn syllable_count(word: &str) -> usize {
    let lower = word.to_lowercase();
    let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');

    let mut count = 0;
    let mut prev_vowel = false;
    for c in lower.chars() {
        let vowel = is_vowel(c);
        if vowel && !prev_vowel {
            count += 1;
        }
        prev_vowel = vowel;
    }

    if lower.ends_with('e') && !lower.ends_with("le") && count > 1 {
        count -= 1;
    }

    count.max(1)
}
