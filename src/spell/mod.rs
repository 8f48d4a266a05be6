//! Word-list spell model
//!
//! Accepts Hunspell-style `.dic` word lists (an optional leading count
//! line, affix flags after `/` stripped) as well as plain one-word-per-line
//! files. Lookup is case-tolerant: a word is accepted if it, or its
//! lowercase form, is known.

use std::collections::HashSet;
use std::io;
use std::path::Path;

/// An immutable set of known words.
#[derive(Debug, Default, Clone)]
pub struct SpellModel {
    words: HashSet<String>,
}

impl SpellModel {
    /// Load a model from a word-list file.
    pub fn from_word_list_file(path: &Path) -> io::Result<Self> {
        let mut model = Self::default();
        model.add_word_list_file(path)?;
        Ok(model)
    }

    /// Add every word in `path`; returns the number of words added.
    pub fn add_word_list_file(&mut self, path: &Path) -> io::Result<usize> {
        let content = std::fs::read_to_string(path)?;
        Ok(self.add_word_list(&content))
    }

    /// Add every word in a list, one per line.
    pub fn add_word_list(&mut self, content: &str) -> usize {
        let mut added = 0;
        for (idx, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            // A .dic file opens with its word count.
            if idx == 0 && line.chars().all(|c| c.is_ascii_digit()) {
                continue;
            }
            let word = line.split('/').next().unwrap_or(line).trim();
            if !word.is_empty() && self.words.insert(word.to_string()) {
                added += 1;
            }
        }
        added
    }

    /// Whether `word` is known, directly or after lowercasing.
    pub fn spell(&self, word: &str) -> bool {
        self.words.contains(word) || self.words.contains(&word.to_lowercase())
    }

    /// Whether the model has no entries.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Number of known words.
    pub fn len(&self) -> usize {
        self.words.len()
    }
}
