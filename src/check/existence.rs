//! The `existence` extension point

use super::{assemble_pattern, make_alert, CheckError, Definition};
use crate::alert::Alert;
use crate::file::File;
use regex::Regex;
use serde::Deserialize;

/// Fails for every match of its compiled pattern.
///
/// The simplest of the extension points: `tokens` are joined into a
/// non-capturing alternation wrapped in word boundaries, and every match
/// becomes an alert.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Existence {
    #[serde(flatten)]
    pub definition: Definition,

    /// Adds `raw` to the end of `tokens`, assuming both are defined.
    pub append: bool,

    /// Makes all matches case-insensitive.
    pub ignorecase: bool,

    /// Removes the default word boundaries.
    pub nonword: bool,

    /// A list of fragments to be concatenated into a pattern.
    pub raw: Vec<String>,

    /// A list of tokens to be transformed into a non-capturing group.
    pub tokens: Vec<String>,

    #[serde(skip)]
    pattern: Option<Regex>,
}

impl Existence {
    /// Compile the matcher from the decoded manifest fields.
    pub fn compile(&mut self, word_template: Option<&str>) -> Result<(), CheckError> {
        let pattern = assemble_pattern(
            word_template,
            self.ignorecase,
            !self.nonword && !self.tokens.is_empty(),
            &self.raw.concat(),
            self.append,
            &self.tokens.join("|"),
        );

        self.pattern = Some(Regex::new(&pattern).map_err(|source| CheckError::Regex {
            name: self.definition.name.clone(),
            source,
        })?);
        Ok(())
    }

    pub fn run(&self, text: &str, _file: &mut File) -> Vec<Alert> {
        let Some(pattern) = &self.pattern else {
            return Vec::new();
        };

        pattern
            .find_iter(text)
            .map(|m| make_alert(&self.definition, (m.start(), m.end()), text))
            .collect()
    }
}
