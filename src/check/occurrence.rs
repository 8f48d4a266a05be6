//! The `occurrence` extension point

use super::{CheckError, Definition};
use crate::alert::Alert;
use crate::file::File;
use regex::Regex;
use serde::Deserialize;

/// Counts the matches of `token` in a scope and fails when the count falls
/// outside the configured bounds. The alert attaches to the first match, or
/// to the whole scope when the minimum was missed with no matches at all.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Occurrence {
    #[serde(flatten)]
    pub definition: Definition,

    /// Makes all matches case-insensitive.
    pub ignorecase: bool,

    /// The maximum number of times `token` may appear in a given scope.
    pub max: Option<usize>,

    /// The minimum number of times `token` has to appear in a given scope.
    pub min: Option<usize>,

    /// The token of interest.
    pub token: String,

    #[serde(skip)]
    pattern: Option<Regex>,
}

impl Occurrence {
    pub fn compile(&mut self) -> Result<(), CheckError> {
        if self.max.is_none() && self.min.is_none() {
            return Err(CheckError::Invalid {
                name: self.definition.name.clone(),
                reason: "needs at least one of 'min' or 'max'".to_string(),
            });
        }

        let mut pattern = String::new();
        if self.ignorecase {
            pattern.push_str("(?i)");
        }
        pattern.push_str(&format!("(?:{})", self.token));

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

        let locs: Vec<(usize, usize)> = pattern
            .find_iter(text)
            .map(|m| (m.start(), m.end()))
            .collect();
        let count = locs.len();

        let over = self.max.is_some_and(|max| count > max);
        let under = self.min.is_some_and(|min| count < min);
        if !over && !under {
            return Vec::new();
        }

        // Only the first match is reported, not the whole scope, so the
        // localizer can stay on its exact-mapping path.
        let span = locs.first().copied().unwrap_or((0, text.len()));
        let mut alert = super::make_alert(&self.definition, span, text);
        alert.message = self.definition.message.clone();
        alert.description = self.definition.description.clone();
        vec![alert]
    }
}
