//! The `repetition` extension point

use super::{format_message, make_alert, CheckError, Definition};
use crate::alert::Alert;
use crate::file::File;
use regex::Regex;
use serde::Deserialize;

/// Flags adjacent equal matches of any of its tokens ("the the").
///
/// Repetitions separated by a newline do not count, so a word legitimately
/// ending one line and starting the next is never flagged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Repetition {
    #[serde(flatten)]
    pub definition: Definition,

    /// The permitted repetition count before alerting.
    pub max: usize,

    /// Makes the comparison case-insensitive.
    pub ignorecase: bool,

    /// Limits all matches to purely alphabetic tokens.
    pub alpha: bool,

    /// A list of tokens to be transformed into a group.
    pub tokens: Vec<String>,

    #[serde(skip)]
    pattern: Option<Regex>,
}

fn is_letter(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_alphabetic())
}

impl Repetition {
    pub fn compile(&mut self) -> Result<(), CheckError> {
        let mut pattern = String::new();
        if self.ignorecase {
            pattern.push_str("(?i)");
        }
        pattern.push_str(&format!("({})", self.tokens.join("|")));

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

        let mut alerts = Vec::new();
        let mut prev = String::new();
        let mut prev_loc = (0usize, 0usize);
        let mut count = 0usize;

        for m in pattern.find_iter(text) {
            let loc = (m.start(), m.end());
            let curr = m.as_str().trim().to_string();

            let mut hit = if self.ignorecase {
                !curr.is_empty() && curr.to_lowercase() == prev.to_lowercase()
            } else {
                !curr.is_empty() && curr == prev
            };
            hit = hit && (!self.alpha || is_letter(&curr));

            if hit {
                count += 1;
            }

            if hit && count > self.max {
                let window = &text[prev_loc.0..loc.1];
                if !window.contains('\n') {
                    let mut alert = make_alert(&self.definition, (prev_loc.0, loc.1), text);
                    alert.message = format_message(&self.definition.message, &[&curr]);
                    alert.description = format_message(&self.definition.description, &[&curr]);
                    alerts.push(alert);
                    count = 0;
                }
            }

            prev_loc = loc;
            prev = curr;
        }

        alerts
    }
}
