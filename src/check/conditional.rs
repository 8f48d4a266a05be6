//! The `conditional` extension point

use super::{make_alert, CheckError, Definition};
use crate::alert::Alert;
use crate::file::File;
use regex::Regex;
use serde::Deserialize;

/// Ensures that the presence of `first` implies the presence of `second`.
///
/// The canonical use is abbreviation checking: if "WHO" (the antecedent)
/// appears, "World Health Organization (WHO)" (the consequent) must have
/// appeared somewhere in the file. Consequent matches are collected into
/// `file.sequences` across scopes, so a definition anywhere in the file
/// licenses every later use.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Conditional {
    #[serde(flatten)]
    pub definition: Definition,

    /// Makes both patterns case-insensitive.
    pub ignorecase: bool,

    /// The antecedent of the statement.
    pub first: String,

    /// The consequent of the statement.
    pub second: String,

    /// An array of strings to be ignored.
    pub exceptions: Vec<String>,

    #[serde(skip)]
    first_re: Option<Regex>,

    #[serde(skip)]
    second_re: Option<Regex>,

    #[serde(skip)]
    except_re: Option<Regex>,
}

impl Conditional {
    /// Compile both patterns; `accepted` terms join the exceptions.
    pub fn compile(&mut self, accepted: &[String]) -> Result<(), CheckError> {
        self.exceptions.extend(accepted.iter().cloned());

        let prefix = if self.ignorecase { "(?i)" } else { "" };
        let name = self.definition.name.clone();
        let build = |p: &str| {
            Regex::new(&format!("{}{}", prefix, p)).map_err(|source| CheckError::Regex {
                name: name.clone(),
                source,
            })
        };

        self.second_re = Some(build(&self.second)?);
        self.first_re = Some(build(&self.first)?);
        if !self.exceptions.is_empty() {
            self.except_re = Some(build(&self.exceptions.join("|"))?);
        }
        Ok(())
    }

    pub fn run(&self, text: &str, file: &mut File) -> Vec<Alert> {
        let (Some(first_re), Some(second_re)) = (&self.first_re, &self.second_re) else {
            return Vec::new();
        };

        // Collect every defined consequent first.
        for caps in second_re.captures_iter(text) {
            if let Some(group) = caps.get(1) {
                file.sequences.push(group.as_str().to_string());
            }
        }

        let mut alerts = Vec::new();
        for m in first_re.find_iter(text) {
            let s = m.as_str();
            let defined = file.sequences.iter().any(|seq| seq == s);
            let excepted = self.except_re.as_ref().is_some_and(|re| re.is_match(s));
            if !defined && !excepted {
                alerts.push(make_alert(&self.definition, (m.start(), m.end()), text));
            }
        }

        alerts
    }
}
