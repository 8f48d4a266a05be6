//! The `substitution` extension point

use super::{assemble_pattern, format_message, to_sentence, CheckError, Definition};
use crate::alert::Alert;
use crate::file::File;
use crate::nlp;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Suggests the values of `swap` in place of its keys.
///
/// All observed patterns compile into a single alternation with one capture
/// group per entry; the index of the matched group selects the expected
/// replacement. Patterns containing their own capture groups are rejected,
/// since they would shift the indexing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Substitution {
    #[serde(flatten)]
    pub definition: Definition,

    /// Makes all matches case-insensitive.
    pub ignorecase: bool,

    /// Removes the default word boundaries.
    pub nonword: bool,

    /// A sequence of `observed: expected` pairs.
    pub swap: BTreeMap<String, String>,

    /// A pattern matched against the `text/TAG` form of the observed token;
    /// when it fails, the alert is hidden.
    pub pos: String,

    #[serde(skip)]
    pattern: Option<Regex>,

    #[serde(skip)]
    replacements: Vec<String>,

    #[serde(skip)]
    pos_re: Option<Regex>,
}

impl Substitution {
    pub fn compile(&mut self, word_template: Option<&str>) -> Result<(), CheckError> {
        let mut tokens = String::new();
        for (observed, expected) in &self.swap {
            let opens = observed.matches('(').count();
            if opens != observed.matches("(?:").count() && opens != observed.matches(r"\(").count()
            {
                // A capture group inside a source pattern would collide with
                // the group-to-replacement indexing.
                return Err(CheckError::Invalid {
                    name: self.definition.name.clone(),
                    reason: format!("'{}' must use non-capturing groups", observed),
                });
            }
            tokens.push_str(&format!("({})|", observed));
            self.replacements.push(expected.clone());
        }

        let pattern = assemble_pattern(
            word_template,
            self.ignorecase,
            !self.nonword,
            "",
            true,
            tokens.trim_end_matches('|'),
        );
        self.pattern = Some(Regex::new(&pattern).map_err(|source| CheckError::Regex {
            name: self.definition.name.clone(),
            source,
        })?);

        if !self.pos.is_empty() {
            self.pos_re = Some(Regex::new(&self.pos).map_err(|source| CheckError::Regex {
                name: self.definition.name.clone(),
                source,
            })?);
        }
        Ok(())
    }

    pub fn run(&self, text: &str, _file: &mut File) -> Vec<Alert> {
        let Some(pattern) = &self.pattern else {
            return Vec::new();
        };
        if !pattern.is_match(text) {
            return Vec::new();
        }

        let mut alerts = Vec::new();
        for caps in pattern.captures_iter(text) {
            for idx in 1..caps.len() {
                let Some(group) = caps.get(idx) else {
                    continue;
                };
                let observed = group.as_str().trim();
                let mut expected = self.replacements[idx - 1].clone();
                if expected == observed {
                    continue;
                }

                let hide = match &self.pos_re {
                    Some(re) => nlp::pos_mismatch((group.start(), group.end()), re, text),
                    None => false,
                };

                let mut action = self.definition.action.clone();
                if action.name == "replace" && action.params.is_empty() {
                    action.params = expected.split('|').map(str::to_string).collect();
                    expected = to_sentence(&action.params, "or");
                }

                let message = format_message(&self.definition.message, &[&expected, observed]);
                let description =
                    format_message(&self.definition.description, &[&expected, observed]);

                alerts.push(Alert {
                    action,
                    check: self.definition.name.clone(),
                    description,
                    line: 1,
                    link: self.definition.link.clone(),
                    message,
                    severity: self.definition.level,
                    span: [group.start(), group.end()],
                    match_text: observed.to_string(),
                    hide,
                });
            }
        }

        alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn compiled(yaml: &str) -> Substitution {
        let mut rule: Substitution = serde_yaml::from_str(yaml).unwrap();
        rule.definition.name = "Test.Substitution".to_string();
        rule.compile(None).unwrap();
        rule
    }

    fn run(rule: &Substitution, text: &str) -> Vec<Alert> {
        let mut file = File::from_string(text, ".txt", &Config::new());
        rule.run(text, &mut file)
    }

    #[test]
    fn test_basic_swap() {
        let rule = compiled(
            "extends: substitution\nmessage: \"Use '%s' instead of '%s'.\"\nswap:\n  smart phone: smartphone",
        );
        let alerts = run(&rule, "my smart phone");

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].match_text, "smart phone");
        assert_eq!(alerts[0].span, [3, 14]);
        assert_eq!(alerts[0].message, "Use 'smartphone' instead of 'smart phone'.");
    }

    #[test]
    fn test_group_selects_replacement() {
        let rule = compiled(
            "extends: substitution\nmessage: \"Use '%s' instead of '%s'.\"\nswap:\n  alot: a lot\n  irregardless: regardless",
        );
        let alerts = run(&rule, "irregardless, alot happened");

        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].message, "Use 'regardless' instead of 'irregardless'.");
        assert_eq!(alerts[1].message, "Use 'a lot' instead of 'alot'.");
    }

    #[test]
    fn test_identical_replacement_skipped() {
        let rule = compiled(
            "extends: substitution\nmessage: \"Use '%s' instead of '%s'.\"\nignorecase: true\nswap:\n  github: GitHub",
        );
        // The cased form is already correct.
        assert!(run(&rule, "GitHub is fine").is_empty());
        assert_eq!(run(&rule, "github is wrong").len(), 1);
    }

    #[test]
    fn test_capture_group_rejected() {
        let mut rule: Substitution = serde_yaml::from_str(
            "extends: substitution\nmessage: \"%s %s\"\nswap:\n  '(foo) bar': baz",
        )
        .unwrap();
        rule.definition.name = "Test.Bad".to_string();
        assert!(rule.compile(None).is_err());
    }

    #[test]
    fn test_noncapturing_group_allowed() {
        let rule = compiled(
            "extends: substitution\nmessage: \"Use '%s' instead of '%s'.\"\nswap:\n  '(?:very|really) unique': unique",
        );
        let alerts = run(&rule, "that is very unique");
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].match_text, "very unique");
    }

    #[test]
    fn test_replace_action_params() {
        let rule = compiled(
            "extends: substitution\nmessage: \"Use '%s'.\"\naction:\n  name: replace\nswap:\n  utilize: use|employ",
        );
        let alerts = run(&rule, "we utilize tools");

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].action.params, vec!["use", "employ"]);
        assert_eq!(alerts[0].message, "Use 'use or employ'.");
    }
}
