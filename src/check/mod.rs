//! Rule compilation and evaluation
//!
//! Rules are authored as YAML manifests, one per file, grouped into styles.
//! Every manifest names one of the ten extension points in `extends`; the
//! registry decodes the manifest into the matching kind, compiles its
//! matcher state, and stores the result as a [`Check`]. A compiled check is
//! immutable: evaluation happens through `run(text, file)`, which returns
//! alerts with scope-local spans for the localizer to resolve.

pub mod capitalization;
pub mod conditional;
pub mod consistency;
pub mod existence;
pub mod occurrence;
pub mod readability;
pub mod registry;
pub mod repetition;
pub mod sequence;
pub mod spelling;
pub mod substitution;

pub use registry::Registry;

use crate::alert::{Action, Alert, Severity};
use crate::file::File;
use crate::selector::Selector;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The ten rule kinds.
pub const EXTENSION_POINTS: &[&str] = &[
    "capitalization",
    "conditional",
    "consistency",
    "existence",
    "occurrence",
    "repetition",
    "substitution",
    "readability",
    "spelling",
    "sequence",
];

/// Word-level pattern template; `%s` receives the rule's tokens.
pub(crate) const WORD_TEMPLATE: &str = r"(?m)\b(?:%s)\b";

/// Template without word boundaries, for `nonword` rules.
pub(crate) const NONWORD_TEMPLATE: &str = r"(?m)(?:%s)";

/// An error encountered while loading a rule manifest.
///
/// These are accumulated and reported as diagnostics; a bad manifest never
/// aborts linting of other rules or files.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("{name}: missing required key '{key}'")]
    MissingKey { name: String, key: String },

    #[error("{name}: unknown extension point '{point}'")]
    UnknownExtensionPoint { name: String, point: String },

    #[error("{name}: {source}")]
    Yaml {
        name: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{name}: bad pattern: {source}")]
    Regex {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("{name}: {reason}")]
    Invalid { name: String, reason: String },
}

/// Metadata common to all rule kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Definition {
    /// Qualified rule name (`Style.Rule`); assigned by the registry
    #[serde(skip)]
    pub name: String,

    /// The extension point this rule extends
    pub extends: String,

    /// Output message template with `%s` holes
    pub message: String,

    /// Longer template explaining the message
    pub description: String,

    /// Alert severity
    pub level: Severity,

    /// The scope this rule applies to
    pub scope: String,

    /// Reference material
    pub link: String,

    /// At most this many alerts per file (0 = unlimited)
    pub limit: usize,

    /// A hint consumed by downstream tooling
    pub action: Action,
}

impl Default for Definition {
    fn default() -> Self {
        Self {
            name: String::new(),
            extends: String::new(),
            message: String::new(),
            description: String::new(),
            level: Severity::Warning,
            scope: "text".to_string(),
            link: String::new(),
            limit: 0,
            action: Action::default(),
        }
    }
}

impl Definition {
    /// The rule's scope as a selector.
    pub fn selector(&self) -> Selector {
        Selector::new(&self.scope)
    }
}

/// A compiled rule: its definition plus kind-specific matcher state.
#[derive(Debug, Clone)]
pub enum Check {
    Capitalization(capitalization::Capitalization),
    Conditional(conditional::Conditional),
    Consistency(consistency::Consistency),
    Existence(existence::Existence),
    Occurrence(occurrence::Occurrence),
    Repetition(repetition::Repetition),
    Substitution(substitution::Substitution),
    Readability(readability::Readability),
    Spelling(spelling::Spelling),
    Sequence(sequence::Sequence),
}

impl Check {
    /// Evaluate the rule against one scope-local string.
    ///
    /// Spans in the returned alerts are byte offsets within `text`.
    pub fn run(&self, text: &str, file: &mut File) -> Vec<Alert> {
        match self {
            Check::Capitalization(c) => c.run(text, file),
            Check::Conditional(c) => c.run(text, file),
            Check::Consistency(c) => c.run(text, file),
            Check::Existence(c) => c.run(text, file),
            Check::Occurrence(c) => c.run(text, file),
            Check::Repetition(c) => c.run(text, file),
            Check::Substitution(c) => c.run(text, file),
            Check::Readability(c) => c.run(text, file),
            Check::Spelling(c) => c.run(text, file),
            Check::Sequence(c) => c.run(text, file),
        }
    }

    /// The shared rule metadata.
    pub fn definition(&self) -> &Definition {
        match self {
            Check::Capitalization(c) => &c.definition,
            Check::Conditional(c) => &c.definition,
            Check::Consistency(c) => &c.definition,
            Check::Existence(c) => &c.definition,
            Check::Occurrence(c) => &c.definition,
            Check::Repetition(c) => &c.definition,
            Check::Substitution(c) => &c.definition,
            Check::Readability(c) => &c.definition,
            Check::Spelling(c) => &c.definition,
            Check::Sequence(c) => &c.definition,
        }
    }

    /// The rule's scope selector.
    pub fn selector(&self) -> Selector {
        self.definition().selector()
    }

    /// The rule's per-file alert limit.
    pub fn limit(&self) -> usize {
        self.definition().limit
    }
}

/// Assemble a matcher pattern the way every word-level rule does: the word
/// (or nonword) template, the raw fragment prepended or appended, the
/// case-insensitivity flag, and finally the tokens substituted into the
/// template's `%s` hole.
pub(crate) fn assemble_pattern(
    word_template: Option<&str>,
    ignore_case: bool,
    word: bool,
    raw: &str,
    append: bool,
    fill: &str,
) -> String {
    let mut pattern = if word {
        word_template.unwrap_or(WORD_TEMPLATE).to_string()
    } else {
        NONWORD_TEMPLATE.to_string()
    };

    if append {
        pattern.push_str(raw);
    } else {
        pattern = format!("{}{}", raw, pattern);
    }

    if ignore_case {
        pattern = format!("(?i){}", pattern);
    }

    pattern.replacen("%s", fill, 1)
}

/// Fill a printf-style template, replacing each `%s` with the next
/// substitution. Holes beyond the substitutions are left in place.
pub(crate) fn format_message(template: &str, subs: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut idx = 0;
    while let Some(pos) = rest.find("%s") {
        out.push_str(&rest[..pos]);
        if idx < subs.len() {
            out.push_str(subs[idx]);
            idx += 1;
        } else {
            out.push_str("%s");
        }
        rest = &rest[pos + 2..];
    }
    out.push_str(rest);
    out
}

/// Build an alert for a match at `loc` (byte offsets within `text`),
/// formatting the message and description with the matched text.
pub(crate) fn make_alert(def: &Definition, loc: (usize, usize), text: &str) -> Alert {
    let match_text = text.get(loc.0..loc.1).unwrap_or("").to_string();
    let message = format_message(&def.message, &[&match_text]);
    let description = format_message(&def.description, &[&match_text]);
    Alert {
        action: def.action.clone(),
        check: def.name.clone(),
        description,
        line: 1,
        link: def.link.clone(),
        message,
        severity: def.level,
        span: [loc.0, loc.1],
        match_text,
        hide: false,
    }
}

/// Join words into a readable list: "a", "a or b", "a, b, or c".
pub(crate) fn to_sentence(words: &[String], joiner: &str) -> String {
    match words.len() {
        0 => String::new(),
        1 => words[0].clone(),
        2 => format!("{} {} {}", words[0], joiner, words[1]),
        _ => {
            let head = words[..words.len() - 1].join(", ");
            format!("{}, {} {}", head, joiner, words[words.len() - 1])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_pattern_word() {
        let pattern = assemble_pattern(None, false, true, "", true, "foo|bar");
        assert_eq!(pattern, r"(?m)\b(?:foo|bar)\b");
    }

    #[test]
    fn test_assemble_pattern_nonword_ignorecase() {
        let pattern = assemble_pattern(None, true, false, "", true, "foo");
        assert_eq!(pattern, r"(?i)(?m)(?:foo)");
    }

    #[test]
    fn test_assemble_pattern_raw_prefix() {
        let pattern = assemble_pattern(None, false, false, r"(?s)", false, "x");
        assert_eq!(pattern, r"(?s)(?m)(?:x)");
    }

    #[test]
    fn test_assemble_pattern_custom_template() {
        let pattern = assemble_pattern(Some(r"\b%s\b"), false, true, "", true, "foo");
        assert_eq!(pattern, r"\bfoo\b");
    }

    #[test]
    fn test_format_message() {
        assert_eq!(
            format_message("Use '%s' instead of '%s'.", &["a", "b"]),
            "Use 'a' instead of 'b'."
        );
        assert_eq!(format_message("No holes.", &["x"]), "No holes.");
        assert_eq!(format_message("Left %s alone.", &[]), "Left %s alone.");
    }

    #[test]
    fn test_make_alert() {
        let def = Definition {
            name: "Style.Rule".to_string(),
            message: "Avoid '%s'.".to_string(),
            ..Definition::default()
        };
        let alert = make_alert(&def, (4, 7), "the foo bar");
        assert_eq!(alert.match_text, "foo");
        assert_eq!(alert.message, "Avoid 'foo'.");
        assert_eq!(alert.span, [4, 7]);
        assert_eq!(alert.severity, Severity::Warning);
    }

    #[test]
    fn test_to_sentence() {
        let words: Vec<String> = vec!["a".into(), "b".into(), "c".into()];
        assert_eq!(to_sentence(&words[..1], "or"), "a");
        assert_eq!(to_sentence(&words[..2], "or"), "a or b");
        assert_eq!(to_sentence(&words, "or"), "a, b, or c");
    }

    #[test]
    fn test_definition_defaults() {
        let def: Definition = serde_yaml::from_str("extends: existence\nmessage: hi").unwrap();
        assert_eq!(def.level, Severity::Warning);
        assert_eq!(def.scope, "text");
        assert_eq!(def.limit, 0);
    }
}
