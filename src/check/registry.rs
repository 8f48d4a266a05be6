//! Rule registry
//!
//! Loads every style under the configured styles directory, compiles each
//! manifest into a [`Check`], and synthesizes the vocabulary rules. Load
//! errors accumulate instead of aborting: a broken manifest costs that one
//! rule, nothing else. The registry is immutable once built and shared
//! freely across worker threads.

use super::{
    capitalization::Capitalization, conditional::Conditional, consistency::Consistency,
    existence::Existence, occurrence::Occurrence, readability::Readability,
    repetition::Repetition, sequence::Sequence, spelling::Spelling, substitution::Substitution,
    Check, CheckError, EXTENSION_POINTS,
};
use crate::config::Config;
use log::debug;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::Path;
use walkdir::WalkDir;

/// All compiled checks, keyed by qualified name.
#[derive(Default)]
pub struct Registry {
    checks: BTreeMap<String, Check>,
    /// Rule-load errors, reported as diagnostics before alert output.
    pub errors: Vec<CheckError>,
    word_template: Option<String>,
    accepted: Vec<String>,
}

/// A term is a plain phrase when it carries no pattern metacharacters.
fn is_phrase(term: &str) -> bool {
    term.chars()
        .all(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '\'' | '’'))
}

fn read_terms(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .map(|content| {
            content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#'))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

impl Registry {
    /// Build the registry from the configuration: vocabulary first (its
    /// accepted terms become exceptions during compilation), then every
    /// style on the styles path.
    pub fn new(config: &Config) -> Self {
        let mut registry = Self {
            word_template: config.word_template.clone(),
            ..Self::default()
        };

        registry.accepted = config.accepted_tokens.clone();
        let mut rejected = config.rejected_tokens.clone();

        if let (Some(styles_path), Some(vocab)) = (&config.styles_path, &config.vocab) {
            let base = styles_path.join("Vocab").join(vocab);
            registry.accepted.extend(read_terms(&base.join("accept.txt")));
            rejected.extend(read_terms(&base.join("reject.txt")));
        }

        if let Some(styles_path) = &config.styles_path {
            registry.load_styles(styles_path, config);
        }

        registry.load_vocab_rules(&rejected, config);
        registry
    }

    /// An empty registry that compiles rules on demand (used by tests and
    /// the `new-rule` tooling).
    pub fn empty(config: &Config) -> Self {
        Self {
            word_template: config.word_template.clone(),
            ..Self::default()
        }
    }

    /// Iterate all checks in name order.
    pub fn checks(&self) -> impl Iterator<Item = (&String, &Check)> {
        self.checks.iter()
    }

    /// Look up one check by qualified name.
    pub fn get(&self, name: &str) -> Option<&Check> {
        self.checks.get(name)
    }

    /// Number of compiled checks.
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// Whether the registry holds no checks.
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    fn load_styles(&mut self, styles_path: &Path, config: &Config) {
        for entry in WalkDir::new(styles_path)
            .min_depth(2)
            .max_depth(2)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
        {
            let path = entry.path();
            if !path
                .extension()
                .is_some_and(|e| e == "yml" || e == "yaml")
            {
                continue;
            }
            let style = match path.parent().and_then(|p| p.file_name()) {
                Some(style) if style != "Vocab" => style.to_string_lossy().to_string(),
                _ => continue,
            };
            let rule = match path.file_stem() {
                Some(stem) => stem.to_string_lossy().to_string(),
                None => continue,
            };

            let name = format!("{}.{}", style, rule);
            let source = match std::fs::read_to_string(path) {
                Ok(source) => source,
                Err(e) => {
                    self.errors.push(CheckError::Invalid {
                        name,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            if let Err(e) = self.compile(&name, &source, config) {
                self.errors.push(e);
            }
        }
    }

    /// Decode, validate, and compile one manifest under the given
    /// qualified name.
    pub fn compile(&mut self, name: &str, source: &str, config: &Config) -> Result<(), CheckError> {
        let generic: Value = serde_yaml::from_str(source).map_err(|source| CheckError::Yaml {
            name: name.to_string(),
            source,
        })?;

        let extends = match generic.get("extends").and_then(Value::as_str) {
            Some(point) if EXTENSION_POINTS.contains(&point) => point.to_string(),
            Some(point) => {
                return Err(CheckError::UnknownExtensionPoint {
                    name: name.to_string(),
                    point: point.to_string(),
                })
            }
            None => {
                return Err(CheckError::MissingKey {
                    name: name.to_string(),
                    key: "extends".to_string(),
                })
            }
        };
        if generic.get("message").and_then(Value::as_str).is_none() {
            return Err(CheckError::MissingKey {
                name: name.to_string(),
                key: "message".to_string(),
            });
        }

        debug!("compiling {} ({})", name, extends);
        let template = self.word_template.as_deref();
        let yaml_err = |source| CheckError::Yaml {
            name: name.to_string(),
            source,
        };

        match extends.as_str() {
            "existence" => {
                let mut rule: Existence = serde_yaml::from_value(generic).map_err(yaml_err)?;
                rule.definition.name = name.to_string();
                rule.compile(template)?;
                self.insert(name, Check::Existence(rule));
            }
            "substitution" => {
                let mut rule: Substitution = serde_yaml::from_value(generic).map_err(yaml_err)?;
                rule.definition.name = name.to_string();
                rule.compile(template)?;
                self.insert(name, Check::Substitution(rule));
            }
            "occurrence" => {
                let mut rule: Occurrence = serde_yaml::from_value(generic).map_err(yaml_err)?;
                rule.definition.name = name.to_string();
                rule.compile()?;
                self.insert(name, Check::Occurrence(rule));
            }
            "repetition" => {
                let mut rule: Repetition = serde_yaml::from_value(generic).map_err(yaml_err)?;
                rule.definition.name = name.to_string();
                rule.compile()?;
                self.insert(name, Check::Repetition(rule));
            }
            "consistency" => {
                let mut rule: Consistency = serde_yaml::from_value(generic).map_err(yaml_err)?;
                rule.definition.name = name.to_string();
                for instance in rule.compile_all(template)? {
                    let key = instance.definition.name.clone();
                    self.insert(&key, Check::Consistency(instance));
                }
            }
            "conditional" => {
                let mut rule: Conditional = serde_yaml::from_value(generic).map_err(yaml_err)?;
                rule.definition.name = name.to_string();
                rule.compile(&self.accepted)?;
                self.insert(name, Check::Conditional(rule));
            }
            "capitalization" => {
                let mut rule: Capitalization =
                    serde_yaml::from_value(generic).map_err(yaml_err)?;
                rule.definition.name = name.to_string();
                rule.compile(&self.accepted)?;
                self.insert(name, Check::Capitalization(rule));
            }
            "readability" => {
                let mut rule: Readability = serde_yaml::from_value(generic).map_err(yaml_err)?;
                rule.definition.name = name.to_string();
                rule.compile()?;
                self.insert(name, Check::Readability(rule));
            }
            "spelling" => {
                let mut rule: Spelling = serde_yaml::from_value(generic).map_err(yaml_err)?;
                rule.definition.name = name.to_string();
                rule.compile(
                    config.styles_path.as_deref(),
                    config.dictionary.as_deref(),
                    &self.accepted,
                )?;
                self.insert(name, Check::Spelling(rule));
            }
            "sequence" => {
                let mut rule: Sequence = serde_yaml::from_value(generic).map_err(yaml_err)?;
                rule.definition.name = name.to_string();
                rule.compile(template)?;
                self.insert(name, Check::Sequence(rule));
            }
            _ => unreachable!("extension point validated above"),
        }

        Ok(())
    }

    fn insert(&mut self, name: &str, check: Check) {
        // First definition wins, matching style-load order.
        self.checks.entry(name.to_string()).or_insert(check);
    }

    /// Synthesize the vocabulary rules: accepted terms become a
    /// substitution enforcing their casing, rejected terms an existence
    /// rule.
    fn load_vocab_rules(&mut self, rejected: &[String], config: &Config) {
        if !self.accepted.is_empty() {
            let mut swaps = Vec::new();
            for term in &self.accepted {
                if is_phrase(term) {
                    swaps.push(format!("  {}: {}", term.to_lowercase(), term));
                }
            }
            if !swaps.is_empty() {
                let source = format!(
                    "extends: substitution\nmessage: \"Use '%s' instead of '%s'.\"\nlevel: error\nignorecase: true\nswap:\n{}\n",
                    swaps.join("\n")
                );
                if let Err(e) = self.compile("Prosaic.Terms", &source, config) {
                    self.errors.push(e);
                }
            }
        }

        if !rejected.is_empty() {
            let source = format!(
                "extends: existence\nmessage: \"Avoid using '%s'.\"\nlevel: error\ntokens:\n{}\n",
                rejected
                    .iter()
                    .map(|t| format!("  - {}", t))
                    .collect::<Vec<_>>()
                    .join("\n")
            );
            if let Err(e) = self.compile("Prosaic.Avoid", &source, config) {
                self.errors.push(e);
            }
        }
    }
}
