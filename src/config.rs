//! Project configuration
//!
//! Read from `.prosaic.yaml` (or `.prosaic.yml` / `prosaic.yaml`) in the
//! current directory or the user's home directory. Section-scoped overrides
//! are keyed by a filename glob and win over the global tables.

use crate::alert::Severity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Overrides for files matching a particular glob.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntaxSection {
    /// Styles applied to matching files (replaces the global list)
    pub based_on_styles: Vec<String>,

    /// Per-rule toggles (`Style.Rule: true|false`)
    pub checks: HashMap<String, bool>,

    /// Per-rule severity overrides
    pub levels: HashMap<String, Severity>,

    /// Block-level regexes blanked before scoping
    pub block_ignores: Vec<String>,

    /// Inline regexes replaced with same-length placeholders
    pub token_ignores: Vec<String>,

    /// Command converting matching files to HTML before scoping
    pub transform: Option<String>,
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding style directories and vocabularies
    pub styles_path: Option<PathBuf>,

    /// The lowest alert level to report
    pub min_alert_level: Severity,

    /// Styles applied to every file
    pub based_on_styles: Vec<String>,

    /// Per-rule severity overrides applied to every file
    pub levels: HashMap<String, Severity>,

    /// Project vocabulary name under `StylesPath/Vocab/`
    pub vocab: Option<String>,

    /// Template wrapped around word-level patterns; must contain one `%s`
    pub word_template: Option<String>,

    /// Markup scopes whose nodes stay in the tree but contribute no text
    pub ignored_scopes: Vec<String>,

    /// CSS classes treated like `ignored_scopes`
    pub ignored_classes: Vec<String>,

    /// Markup scopes excluded entirely
    pub skipped_scopes: Vec<String>,

    /// Accepted terms, in addition to the vocabulary files
    pub accepted_tokens: Vec<String>,

    /// Rejected terms, in addition to the vocabulary files
    pub rejected_tokens: Vec<String>,

    /// Block-level regexes blanked before scoping (all files)
    pub block_ignores: Vec<String>,

    /// Inline regexes replaced with same-length placeholders (all files)
    pub token_ignores: Vec<String>,

    /// Extension remapping (`mdx: md`)
    pub formats: HashMap<String, String>,

    /// Fallback word list for spelling rules without a `dic` of their own
    pub dictionary: Option<PathBuf>,

    /// Overrides keyed by a filename glob
    pub syntax: HashMap<String, SyntaxSection>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            styles_path: None,
            min_alert_level: Severity::Suggestion,
            based_on_styles: Vec::new(),
            levels: HashMap::new(),
            vocab: None,
            word_template: None,
            ignored_scopes: vec!["code".to_string(), "tt".to_string()],
            ignored_classes: Vec::new(),
            skipped_scopes: vec![
                "script".to_string(),
                "style".to_string(),
                "pre".to_string(),
                "figure".to_string(),
            ],
            accepted_tokens: Vec::new(),
            rejected_tokens: Vec::new(),
            block_ignores: Vec::new(),
            token_ignores: Vec::new(),
            formats: HashMap::new(),
            dictionary: None,
            syntax: HashMap::new(),
        }
    }
}

/// The configuration in force for one file: the global tables with every
/// matching syntax section folded in.
#[derive(Debug, Clone, Default)]
pub struct SectionView {
    pub based_on_styles: Vec<String>,
    pub checks: HashMap<String, bool>,
    pub levels: HashMap<String, Severity>,
    pub block_ignores: Vec<String>,
    pub token_ignores: Vec<String>,
    pub transform: Option<String>,
}

impl Config {
    /// Create default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations, falling back to defaults.
    pub fn load_default() -> Result<Self, ConfigError> {
        let names = [".prosaic.yaml", ".prosaic.yml", "prosaic.yaml"];

        for name in &names {
            let path = PathBuf::from(name);
            if path.exists() {
                return Self::load(&path);
            }
        }

        if let Some(home) = std::env::var_os("HOME") {
            for name in &names {
                let path = PathBuf::from(&home).join(name);
                if path.exists() {
                    return Self::load(&path);
                }
            }
        }

        Ok(Self::default())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(template) = &self.word_template {
            if !template.contains("%s") {
                return Err(ConfigError::Invalid(
                    "word_template must contain a %s placeholder".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Merge CLI arguments into configuration
    pub fn merge_cli(&mut self, min_alert_level: Option<Severity>, styles: Option<Vec<String>>) {
        if let Some(level) = min_alert_level {
            self.min_alert_level = level;
        }
        if let Some(styles) = styles {
            self.based_on_styles = styles;
        }
    }

    /// Resolve the overrides in force for `path`.
    ///
    /// Sections are folded in glob-key order, so a later matching section
    /// wins over an earlier one, and every section wins over the globals.
    pub fn section_view(&self, path: &Path) -> SectionView {
        let mut view = SectionView {
            based_on_styles: self.based_on_styles.clone(),
            checks: HashMap::new(),
            levels: self.levels.clone(),
            block_ignores: self.block_ignores.clone(),
            token_ignores: self.token_ignores.clone(),
            transform: None,
        };

        let candidate = path.to_string_lossy();
        let mut keys: Vec<&String> = self.syntax.keys().collect();
        keys.sort();

        for key in keys {
            let matched = globset::Glob::new(key)
                .map(|g| {
                    let matcher = g.compile_matcher();
                    matcher.is_match(candidate.as_ref())
                        || path
                            .file_name()
                            .is_some_and(|n| matcher.is_match(n.to_string_lossy().as_ref()))
                })
                .unwrap_or(false);
            if !matched {
                continue;
            }

            let section = &self.syntax[key];
            if !section.based_on_styles.is_empty() {
                view.based_on_styles = section.based_on_styles.clone();
            }
            view.checks.extend(section.checks.clone());
            view.levels.extend(section.levels.clone());
            view.block_ignores.extend(section.block_ignores.clone());
            view.token_ignores.extend(section.token_ignores.clone());
            if section.transform.is_some() {
                view.transform = section.transform.clone();
            }
        }

        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::new();
        assert_eq!(config.min_alert_level, Severity::Suggestion);
        assert_eq!(config.ignored_scopes, vec!["code", "tt"]);
        assert_eq!(
            config.skipped_scopes,
            vec!["script", "style", "pre", "figure"]
        );
    }

    #[test]
    fn test_yaml_deserialize() {
        let yaml = r#"
styles_path: styles
min_alert_level: warning
based_on_styles: [House]
syntax:
  "*.md":
    checks:
      House.Passive: false
    levels:
      House.Wordy: error
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.styles_path, Some(PathBuf::from("styles")));
        assert_eq!(config.min_alert_level, Severity::Warning);
        assert_eq!(config.based_on_styles, vec!["House"]);
        assert_eq!(config.syntax.len(), 1);
    }

    #[test]
    fn test_section_view_overrides() {
        let yaml = r#"
based_on_styles: [House]
levels:
  House.Wordy: suggestion
syntax:
  "*.md":
    based_on_styles: [Docs]
    checks:
      House.Passive: false
    levels:
      House.Wordy: error
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();

        let view = config.section_view(Path::new("guide/intro.md"));
        assert_eq!(view.based_on_styles, vec!["Docs"]);
        assert_eq!(view.checks.get("House.Passive"), Some(&false));
        // The syntax section wins over the global level table.
        assert_eq!(view.levels.get("House.Wordy"), Some(&Severity::Error));

        let view = config.section_view(Path::new("notes.txt"));
        assert_eq!(view.based_on_styles, vec!["House"]);
        assert!(view.checks.is_empty());
        assert_eq!(view.levels.get("House.Wordy"), Some(&Severity::Suggestion));
    }

    #[test]
    fn test_invalid_word_template() {
        let mut config = Config::new();
        config.word_template = Some(r"\b(?:x)\b".to_string());
        assert!(config.validate().is_err());

        config.word_template = Some(r"\b(?:%s)\b".to_string());
        assert!(config.validate().is_ok());
    }
}
