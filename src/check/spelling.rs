//! The `spelling` extension point

use super::{make_alert, CheckError, Definition};
use crate::alert::Alert;
use crate::file::File;
use crate::nlp;
use crate::spell::SpellModel;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Tokens skipped by default: URLs and paths, dotted acronyms, hex
/// literals, hyphenated and camel-cased compounds, anything numeric or
/// non-word, and handles.
static DEFAULT_FILTERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?:\w+)?\.\w{1,4}\b",
        r"\b(?:[a-zA-Z]\.){2,}",
        r"0[xX][0-9a-fA-F]+",
        r"\w+-\w+",
        r"[A-Z]{1}[a-z]+[A-Z]+\w+",
        r"[0-9]",
        r"[A-Z]+$",
        r"\W",
        r"\w{3,}\.\w{3,}",
        r"@.*\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Rejects tokens the spell model doesn't accept.
///
/// The model is a word-list dictionary shared across worker threads; it is
/// built once at compile time from the rule's `dic` file (or the
/// configured fallback) plus any `ignore` lists.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Spelling {
    #[serde(flatten)]
    pub definition: Definition,

    /// Path to a word list, absolute or relative to the styles directory.
    pub dic: String,

    /// Turns off the default filters.
    pub custom: bool,

    /// An array of patterns to ignore during spell checking.
    pub filters: Vec<String>,

    /// Word-list files (one word per line) to accept, relative to the
    /// styles directory.
    pub ignore: Vec<String>,

    /// An array of strings to be ignored.
    pub exceptions: Vec<String>,

    #[serde(skip)]
    model: Option<Arc<SpellModel>>,

    #[serde(skip)]
    compiled_filters: Vec<Regex>,

    #[serde(skip)]
    except_re: Option<Regex>,
}

fn resolve(path: &str, styles_path: Option<&Path>) -> PathBuf {
    let direct = PathBuf::from(path);
    if direct.is_absolute() || direct.exists() {
        return direct;
    }
    match styles_path {
        Some(base) => base.join(path),
        None => direct,
    }
}

impl Spelling {
    /// Build the model and filters. `fallback` is the configured default
    /// dictionary; `accepted` terms join the exceptions.
    pub fn compile(
        &mut self,
        styles_path: Option<&Path>,
        fallback: Option<&Path>,
        accepted: &[String],
    ) -> Result<(), CheckError> {
        let name = self.definition.name.clone();

        let dic_path = if !self.dic.is_empty() {
            resolve(&self.dic, styles_path)
        } else if let Some(fallback) = fallback {
            fallback.to_path_buf()
        } else {
            return Err(CheckError::Invalid {
                name,
                reason: "no dictionary: set 'dic' or configure a fallback word list".to_string(),
            });
        };

        let mut model =
            SpellModel::from_word_list_file(&dic_path).map_err(|e| CheckError::Invalid {
                name: name.clone(),
                reason: format!("cannot read '{}': {}", dic_path.display(), e),
            })?;

        for ignore in &self.ignore {
            let path = resolve(ignore, styles_path);
            model
                .add_word_list_file(&path)
                .map_err(|e| CheckError::Invalid {
                    name: name.clone(),
                    reason: format!("cannot read '{}': {}", path.display(), e),
                })?;
        }
        self.model = Some(Arc::new(model));

        for filter in &self.filters {
            self.compiled_filters
                .push(Regex::new(filter).map_err(|source| CheckError::Regex {
                    name: name.clone(),
                    source,
                })?);
        }

        self.exceptions.extend(accepted.iter().cloned());
        if !self.exceptions.is_empty() {
            self.except_re = Some(
                Regex::new(&format!("(?i){}", self.exceptions.join("|"))).map_err(|source| {
                    CheckError::Regex {
                        name: name.clone(),
                        source,
                    }
                })?,
            );
        }

        Ok(())
    }

    fn filtered(&self, word: &str) -> bool {
        if self.compiled_filters.iter().any(|f| f.is_match(word)) {
            return true;
        }
        !self.custom && DEFAULT_FILTERS.iter().any(|f| f.is_match(word))
    }

    pub fn run(&self, text: &str, _file: &mut File) -> Vec<Alert> {
        let Some(model) = &self.model else {
            return Vec::new();
        };

        let mut alerts = Vec::new();
        for (offset, word) in nlp::word_spans(text) {
            if self.filtered(word) {
                continue;
            }
            let known = model.spell(word);
            let excepted = self.except_re.as_ref().is_some_and(|re| re.is_match(word));
            if !known && !excepted {
                alerts.push(make_alert(
                    &self.definition,
                    (offset, offset + word.len()),
                    text,
                ));
            }
        }

        alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::io::Write;

    fn dictionary(words: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(words.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn compiled(yaml: &str, dic: &Path) -> Spelling {
        let mut rule: Spelling = serde_yaml::from_str(yaml).unwrap();
        rule.definition.name = "Test.Spelling".to_string();
        rule.compile(None, Some(dic), &[]).unwrap();
        rule
    }

    fn run(rule: &Spelling, text: &str) -> Vec<Alert> {
        let mut file = File::from_string(text, ".txt", &Config::new());
        rule.run(text, &mut file)
    }

    #[test]
    fn test_unknown_word_alerted() {
        let dic = dictionary("the\ncat\nsat\non\nmat");
        let rule = compiled(
            "extends: spelling\nmessage: \"Did you really mean '%s'?\"",
            dic.path(),
        );
        let alerts = run(&rule, "the cat zat on the mat");

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].match_text, "zat");
        assert_eq!(alerts[0].message, "Did you really mean 'zat'?");
    }

    #[test]
    fn test_default_filters() {
        let dic = dictionary("see");
        let rule = compiled("extends: spelling\nmessage: \"%s\"", dic.path());
        // Hex, camelCase, digits, and dotted names all pass the filters.
        assert!(run(&rule, "see 0xDEAD camelCase 42 file.txt").is_empty());
    }

    #[test]
    fn test_custom_disables_default_filters() {
        let dic = dictionary("see");
        let rule = compiled(
            "extends: spelling\nmessage: \"%s\"\ncustom: true",
            dic.path(),
        );
        assert!(!run(&rule, "see camelCase").is_empty());
    }

    #[test]
    fn test_ignore_list() {
        let dic = dictionary("the");
        let extra = dictionary("kubernetes");
        let yaml = format!(
            "extends: spelling\nmessage: \"%s\"\nignore: ['{}']",
            extra.path().display()
        );
        let rule = compiled(&yaml, dic.path());
        assert!(run(&rule, "the kubernetes").is_empty());
    }

    #[test]
    fn test_missing_dictionary_is_error() {
        let mut rule: Spelling =
            serde_yaml::from_str("extends: spelling\nmessage: m").unwrap();
        rule.definition.name = "Test.NoDic".to_string();
        assert!(rule.compile(None, None, &[]).is_err());
    }

    #[test]
    fn test_lowercase_retry() {
        let dic = dictionary("paris");
        let rule = compiled(
            "extends: spelling\nmessage: \"%s\"\ncustom: true",
            dic.path(),
        );
        // "Paris" isn't in the list, but its lowercase form is.
        assert!(run(&rule, "Paris").is_empty());
        assert!(!run(&rule, "Pariss").is_empty());
    }
}
