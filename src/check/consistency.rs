//! The `consistency` extension point

use super::{assemble_pattern, make_alert, CheckError, Definition};
use crate::alert::Alert;
use crate::file::File;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Ensures that only one of two spellings appears in a file.
///
/// Each `either` pair compiles to its own check with one named capture
/// group per option. Matched group names accumulate in `file.sequences`;
/// once both members have been seen, the latest match is reported under
/// the parent rule's name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Consistency {
    #[serde(flatten)]
    pub definition: Definition,

    /// Removes the default word boundaries.
    pub nonword: bool,

    /// Makes all matches case-insensitive.
    pub ignorecase: bool,

    /// A map of `option 1: option 2` pairs, of which only one may appear.
    pub either: BTreeMap<String, String>,

    #[serde(skip)]
    pattern: Option<Regex>,

    /// The two group names this instance watches for.
    #[serde(skip)]
    options: Vec<String>,

    /// The parent rule name reported in alerts.
    #[serde(skip)]
    parent: String,
}

fn group_key(name: &str, n: usize) -> String {
    let base: String = name
        .split('.')
        .next_back()
        .unwrap_or(name)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    format!("p{}{}", base, n)
}

impl Consistency {
    /// Compile one check per `either` pair.
    pub fn compile_all(self, word_template: Option<&str>) -> Result<Vec<Consistency>, CheckError> {
        let parent = self.definition.name.clone();
        let mut compiled = Vec::new();
        let mut counter = 0;

        for (first, second) in &self.either {
            counter += 2;
            let groups = [
                group_key(&parent, counter),
                group_key(&parent, counter + 1),
            ];
            let body = format!("(?P<{}>{})|(?P<{}>{})", groups[0], first, groups[1], second);
            let pattern = assemble_pattern(
                word_template,
                self.ignorecase,
                !self.nonword,
                "",
                true,
                &body,
            );

            let mut instance = self.clone();
            instance.parent = parent.clone();
            instance.definition.name = format!("{}.{}", parent, first);
            instance.options = groups.to_vec();
            instance.pattern =
                Some(Regex::new(&pattern).map_err(|source| CheckError::Regex {
                    name: instance.definition.name.clone(),
                    source,
                })?);
            compiled.push(instance);
        }

        Ok(compiled)
    }

    pub fn run(&self, text: &str, file: &mut File) -> Vec<Alert> {
        let Some(pattern) = &self.pattern else {
            return Vec::new();
        };

        let mut last_loc = None;
        for caps in pattern.captures_iter(text) {
            for name in &self.options {
                if let Some(group) = caps.name(name) {
                    last_loc = Some((group.start(), group.end()));
                    file.sequences.push(name.clone());
                }
            }
        }

        let both_seen = self
            .options
            .iter()
            .all(|opt| file.sequences.iter().any(|s| s == opt));
        match last_loc {
            Some(loc) if both_seen => {
                let mut parent_def = self.definition.clone();
                parent_def.name = self.parent.clone();
                vec![make_alert(&parent_def, loc, text)]
            }
            _ => Vec::new(),
        }
    }
}
