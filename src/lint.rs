//! The linting orchestrator
//!
//! Discovers input files, runs them through the scoped pipeline (scope →
//! dispatch → match → localize), and collects the per-file results. Files
//! are linted in parallel on a bounded worker pool; everything within one
//! file is sequential, since comment state, cross-scope sequences, and the
//! dedup history mutate in document order.

use crate::alert::sort_alerts;
use crate::check::Registry;
use crate::config::Config;
use crate::file::File;
use crate::locate;
use crate::scope::{self, Segment};
use crate::selector::Selector;
use log::warn;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Linting error
#[derive(Debug, Error)]
pub enum LintError {
    #[error("cannot read {path}: {source}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

/// The main linter.
pub struct Linter {
    config: Config,
    registry: Registry,
    /// Sort output by path instead of arrival order
    pub sorted: bool,
    /// Lint every file as plain prose
    pub simple: bool,
    /// Restrict directory walks to this glob
    pub glob: Option<glob::Pattern>,
    /// Worker threads (0 = auto-detect)
    pub jobs: usize,
}

impl Linter {
    /// Create a linter over a compiled registry.
    pub fn new(config: Config, registry: Registry) -> Self {
        Self {
            config,
            registry,
            sorted: false,
            simple: false,
            glob: None,
            jobs: 0,
        }
    }

    /// Rule-load errors accumulated while building the registry.
    pub fn registry_errors(&self) -> &[crate::check::CheckError] {
        self.registry.errors.as_slice()
    }

    /// Lint the given paths (files, directories, or glob patterns).
    pub fn lint(&self, inputs: &[String]) -> Result<Vec<File>, LintError> {
        let mut paths = Vec::new();
        for input in inputs {
            self.expand(input, &mut paths)?;
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(if self.jobs > 0 {
                self.jobs
            } else {
                num_cpus::get()
            })
            .build();

        let mut files: Vec<File> = match pool {
            Ok(pool) => pool.install(|| {
                paths
                    .par_iter()
                    .filter_map(|p| self.lint_path(p))
                    .collect()
            }),
            Err(_) => paths.iter().filter_map(|p| self.lint_path(p)).collect(),
        };

        if self.sorted {
            files.sort_by(|a, b| a.path.cmp(&b.path));
        }
        Ok(files)
    }

    /// Lint one in-memory string (stdin mode).
    pub fn lint_string(&self, content: &str, ext: &str) -> File {
        let mut file = File::from_string(content, ext, &self.config);
        file.simple = self.simple;
        self.run_checks(&mut file);
        file
    }

    fn expand(&self, input: &str, out: &mut Vec<PathBuf>) -> Result<(), LintError> {
        let path = Path::new(input);
        if path.is_file() {
            out.push(path.to_path_buf());
        } else if path.is_dir() {
            for entry in walkdir::WalkDir::new(path)
                .sort_by_file_name()
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| e.file_type().is_file())
            {
                let keep = match &self.glob {
                    Some(pattern) => entry
                        .path()
                        .file_name()
                        .is_some_and(|n| pattern.matches(&n.to_string_lossy())),
                    None => true,
                };
                if keep {
                    out.push(entry.path().to_path_buf());
                }
            }
        } else {
            for found in glob::glob(input)?.filter_map(Result::ok) {
                if found.is_file() {
                    out.push(found);
                }
            }
        }
        Ok(())
    }

    /// A read failure skips the file and continues with the rest.
    fn lint_path(&self, path: &Path) -> Option<File> {
        match File::new(path, &self.config) {
            Ok(mut file) => {
                file.simple = self.simple;
                self.run_checks(&mut file);
                Some(file)
            }
            Err(e) => {
                warn!("skipping {}: {}", path.display(), e);
                None
            }
        }
    }

    fn run_checks(&self, file: &mut File) {
        let section = self.config.section_view(&file.path);
        let scoped = scope::scope(file, &self.config, &section);

        let mut directives = scoped.directives.iter().peekable();
        for segment in &scoped.segments {
            while directives
                .peek()
                .is_some_and(|d| d.offset <= segment.origin)
            {
                if let Some(directive) = directives.next() {
                    file.update_comments(&directive.command);
                }
            }

            if segment.summary && !segment.text.trim().is_empty() {
                file.summary.push_str(&segment.text);
                file.summary.push_str("\n\n");
            }
            if segment.text.trim().is_empty() {
                continue;
            }

            self.dispatch(file, segment, false);
        }

        // Directives after the last segment still apply to the summary pass.
        for directive in directives {
            file.update_comments(&directive.command);
        }

        let summary_segment = Segment {
            text: file.summary.clone(),
            selector: Selector::new("summary"),
            origin: 0,
            summary: false,
        };
        if !summary_segment.text.trim().is_empty() {
            self.dispatch(file, &summary_segment, true);
        }

        let min = self.config.min_alert_level;
        file.alerts.retain(|a| a.severity >= min);
        sort_alerts(&mut file.alerts);
    }

    fn dispatch(&self, file: &mut File, segment: &Segment, summary_pass: bool) {
        for (name, check) in self.registry.checks() {
            let selector = check.selector();
            if selector.is_summary() != summary_pass {
                continue;
            }
            if !summary_pass && !segment.selector.contains(&selector) {
                continue;
            }
            if !file.check_assigned(name) || file.query_comments(name) {
                continue;
            }

            let alerts = check.run(&segment.text, file);
            for mut alert in alerts {
                if alert.match_text.is_empty() {
                    continue;
                }
                if let Some(&level) = file.levels.get(alert.check.as_str()) {
                    alert.severity = level;
                }
                if locate::locate(file, segment, &mut alert) {
                    file.push_alert(alert, check.limit());
                }
            }
        }
    }
}
