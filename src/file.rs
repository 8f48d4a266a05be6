//! Per-document state
//!
//! A `File` owns everything the pipeline accumulates while linting one
//! document: the normalized content, its lossless line split, in-text
//! comment-control state, the running summary for document-level rules,
//! and the alert list with duplicate suppression.

use crate::alert::{Alert, Severity};
use crate::config::Config;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

/// Document format class, derived from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Prose,
    Markup,
    Code,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Prose => write!(f, "prose"),
            Format::Markup => write!(f, "markup"),
            Format::Code => write!(f, "code"),
        }
    }
}

/// A linted text document.
#[derive(Debug)]
pub struct File {
    /// The full path
    pub path: PathBuf,

    /// The actual file extension (with leading dot)
    pub real_ext: String,

    /// The normalized extension (e.g., `markdown` -> `md`)
    pub normed_ext: String,

    /// Format class
    pub format: Format,

    /// The normalized file contents
    pub content: String,

    /// `content` split after each newline; concatenation is lossless
    pub lines: Vec<String>,

    /// Styles assigned to this file
    pub base_styles: Vec<String>,

    /// Per-rule toggles assigned to this file
    pub checks: HashMap<String, bool>,

    /// Per-rule severity overrides for this file
    pub levels: HashMap<String, Severity>,

    /// Optional command converting this file to HTML before scoping
    pub transform: Option<String>,

    /// Lint line-by-line, ignoring markup structure
    pub simple: bool,

    /// Accumulated prose for document-level rules
    pub summary: String,

    /// Cross-scope tracking (e.g., defined abbreviations)
    pub sequences: Vec<String>,

    /// All alerts associated with this file
    pub alerts: Vec<Alert>,

    /// Comment-control state (`"off"` or a rule name -> suppressed?)
    comments: HashMap<String, bool>,

    /// Reported (line, column, check) triples, for duplicate suppression
    history: HashSet<(usize, usize, String)>,

    /// Per-check search contexts used by the localizer
    pub(crate) contexts: HashMap<String, String>,

    /// Alerts retained so far per rule, for `limit` enforcement
    counts: HashMap<String, usize>,
}

/// Normalize raw source: CRLF to LF, leading BOM trimmed, zero-width
/// spaces stripped.
pub fn normalize(text: &str) -> String {
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
    text.replace("\r\n", "\n").replace('\u{200B}', "")
}

/// Split content after each newline so that concatenation is lossless.
pub fn split_lines(content: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut start = 0;
    for (idx, b) in content.bytes().enumerate() {
        if b == b'\n' {
            lines.push(content[start..=idx].to_string());
            start = idx + 1;
        }
    }
    if start < content.len() || content.is_empty() {
        lines.push(content[start..].to_string());
    }
    lines
}

/// Map an extension to its normalized form and format class.
pub fn format_from_ext(ext: &str, overrides: &HashMap<String, String>) -> (String, Format) {
    let mut ext = ext.trim_start_matches('.').to_lowercase();
    if let Some(mapped) = overrides.get(&ext) {
        ext = mapped.trim_start_matches('.').to_lowercase();
    }

    let normed = match ext.as_str() {
        "markdown" | "mdown" | "mkd" => "md",
        "htm" => "html",
        "asciidoc" => "adoc",
        other => other,
    };

    let format = match normed {
        "md" | "html" | "xml" | "rst" | "adoc" | "org" | "dita" => Format::Markup,
        "rs" | "go" | "py" | "js" | "ts" | "c" | "h" | "cpp" | "cc" | "hpp" | "java" | "cs"
        | "rb" | "php" | "swift" | "kt" | "scala" | "sh" => Format::Code,
        _ => Format::Prose,
    };

    (normed.to_string(), format)
}

static COMMENT_CONTROL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^vale (\w+\.\w+) = (YES|NO)$").unwrap());

impl File {
    /// Read and initialize a file from disk.
    pub fn new(path: &Path, config: &Config) -> std::io::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let real_ext = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        Ok(Self::from_parts(path.to_path_buf(), &raw, &real_ext, config))
    }

    /// Initialize a file from an in-memory string (stdin linting).
    pub fn from_string(content: &str, ext: &str, config: &Config) -> Self {
        let path = PathBuf::from(format!("stdin{}", ext));
        Self::from_parts(path, content, ext, config)
    }

    fn from_parts(path: PathBuf, raw: &str, real_ext: &str, config: &Config) -> Self {
        let content = normalize(raw);
        let lines = split_lines(&content);
        let (normed_ext, format) = format_from_ext(real_ext, &config.formats);
        let view = config.section_view(&path);

        Self {
            path,
            real_ext: real_ext.to_string(),
            normed_ext,
            format,
            content,
            lines,
            base_styles: view.based_on_styles,
            checks: view.checks,
            levels: view.levels,
            transform: view.transform,
            simple: false,
            summary: String::new(),
            sequences: Vec::new(),
            alerts: Vec::new(),
            comments: HashMap::new(),
            history: HashSet::new(),
            contexts: HashMap::new(),
            counts: HashMap::new(),
        }
    }

    /// Whether a rule is assigned to this file.
    ///
    /// A rule runs when its style is among the file's base styles, or when
    /// the file's per-rule table enables it explicitly. The built-in
    /// vocabulary style is always assigned. A per-rule `false` wins.
    pub fn check_assigned(&self, name: &str) -> bool {
        if let Some(&enabled) = self.checks.get(name) {
            return enabled;
        }
        let style = name.split('.').next().unwrap_or(name);
        style == "Prosaic" || self.base_styles.iter().any(|s| s == style)
    }

    /// Update comment-control state from an in-text directive.
    pub fn update_comments(&mut self, comment: &str) {
        let comment = comment.trim();
        if comment == "vale off" {
            self.comments.insert("off".to_string(), true);
        } else if comment == "vale on" {
            self.comments.insert("off".to_string(), false);
        } else if let Some(caps) = COMMENT_CONTROL_RE.captures(comment) {
            self.comments
                .insert(caps[1].to_string(), &caps[2] == "NO");
        }
    }

    /// Whether an in-text comment currently suppresses this check.
    pub fn query_comments(&self, check: &str) -> bool {
        let off = self.comments.get("off").copied().unwrap_or(false);
        if !off {
            if let Some(&status) = self.comments.get(check) {
                return status;
            }
        }
        off
    }

    /// Append a located alert, honoring duplicate suppression and the
    /// rule's per-file rate limit (0 = unlimited).
    pub fn push_alert(&mut self, alert: Alert, limit: usize) {
        if alert.hide {
            return;
        }
        let key = (alert.line, alert.span[0], alert.check.clone());
        if self.history.contains(&key) {
            return;
        }
        let count = self.counts.entry(alert.check.clone()).or_insert(0);
        if limit > 0 && *count >= limit {
            return;
        }
        *count += 1;
        self.history.insert(key);
        self.alerts.push(alert);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("a\r\nb"), "a\nb");
        assert_eq!(normalize("\u{FEFF}hi"), "hi");
        assert_eq!(normalize("a\u{200B}b"), "ab");
    }

    #[test]
    fn test_normalize_idempotent() {
        let once = normalize("\u{FEFF}a\r\nb\u{200B}c");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_split_lines_lossless() {
        let content = "one\ntwo\nthree";
        let lines = split_lines(content);
        assert_eq!(lines, vec!["one\n", "two\n", "three"]);
        assert_eq!(lines.concat(), content);

        let content = "trailing\n";
        let lines = split_lines(content);
        assert_eq!(lines, vec!["trailing\n"]);
        assert_eq!(lines.concat(), content);
    }

    #[test]
    fn test_format_from_ext() {
        let overrides = HashMap::new();
        assert_eq!(
            format_from_ext(".md", &overrides),
            ("md".to_string(), Format::Markup)
        );
        assert_eq!(
            format_from_ext(".py", &overrides),
            ("py".to_string(), Format::Code)
        );
        assert_eq!(
            format_from_ext(".txt", &overrides),
            ("txt".to_string(), Format::Prose)
        );
        assert_eq!(
            format_from_ext(".weird", &overrides),
            ("weird".to_string(), Format::Prose)
        );
    }

    #[test]
    fn test_format_overrides() {
        let mut overrides = HashMap::new();
        overrides.insert("mdx".to_string(), "md".to_string());
        assert_eq!(
            format_from_ext(".mdx", &overrides),
            ("md".to_string(), Format::Markup)
        );
    }

    #[test]
    fn test_comment_control() {
        let config = Config::new();
        let mut file = File::from_string("text", ".txt", &config);

        assert!(!file.query_comments("Style.Rule"));

        file.update_comments("vale off");
        assert!(file.query_comments("Style.Rule"));

        file.update_comments("vale on");
        assert!(!file.query_comments("Style.Rule"));

        file.update_comments("vale Style.Rule = NO");
        assert!(file.query_comments("Style.Rule"));
        assert!(!file.query_comments("Other.Rule"));

        file.update_comments("vale Style.Rule = YES");
        assert!(!file.query_comments("Style.Rule"));
    }

    #[test]
    fn test_check_assigned() {
        let mut config = Config::new();
        config.based_on_styles = vec!["House".to_string()];
        let mut file = File::from_string("text", ".txt", &config);

        assert!(file.check_assigned("House.Wordy"));
        assert!(!file.check_assigned("Other.Rule"));
        assert!(file.check_assigned("Prosaic.Terms"));

        file.checks.insert("House.Wordy".to_string(), false);
        assert!(!file.check_assigned("House.Wordy"));

        file.checks.insert("Other.Rule".to_string(), true);
        assert!(file.check_assigned("Other.Rule"));
    }

    #[test]
    fn test_push_alert_dedup_and_limit() {
        let config = Config::new();
        let mut file = File::from_string("text", ".txt", &config);

        let mut alert = Alert::new("Style.Rule", Severity::Warning, "msg");
        alert.line = 1;
        alert.span = [3, 6];

        file.push_alert(alert.clone(), 0);
        file.push_alert(alert.clone(), 0);
        assert_eq!(file.alerts.len(), 1);

        alert.span = [8, 11];
        file.push_alert(alert.clone(), 2);
        alert.span = [12, 15];
        file.push_alert(alert.clone(), 2);
        // Two alerts already retained for this rule; the limit drops the rest.
        alert.span = [16, 19];
        file.push_alert(alert.clone(), 2);
        assert_eq!(file.alerts.len(), 2);
    }

    #[test]
    fn test_hidden_alert_dropped() {
        let config = Config::new();
        let mut file = File::from_string("text", ".txt", &config);
        let mut alert = Alert::new("Style.Rule", Severity::Warning, "msg");
        alert.hide = true;
        file.push_alert(alert, 0);
        assert!(file.alerts.is_empty());
    }
}
