//! Prosaic - A Command-Line Prose Linter
//!
//! A fast, extensible linter for prose: plain text, Markdown, HTML/XML,
//! and the comments of source code. Rules are plain-text YAML manifests
//! grouped into styles; the engine compiles them into matchers and
//! evaluates them against scoped spans of each document.
//!
//! # Architecture
//!
//! ```text
//! CLI -> Linter -> Scoper -> Dispatcher -> Check -> Localizer -> Alerts
//! ```
//!
//! The registry compiles every style manifest at startup; the scoper turns
//! each document into selector-tagged segments; the dispatcher routes
//! segments to the rules whose scope they contain; the localizer maps each
//! match back to an exact line and column in the source.
//!
//! # Writing a rule
//!
//! Create a YAML manifest (e.g., `styles/House/Wordy.yml`):
//!
//! ```yaml
//! extends: substitution
//! message: "Use '%s' instead of '%s'."
//! level: warning
//! ignorecase: true
//! swap:
//!   utilize: use
//!   in order to: to
//! ```
//!
//! The rule is then addressable as `House.Wordy`.

pub mod alert;
pub mod check;
pub mod config;
pub mod file;
pub mod lint;
pub mod locate;
pub mod nlp;
pub mod output;
pub mod scope;
pub mod selector;
pub mod spell;

// Re-export main types
pub use alert::{Action, Alert, Severity};
pub use check::{Check, CheckError, Definition, Registry};
pub use config::{Config, ConfigError};
pub use file::{File, Format};
pub use lint::{LintError, Linter};
pub use output::{JsonFormatter, LineFormatter, OutputFormatter, TextFormatter};
pub use scope::Segment;
pub use selector::Selector;
pub use spell::SpellModel;
