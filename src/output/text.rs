//! Pretty terminal output formatter

use super::OutputFormatter;
use crate::alert::Severity;
use crate::file::File;
use colored::Colorize;

/// Human-readable output grouped by file, with a closing tally.
#[derive(Default)]
pub struct TextFormatter;

impl TextFormatter {
    pub fn new() -> Self {
        Self
    }
}

fn severity_label(severity: Severity) -> colored::ColoredString {
    match severity {
        Severity::Error => "error".red(),
        Severity::Warning => "warning".yellow(),
        Severity::Suggestion => "suggestion".blue(),
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, files: &[File]) -> String {
        let mut out = String::new();
        let mut errors = 0;
        let mut warnings = 0;
        let mut suggestions = 0;
        let mut touched = 0;

        for file in files {
            if file.alerts.is_empty() {
                continue;
            }
            touched += 1;

            out.push_str(&format!("\n {}\n", file.path.display().to_string().underline()));
            for alert in &file.alerts {
                match alert.severity {
                    Severity::Error => errors += 1,
                    Severity::Warning => warnings += 1,
                    Severity::Suggestion => suggestions += 1,
                }
                out.push_str(&format!(
                    " {:<7} {:<12} {}  {}\n",
                    format!("{}:{}", alert.line, alert.span[0]),
                    severity_label(alert.severity),
                    alert.message,
                    alert.check.dimmed()
                ));
            }
        }

        let symbol = if errors > 0 {
            "✖".red().to_string()
        } else if warnings > 0 {
            "✖".yellow().to_string()
        } else {
            "✔".green().to_string()
        };
        out.push_str(&format!(
            "\n{} {} errors, {} warnings and {} suggestions in {} file{}.\n",
            symbol,
            errors,
            warnings,
            suggestions,
            touched,
            if touched == 1 { "" } else { "s" }
        ));

        out
    }
}
