//! One-line-per-alert output formatter

use super::OutputFormatter;
use crate::file::File;

/// Compact `path:line:col:Check:message` output for editors and scripts.
#[derive(Default)]
pub struct LineFormatter;

impl LineFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl OutputFormatter for LineFormatter {
    fn format(&self, files: &[File]) -> String {
        let mut out = String::new();
        for file in files {
            for alert in &file.alerts {
                out.push_str(&format!(
                    "{}:{}:{}:{}:{}\n",
                    file.path.display(),
                    alert.line,
                    alert.span[0],
                    alert.check,
                    alert.message
                ));
            }
        }
        out
    }
}
