//! JSON output formatter

use super::OutputFormatter;
use crate::file::File;
use std::collections::BTreeMap;

/// Machine-readable output: a map from path to its alerts.
#[derive(Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, files: &[File]) -> String {
        let mut by_path = BTreeMap::new();
        for file in files {
            by_path.insert(file.path.display().to_string(), &file.alerts);
        }
        serde_json::to_string_pretty(&by_path).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::{Alert, Severity};
    use crate::config::Config;

    #[test]
    fn test_json_shape() {
        let mut file = File::from_string("smart phone", ".txt", &Config::new());
        let mut alert = Alert::new(
            "Test.Sub",
            Severity::Warning,
            "Use 'smartphone' instead of 'smart phone'.",
        );
        alert.line = 1;
        alert.span = [1, 12];
        alert.match_text = "smart phone".to_string();
        file.alerts.push(alert);

        let output = JsonFormatter::new().format(&[file]);
        assert!(output.contains("\"stdin.txt\""));
        assert!(output.contains("\"Check\": \"Test.Sub\""));
        assert!(output.contains("\"Severity\": \"warning\""));
        assert!(output.contains("\"Span\": ["));
    }

    #[test]
    fn test_empty_file_list() {
        assert_eq!(JsonFormatter::new().format(&[]), "{}");
    }
}
