//! Alert types for linting results

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity level for alerts
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Stylistic advice; safe to ignore
    Suggestion,
    /// Potential issue
    #[default]
    Warning,
    /// Definite problem
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Suggestion => write!(f, "suggestion"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "suggestion" => Ok(Severity::Suggestion),
            "warning" | "warn" => Ok(Severity::Warning),
            "error" | "err" => Ok(Severity::Error),
            _ => Err(format!("Unknown alert level: {}", s)),
        }
    }
}

/// A possible solution to an alert, consumed by downstream tooling.
///
/// Serialized with capitalized keys for JSON output; rule manifests write
/// the lowercase forms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// The name of the action -- e.g., "replace"
    #[serde(rename = "Name", alias = "name", default)]
    pub name: String,
    /// Parameters for the given action
    #[serde(rename = "Params", alias = "params", default)]
    pub params: Vec<String>,
}

/// One reported issue with location and severity.
///
/// `line` is 1-based; `span` is in rune columns, 1-based, with an exclusive
/// end. Both are file-absolute once the alert has been localized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Alert {
    /// A possible solution
    #[serde(default)]
    pub action: Action,

    /// The qualified name of the originating rule (`Style.Rule`)
    pub check: String,

    /// Why `message` is meaningful
    #[serde(default)]
    pub description: String,

    /// The source line
    pub line: usize,

    /// Reference material
    #[serde(default)]
    pub link: String,

    /// The output message
    pub message: String,

    /// Alert severity
    pub severity: Severity,

    /// The [begin, end) column span within `line`
    pub span: [usize; 2],

    /// The matched text
    #[serde(rename = "Match")]
    pub match_text: String,

    /// Internal filter flag; a hidden alert is never emitted
    #[serde(skip)]
    pub hide: bool,
}

impl Alert {
    /// Create an alert with empty optional fields.
    pub fn new(check: &str, severity: Severity, message: &str) -> Self {
        Self {
            action: Action::default(),
            check: check.to_string(),
            description: String::new(),
            line: 1,
            link: String::new(),
            message: message.to_string(),
            severity,
            span: [0, 0],
            match_text: String::new(),
            hide: false,
        }
    }
}

/// Sort alerts by line, then by starting column.
pub fn sort_alerts(alerts: &mut [Alert]) {
    alerts.sort_by(|a, b| a.line.cmp(&b.line).then(a.span[0].cmp(&b.span[0])));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Suggestion);
    }

    #[test]
    fn test_severity_from_str() {
        assert_eq!("error".parse::<Severity>(), Ok(Severity::Error));
        assert_eq!("warning".parse::<Severity>(), Ok(Severity::Warning));
        assert_eq!("suggestion".parse::<Severity>(), Ok(Severity::Suggestion));
        assert!("bogus".parse::<Severity>().is_err());
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(format!("{}", Severity::Suggestion), "suggestion");
        assert_eq!(format!("{}", Severity::Error), "error");
    }

    #[test]
    fn test_sort_alerts() {
        let mut alerts = vec![
            Alert {
                line: 2,
                span: [4, 8],
                ..Alert::new("a", Severity::Warning, "m")
            },
            Alert {
                line: 1,
                span: [9, 12],
                ..Alert::new("b", Severity::Warning, "m")
            },
            Alert {
                line: 1,
                span: [2, 5],
                ..Alert::new("c", Severity::Warning, "m")
            },
        ];
        sort_alerts(&mut alerts);
        assert_eq!(alerts[0].check, "c");
        assert_eq!(alerts[1].check, "b");
        assert_eq!(alerts[2].check, "a");
    }

    #[test]
    fn test_json_field_names() {
        let mut alert = Alert::new("Style.Rule", Severity::Error, "msg");
        alert.match_text = "foo".to_string();
        let json = serde_json::to_string(&alert).unwrap();
        assert!(json.contains("\"Check\":\"Style.Rule\""));
        assert!(json.contains("\"Severity\":\"error\""));
        assert!(json.contains("\"Match\":\"foo\""));
        assert!(json.contains("\"Span\":[0,0]"));
    }
}
