//! The `readability` extension point

use super::{format_message, CheckError, Definition};
use crate::alert::Alert;
use crate::file::File;
use crate::nlp::readability::Assessment;
use serde::Deserialize;

/// The supported grade-level metrics.
pub const METRICS: &[&str] = &[
    "SMOG",
    "Gunning Fog",
    "Coleman-Liau",
    "Flesch-Kincaid",
    "Automated Readability",
];

/// Checks the reading grade level of the document summary.
///
/// This extension point doesn't support scoping: grade metrics need full
/// sentences, so it always runs once against the accumulated summary.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Readability {
    #[serde(flatten)]
    pub definition: Definition,

    /// One or more of the metrics in [`METRICS`].
    pub metrics: Vec<String>,

    /// The highest acceptable score.
    pub grade: f64,
}

impl Readability {
    pub fn compile(&mut self) -> Result<(), CheckError> {
        if self.metrics.is_empty() {
            return Err(CheckError::MissingKey {
                name: self.definition.name.clone(),
                key: "metrics".to_string(),
            });
        }
        for metric in &self.metrics {
            if !METRICS.contains(&metric.as_str()) {
                return Err(CheckError::Invalid {
                    name: self.definition.name.clone(),
                    reason: format!("unknown metric '{}'", metric),
                });
            }
        }

        self.definition.scope = "summary".to_string();
        Ok(())
    }

    pub fn run(&self, text: &str, _file: &mut File) -> Vec<Alert> {
        let assessment = Assessment::new(text);

        let mut grade = 0.0;
        for metric in &self.metrics {
            grade += match metric.as_str() {
                "SMOG" => assessment.smog(),
                "Gunning Fog" => assessment.gunning_fog(),
                "Coleman-Liau" => assessment.coleman_liau(),
                "Flesch-Kincaid" => assessment.flesch_kincaid(),
                "Automated Readability" => assessment.automated_readability(),
                _ => 0.0,
            };
        }
        grade /= self.metrics.len() as f64;

        if grade <= self.grade {
            return Vec::new();
        }

        let formatted = format!("{:.2}", grade);
        let mut alert = super::make_alert(&self.definition, (0, text.len()), text);
        alert.message = format_message(&self.definition.message, &[&formatted]);
        alert.description = format_message(&self.definition.description, &[&formatted]);
        vec![alert]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn compiled(yaml: &str) -> Readability {
        let mut rule: Readability = serde_yaml::from_str(yaml).unwrap();
        rule.definition.name = "Test.Readability".to_string();
        rule.compile().unwrap();
        rule
    }

    #[test]
    fn test_scope_forced_to_summary() {
        let rule = compiled(
            "extends: readability\nmessage: \"Grade %s is too high.\"\nscope: text\ngrade: 8\nmetrics: [Flesch-Kincaid]",
        );
        assert_eq!(rule.definition.scope, "summary");
    }

    #[test]
    fn test_simple_text_passes() {
        let rule = compiled(
            "extends: readability\nmessage: \"Grade %s is too high.\"\ngrade: 8\nmetrics: [Flesch-Kincaid]",
        );
        let mut file = File::from_string("", ".txt", &Config::new());
        assert!(rule.run("The cat sat.", &mut file).is_empty());
    }

    #[test]
    fn test_dense_text_alerts() {
        let rule = compiled(
            "extends: readability\nmessage: \"Grade %s is too high.\"\ngrade: 8\nmetrics: [Flesch-Kincaid, Gunning Fog]",
        );
        let text = "Organizational stakeholders continuously reevaluate \
                    multidimensional considerations regarding infrastructural \
                    sustainability initiatives throughout heterogeneous \
                    operational environments necessitating comprehensive \
                    documentation obligations.";
        let mut file = File::from_string("", ".txt", &Config::new());
        let alerts = rule.run(text, &mut file);

        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].message.starts_with("Grade "));
    }

    #[test]
    fn test_unknown_metric_rejected() {
        let mut rule: Readability = serde_yaml::from_str(
            "extends: readability\nmessage: m\ngrade: 8\nmetrics: [Lexile]",
        )
        .unwrap();
        assert!(rule.compile().is_err());
    }
}
