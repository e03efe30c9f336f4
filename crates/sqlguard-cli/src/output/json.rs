//! JSON output formatter for diagnostic display
//!
//! Provides a structured JSON envelope (metadata, summary, diagnostics) for
//! programmatic integration.

use serde::Serialize;
use sqlguard_core::diagnostic::Diagnostic;
use sqlguard_core::rules::{RuleRegistry, Severity};
use std::collections::HashMap;

#[derive(Serialize)]
pub struct JsonOutput {
    pub version: &'static str,
    pub metadata: JsonMetadata,
    pub summary: JsonSummary,
    pub diagnostics: Vec<JsonDiagnostic>,
}

#[derive(Serialize)]
pub struct JsonMetadata {
    pub sqlguard_version: &'static str,
    pub working_directory: String,
    pub analyzed_path: String,
}

#[derive(Serialize)]
pub struct JsonSummary {
    pub total_files: usize,
    pub files_with_issues: usize,
    pub total_diagnostics: usize,
    pub by_severity: SeverityCounts,
}

#[derive(Serialize)]
pub struct SeverityCounts {
    pub error: usize,
    pub warning: usize,
    pub info: usize,
    pub hint: usize,
}

#[derive(Serialize)]
pub struct JsonDiagnostic {
    pub rule_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_name: Option<String>,
    pub severity: String,
    pub message: String,
    pub location: JsonLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

#[derive(Serialize)]
pub struct JsonLocation {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

pub struct JsonFormatter<'a> {
    registry: Option<&'a RuleRegistry>,
}

impl<'a> JsonFormatter<'a> {
    pub fn new() -> Self {
        Self { registry: None }
    }

    pub fn with_registry(registry: &'a RuleRegistry) -> Self {
        Self {
            registry: Some(registry),
        }
    }

    pub fn format(
        &self,
        diagnostics: &[Diagnostic],
        total_files: usize,
        analyzed_path: &str,
    ) -> String {
        let output = self.build_output(diagnostics, total_files, analyzed_path);
        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }

    fn build_output(
        &self,
        diagnostics: &[Diagnostic],
        total_files: usize,
        analyzed_path: &str,
    ) -> JsonOutput {
        JsonOutput {
            version: "1.0",
            metadata: JsonMetadata {
                sqlguard_version: env!("CARGO_PKG_VERSION"),
                working_directory: std::env::current_dir()
                    .map(|p| p.to_string_lossy().to_string())
                    .unwrap_or_default(),
                analyzed_path: analyzed_path.to_string(),
            },
            summary: self.build_summary(diagnostics, total_files),
            diagnostics: diagnostics
                .iter()
                .map(|d| self.convert_diagnostic(d))
                .collect(),
        }
    }

    fn build_summary(&self, diagnostics: &[Diagnostic], total_files: usize) -> JsonSummary {
        let mut by_severity = SeverityCounts {
            error: 0,
            warning: 0,
            info: 0,
            hint: 0,
        };
        let mut files_with_issues: HashMap<&str, bool> = HashMap::new();

        for diag in diagnostics {
            match diag.severity {
                Severity::Error => by_severity.error += 1,
                Severity::Warning => by_severity.warning += 1,
                Severity::Info => by_severity.info += 1,
                Severity::Hint => by_severity.hint += 1,
            }

            files_with_issues.insert(&diag.file, true);
        }

        JsonSummary {
            total_files,
            files_with_issues: files_with_issues.len(),
            total_diagnostics: diagnostics.len(),
            by_severity,
        }
    }

    fn convert_diagnostic(&self, diag: &Diagnostic) -> JsonDiagnostic {
        let rule_name = self
            .registry
            .and_then(|r| r.get_rule(&diag.rule_id))
            .map(|rule| rule.metadata().name.to_string());

        JsonDiagnostic {
            rule_id: diag.rule_id.clone(),
            rule_name,
            severity: format!("{:?}", diag.severity).to_lowercase(),
            message: diag.message.clone(),
            location: JsonLocation {
                file: diag.file.clone(),
                line: diag.line,
                column: diag.column,
            },
            suggestion: diag.suggestion.clone(),
        }
    }
}

impl Default for JsonFormatter<'_> {
    fn default() -> Self {
        Self::new()
    }
}
