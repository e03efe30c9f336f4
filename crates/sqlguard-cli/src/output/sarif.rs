//! SARIF output formatter for GitHub Code Scanning
//!
//! Provides SARIF 2.1.0 output for integration with code-scanning tools.

use serde::Serialize;
use sqlguard_core::diagnostic::Diagnostic;
use sqlguard_core::rules::{RuleRegistry, Severity};

const SARIF_VERSION: &str = "2.1.0";
const SARIF_SCHEMA: &str = "https://json.schemastore.org/sarif-2.1.0.json";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifOutput {
    #[serde(rename = "$schema")]
    pub schema: &'static str,
    pub version: &'static str,
    pub runs: Vec<SarifRun>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRun {
    pub tool: SarifTool,
    pub results: Vec<SarifResult>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifTool {
    pub driver: SarifDriver,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifDriver {
    pub name: &'static str,
    pub semantic_version: &'static str,
    pub information_uri: &'static str,
    pub rules: Vec<SarifRule>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRule {
    pub id: String,
    pub name: String,
    pub short_description: SarifMessage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<SarifMessage>,
    pub default_configuration: SarifRuleConfiguration,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifMessage {
    pub text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRuleConfiguration {
    pub level: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifResult {
    pub rule_id: String,
    pub level: String,
    pub message: SarifMessage,
    pub locations: Vec<SarifLocation>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifLocation {
    pub physical_location: SarifPhysicalLocation,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifPhysicalLocation {
    pub artifact_location: SarifArtifactLocation,
    pub region: SarifRegion,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifArtifactLocation {
    pub uri: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRegion {
    pub start_line: usize,
    pub start_column: usize,
}

pub struct SarifFormatter<'a> {
    registry: Option<&'a RuleRegistry>,
}

impl<'a> SarifFormatter<'a> {
    pub fn new() -> Self {
        Self { registry: None }
    }

    pub fn with_registry(registry: &'a RuleRegistry) -> Self {
        Self {
            registry: Some(registry),
        }
    }

    pub fn format(&self, diagnostics: &[Diagnostic]) -> String {
        let output = SarifOutput {
            schema: SARIF_SCHEMA,
            version: SARIF_VERSION,
            runs: vec![SarifRun {
                tool: SarifTool {
                    driver: SarifDriver {
                        name: "sqlguard",
                        semantic_version: env!("CARGO_PKG_VERSION"),
                        information_uri: "https://github.com/sqlguard-dev/sqlguard",
                        rules: self.build_rules(),
                    },
                },
                results: diagnostics.iter().map(convert_result).collect(),
            }],
        };

        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }

    fn build_rules(&self) -> Vec<SarifRule> {
        let Some(registry) = self.registry else {
            return Vec::new();
        };

        registry
            .rules()
            .map(|rule| {
                let metadata = rule.metadata();
                SarifRule {
                    id: metadata.id.to_string(),
                    name: metadata.name.to_string(),
                    short_description: SarifMessage {
                        text: metadata.description.to_string(),
                    },
                    help: metadata.examples.map(|examples| SarifMessage {
                        text: examples.to_string(),
                    }),
                    default_configuration: SarifRuleConfiguration {
                        level: severity_to_level(metadata.severity).to_string(),
                    },
                }
            })
            .collect()
    }
}

impl Default for SarifFormatter<'_> {
    fn default() -> Self {
        Self::new()
    }
}

fn convert_result(diag: &Diagnostic) -> SarifResult {
    SarifResult {
        rule_id: diag.rule_id.clone(),
        level: severity_to_level(diag.severity).to_string(),
        message: SarifMessage {
            text: diag.message.clone(),
        },
        locations: vec![SarifLocation {
            physical_location: SarifPhysicalLocation {
                artifact_location: SarifArtifactLocation {
                    uri: diag.file.clone(),
                },
                region: SarifRegion {
                    start_line: diag.line,
                    start_column: diag.column,
                },
            },
        }],
    }
}

fn severity_to_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info | Severity::Hint => "note",
    }
}
