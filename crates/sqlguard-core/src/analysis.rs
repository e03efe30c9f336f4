//! Analysis engine for code analysis and diagnostic generation
//!
//! Provides the core analysis functionality for the CLI and other consumers:
//! builds the rule registry (with the sink catalog extended from
//! configuration), runs rules over parsed files, and applies inline disable
//! directives.

use crate::config::Config;
use crate::diagnostic::Diagnostic;
use crate::parser::ParsedFile;
use crate::rules::security::SqlInjection;
use crate::rules::{RuleRegistry, Severity};
use crate::taint::{CatalogError, SinkCatalog, SinkSignature};

pub struct AnalysisEngine {
    registry: RuleRegistry,
}

impl AnalysisEngine {
    pub fn new() -> Self {
        let mut registry = RuleRegistry::new();
        registry.register(Box::new(SqlInjection::new()));
        Self { registry }
    }

    /// Build an engine from configuration. Fails before any file analysis
    /// when a configured sink pattern is malformed or collides with an
    /// existing one.
    pub fn with_config(config: &Config) -> Result<Self, CatalogError> {
        let catalog = build_catalog(config)?;

        let mut registry = RuleRegistry::new();
        registry.register(Box::new(SqlInjection::with_catalog(catalog)));
        registry.configure(&config.rules);

        Ok(Self { registry })
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn analyze(&self, file: &ParsedFile) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        let disable_directives = file.disable_directives();

        for error in file.errors() {
            let diagnostic = Diagnostic::new(
                "PARSE",
                Severity::Error,
                &error.message,
                &file.metadata().filename,
                error.line,
                error.column,
            );
            if !disable_directives.is_disabled(diagnostic.line, &diagnostic.rule_id) {
                diagnostics.push(diagnostic);
            }
        }

        for diagnostic in self.registry.run_all(file) {
            // Directives may name a rule by id or by name.
            let suppressed = disable_directives.is_disabled(diagnostic.line, &diagnostic.rule_id)
                || self
                    .registry
                    .get_rule(&diagnostic.rule_id)
                    .is_some_and(|rule| {
                        disable_directives.is_disabled(diagnostic.line, rule.metadata().name)
                    });
            if !suppressed {
                diagnostics.push(diagnostic);
            }
        }

        diagnostics
    }
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn build_catalog(config: &Config) -> Result<SinkCatalog, CatalogError> {
    let mut catalog = SinkCatalog::with_defaults();

    for sink in &config.sinks {
        let signature = SinkSignature::new(
            &sink.pattern,
            sink.query_args.clone(),
            sink.param_arg,
            sink.description.as_deref().unwrap_or("custom sink"),
        )?;
        catalog.insert(signature)?;
    }

    Ok(catalog)
}
