//! sql-injection rule (S001): flags query sinks built from untrusted strings

use crate::diagnostic::Diagnostic;
use crate::parser::ParsedFile;
use crate::rules::{Rule, RuleMetadata, Severity};
use crate::taint::{SinkCatalog, TaintAnalyzer};
use crate::visitor::VisitorContext;

const METADATA: RuleMetadata = RuleMetadata {
    id: "S001",
    name: "sql-injection",
    description: "Disallow SQL queries constructed with untrusted data",
    severity: Severity::Error,
    docs_url: None,
    examples: Some(
        "// Bad\nconst query = \"SELECT * FROM users WHERE id = \" + userId;\ndb.query(query);\n\n// Good\ndb.query(\"SELECT * FROM users WHERE id = ?\", [userId]);",
    ),
};

pub struct SqlInjection {
    metadata: RuleMetadata,
    analyzer: TaintAnalyzer,
}

impl SqlInjection {
    pub fn new() -> Self {
        Self::with_catalog(SinkCatalog::with_defaults())
    }

    /// Use a catalog extended with configured custom sinks.
    pub fn with_catalog(catalog: SinkCatalog) -> Self {
        Self {
            metadata: METADATA,
            analyzer: TaintAnalyzer::with_catalog(catalog),
        }
    }
}

impl Default for SqlInjection {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for SqlInjection {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, file: &ParsedFile) -> Vec<Diagnostic> {
        let findings = self.analyzer.analyze(file);
        let ctx = VisitorContext::new(file);

        findings
            .into_iter()
            .map(|finding| {
                let (line, column) = ctx.span_to_location(finding.span);
                Diagnostic::new(
                    self.metadata.id,
                    self.metadata.severity,
                    finding.message,
                    &file.metadata().filename,
                    line,
                    column,
                )
                .with_suggestion(
                    "Use parameterized queries or prepared statements instead of string concatenation",
                )
            })
            .collect()
    }
}
