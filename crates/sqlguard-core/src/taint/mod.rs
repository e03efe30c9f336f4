//! Taint analysis for SQL query construction
//!
//! Tracks how query strings are built (assignments, concatenation, template
//! interpolation) and flags database call sites that receive text not
//! statically proven free of attacker-controlled interpolation.

pub mod catalog;
pub mod classify;
pub mod matcher;
pub mod report;

pub use catalog::{CalleePattern, CatalogError, ChainSegment, SinkCatalog, SinkSignature};
pub use classify::{Taint, TaintClassifier};
pub use matcher::SinkMatcher;
pub use report::{Finding, FindingCollector, MESSAGE, RULE_ID};

use crate::parser::ParsedFile;
use crate::semantic::ScopeModel;
use crate::visitor::VisitorContext;

/// Per-file analysis façade: builds the scope model for the file, scans for
/// sink calls, and returns findings in source order. All state is local to
/// one call, so files can be analyzed in parallel.
#[derive(Debug)]
pub struct TaintAnalyzer {
    catalog: SinkCatalog,
}

impl Default for TaintAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl TaintAnalyzer {
    pub fn new() -> Self {
        Self {
            catalog: SinkCatalog::with_defaults(),
        }
    }

    pub fn with_catalog(catalog: SinkCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &SinkCatalog {
        &self.catalog
    }

    pub fn analyze(&self, parsed: &ParsedFile) -> Vec<Finding> {
        let Some(module) = parsed.module() else {
            return Vec::new();
        };

        let scopes = ScopeModel::build(module);
        let ctx = VisitorContext::new(parsed);
        let findings = SinkMatcher::new(&self.catalog).scan(module, &scopes, &ctx);

        tracing::debug!(
            file = parsed.metadata().filename.as_str(),
            findings = findings.len(),
            "taint analysis complete"
        );

        findings
    }
}
