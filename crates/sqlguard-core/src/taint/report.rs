//! Finding collection
//!
//! Findings are the engine's primary output: one immutable record per
//! offending sink call. The collector preserves discovery order and drops
//! exact-span duplicates, which should not occur in a well-formed tree.

use std::collections::HashSet;

use swc_common::Span;

pub const RULE_ID: &str = "sql-injection";
pub const MESSAGE: &str =
    "Potential SQL injection vulnerability detected, use parameterized queries instead";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub rule_id: &'static str,
    pub message: &'static str,
    pub span: Span,
}

impl Finding {
    pub fn new(span: Span) -> Self {
        Self {
            rule_id: RULE_ID,
            message: MESSAGE,
            span,
        }
    }
}

#[derive(Debug, Default)]
pub struct FindingCollector {
    findings: Vec<Finding>,
    seen_spans: HashSet<(u32, u32)>,
}

impl FindingCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, finding: Finding) {
        let key = (finding.span.lo.0, finding.span.hi.0);
        if self.seen_spans.insert(key) {
            self.findings.push(finding);
        }
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn into_findings(self) -> Vec<Finding> {
        self.findings
    }
}
