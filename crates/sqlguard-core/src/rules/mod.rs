//! Rule system for code analysis
//!
//! Provides the rule trait, metadata, and the registry that runs enabled
//! rules over parsed files.

pub mod security;

use crate::config::RulesConfig;
use crate::diagnostic::Diagnostic;
use crate::parser::ParsedFile;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMetadata {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub severity: Severity,
    pub docs_url: Option<&'static str>,
    pub examples: Option<&'static str>,
}

pub trait Rule: Send + Sync {
    fn metadata(&self) -> &RuleMetadata;
    fn check(&self, file: &ParsedFile) -> Vec<Diagnostic>;
}

pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
    disabled_rules: HashSet<String>,
    severity_overrides: HashMap<String, Severity>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            disabled_rules: HashSet::new(),
            severity_overrides: HashMap::new(),
        }
    }

    pub fn register(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn configure(&mut self, config: &RulesConfig) {
        self.disabled_rules.clear();
        self.severity_overrides.clear();

        for rule_ref in &config.disabled {
            self.disabled_rules.insert(rule_ref.clone());
        }

        for (rule_ref, severity_value) in &config.severity {
            self.severity_overrides
                .insert(rule_ref.clone(), (*severity_value).into());
        }
    }

    pub fn rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    pub fn run_all(&self, file: &ParsedFile) -> Vec<Diagnostic> {
        self.rules
            .iter()
            .filter(|rule| !self.is_rule_disabled(rule.metadata()))
            .flat_map(|rule| {
                let mut diagnostics = rule.check(file);
                self.apply_severity_overrides(rule.as_ref(), &mut diagnostics);
                diagnostics
            })
            .collect()
    }

    fn is_rule_disabled(&self, metadata: &RuleMetadata) -> bool {
        self.disabled_rules.contains(metadata.id) || self.disabled_rules.contains(metadata.name)
    }

    fn apply_severity_overrides(&self, rule: &dyn Rule, diagnostics: &mut [Diagnostic]) {
        let metadata = rule.metadata();

        let override_severity = self
            .severity_overrides
            .get(metadata.id)
            .or_else(|| self.severity_overrides.get(metadata.name));

        if let Some(severity) = override_severity {
            for diag in diagnostics.iter_mut() {
                diag.severity = *severity;
            }
        }
    }

    pub fn is_rule_enabled(&self, id_or_name: &str) -> bool {
        match self
            .get_rule(id_or_name)
            .or_else(|| self.get_rule_by_name(id_or_name))
        {
            Some(rule) => !self.is_rule_disabled(rule.metadata()),
            None => false,
        }
    }

    pub fn get_rule(&self, id: &str) -> Option<&dyn Rule> {
        self.rules
            .iter()
            .find(|r| r.metadata().id == id)
            .map(|r| r.as_ref())
    }

    pub fn get_rule_by_name(&self, name: &str) -> Option<&dyn Rule> {
        self.rules
            .iter()
            .find(|r| r.metadata().name == name)
            .map(|r| r.as_ref())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestRule {
        metadata: RuleMetadata,
        diagnostics_to_return: Vec<Diagnostic>,
    }

    impl TestRule {
        fn new(id: &'static str) -> Self {
            Self {
                metadata: RuleMetadata {
                    id,
                    name: "test-rule",
                    description: "A test rule",
                    severity: Severity::Warning,
                    docs_url: None,
                    examples: None,
                },
                diagnostics_to_return: Vec::new(),
            }
        }

        fn with_name(mut self, name: &'static str) -> Self {
            self.metadata.name = name;
            self
        }

        fn with_diagnostic(mut self, diagnostic: Diagnostic) -> Self {
            self.diagnostics_to_return.push(diagnostic);
            self
        }
    }

    impl Rule for TestRule {
        fn metadata(&self) -> &RuleMetadata {
            &self.metadata
        }

        fn check(&self, _file: &ParsedFile) -> Vec<Diagnostic> {
            self.diagnostics_to_return.clone()
        }
    }

    #[test]
    fn registry_contains_registered_rules() {
        let mut registry = RuleRegistry::new();
        registry.register(Box::new(TestRule::new("T001")));
        registry.register(Box::new(TestRule::new("T002")));

        let rules: Vec<_> = registry.rules().collect();

        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].metadata().id, "T001");
        assert_eq!(rules[1].metadata().id, "T002");
    }

    #[test]
    fn run_all_collects_diagnostics() {
        let mut registry = RuleRegistry::new();

        let diag1 = Diagnostic::new("T001", Severity::Warning, "Issue 1", "test.js", 1, 1);
        let diag2 = Diagnostic::new("T002", Severity::Error, "Issue 2", "test.js", 2, 1);

        registry.register(Box::new(TestRule::new("T001").with_diagnostic(diag1)));
        registry.register(Box::new(TestRule::new("T002").with_diagnostic(diag2)));

        let file = ParsedFile::from_source("test.js", "const x = 1;");
        let diagnostics = registry.run_all(&file);

        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].rule_id, "T001");
        assert_eq!(diagnostics[1].rule_id, "T002");
    }

    #[test]
    fn disabled_rule_by_id_is_not_executed() {
        let mut registry = RuleRegistry::new();
        let diag = Diagnostic::new("S001", Severity::Error, "issue", "test.js", 1, 1);
        registry.register(Box::new(
            TestRule::new("S001")
                .with_name("sql-injection")
                .with_diagnostic(diag),
        ));

        let config = RulesConfig {
            disabled: vec!["S001".to_string()],
            ..Default::default()
        };
        registry.configure(&config);

        let file = ParsedFile::from_source("test.js", "const x = 1;");

        assert!(registry.run_all(&file).is_empty());
        assert!(!registry.is_rule_enabled("S001"));
    }

    #[test]
    fn disabled_rule_by_name_is_not_executed() {
        let mut registry = RuleRegistry::new();
        let diag = Diagnostic::new("S001", Severity::Error, "issue", "test.js", 1, 1);
        registry.register(Box::new(
            TestRule::new("S001")
                .with_name("sql-injection")
                .with_diagnostic(diag),
        ));

        let config = RulesConfig {
            disabled: vec!["sql-injection".to_string()],
            ..Default::default()
        };
        registry.configure(&config);

        let file = ParsedFile::from_source("test.js", "const x = 1;");

        assert!(registry.run_all(&file).is_empty());
    }

    #[test]
    fn severity_override_applies_to_diagnostics() {
        use crate::config::SeverityValue;

        let mut registry = RuleRegistry::new();
        let diag = Diagnostic::new("S001", Severity::Error, "issue", "test.js", 1, 1);
        registry.register(Box::new(
            TestRule::new("S001")
                .with_name("sql-injection")
                .with_diagnostic(diag),
        ));

        let mut severity = HashMap::new();
        severity.insert("sql-injection".to_string(), SeverityValue::Warning);
        let config = RulesConfig {
            severity,
            ..Default::default()
        };
        registry.configure(&config);

        let file = ParsedFile::from_source("test.js", "const x = 1;");
        let diagnostics = registry.run_all(&file);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Warning);
    }

    #[test]
    fn get_rule_finds_by_id_and_name() {
        let mut registry = RuleRegistry::new();
        registry.register(Box::new(TestRule::new("S001").with_name("sql-injection")));

        assert!(registry.get_rule("S001").is_some());
        assert!(registry.get_rule_by_name("sql-injection").is_some());
        assert!(registry.get_rule("UNKNOWN").is_none());
    }

    #[test]
    fn registry_len_and_default_state() {
        let mut registry = RuleRegistry::new();
        assert!(registry.is_empty());

        registry.register(Box::new(TestRule::new("T001")));

        assert_eq!(registry.len(), 1);
        assert!(registry.is_rule_enabled("T001"));
    }
}
