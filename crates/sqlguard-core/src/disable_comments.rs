//! Inline disable comment directives for suppressing diagnostics
//!
//! Supports ESLint-style disable comments:
//! - `// sqlguard-disable-next-line sql-injection` - disable for the next line
//! - `// sqlguard-disable-line sql-injection` - disable for the current line
//! - `// sqlguard-disable-next-line` - disable all rules for the next line
//! - `// sqlguard-disable-next-line sql-injection, other-rule` - multiple rules

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisableDirective {
    pub line: usize,
    pub rule_ids: Vec<String>,
}

impl DisableDirective {
    pub fn new(line: usize, rule_ids: Vec<String>) -> Self {
        Self { line, rule_ids }
    }

    pub fn disables_rule(&self, rule_id: &str) -> bool {
        self.rule_ids.is_empty() || self.rule_ids.iter().any(|id| id == rule_id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DisableDirectives {
    by_line: HashMap<usize, DisableDirective>,
}

impl DisableDirectives {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_source(source: &str) -> Self {
        let mut directives = Self::new();

        for (line_idx, line) in source.lines().enumerate() {
            let line_num = line_idx + 1;

            if let Some(comment_start) = line.find("//") {
                let comment = &line[comment_start + 2..].trim();

                if let Some(rest) = comment.strip_prefix("sqlguard-disable-next-line") {
                    let rule_ids = parse_rule_ids(rest);
                    directives.add(DisableDirective::new(line_num + 1, rule_ids));
                } else if let Some(rest) = comment.strip_prefix("sqlguard-disable-line") {
                    let rule_ids = parse_rule_ids(rest);
                    directives.add(DisableDirective::new(line_num, rule_ids));
                }
            }
        }

        directives
    }

    pub fn add(&mut self, directive: DisableDirective) {
        self.by_line.insert(directive.line, directive);
    }

    pub fn is_disabled(&self, line: usize, rule_id: &str) -> bool {
        self.by_line
            .get(&line)
            .is_some_and(|d| d.disables_rule(rule_id))
    }

    pub fn is_empty(&self) -> bool {
        self.by_line.is_empty()
    }
}

fn parse_rule_ids(rest: &str) -> Vec<String> {
    let trimmed = rest.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    trimmed
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
