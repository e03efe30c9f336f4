//! Annotated-fixture harness
//!
//! Fixture files under `tests/fixtures/security/` carry
//! `// <expect-error> <rule-id>: <message>` directives on the line
//! immediately preceding an expected finding. The harness runs the taint
//! engine over each fixture and asserts exact agreement: every directive is
//! matched by one finding on the following line, and no finding appears on
//! an unannotated line.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use regex::Regex;
use sqlguard_core::parser::ParsedFile;
use sqlguard_core::taint::{Finding, TaintAnalyzer};
use sqlguard_core::visitor::VisitorContext;

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../tests/fixtures");

#[derive(Debug, PartialEq)]
struct ExpectedError {
    line: usize,
    rule_id: String,
    message: String,
}

fn collect_fixtures(subdir: &str) -> Vec<(String, String)> {
    let dir_path = Path::new(FIXTURES_DIR).join(subdir);
    let mut fixtures = vec![];

    for entry in fs::read_dir(&dir_path).expect("failed to read fixtures directory") {
        let entry = entry.expect("failed to read directory entry");
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "js") {
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            let content = fs::read_to_string(&path).expect("failed to read fixture file");
            fixtures.push((name, content));
        }
    }

    fixtures.sort_by(|a, b| a.0.cmp(&b.0));
    fixtures
}

/// Parse `// <expect-error> rule-id: message` directives; the expectation
/// applies to the line after the directive.
fn parse_expectations(source: &str) -> Vec<ExpectedError> {
    let directive = Regex::new(r"<expect-error>\s*([a-z\-]+):\s*(.+)$").unwrap();

    source
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            directive.captures(line).map(|captures| ExpectedError {
                line: idx + 2,
                rule_id: captures[1].to_string(),
                message: captures[2].trim().to_string(),
            })
        })
        .collect()
}

fn findings_by_line(parsed: &ParsedFile, findings: &[Finding]) -> Vec<(usize, &'static str, &'static str)> {
    let ctx = VisitorContext::new(parsed);
    findings
        .iter()
        .map(|f| {
            let (line, _) = ctx.span_to_location(f.span);
            (line, f.rule_id, f.message)
        })
        .collect()
}

#[test]
fn security_fixtures_match_their_annotations() {
    let fixtures = collect_fixtures("security");
    assert!(!fixtures.is_empty(), "no fixtures found in tests/fixtures/security/");

    for (filename, content) in &fixtures {
        let expectations = parse_expectations(content);
        let parsed = ParsedFile::from_source(filename, content);
        assert!(
            !parsed.metadata().has_errors,
            "fixture {} has parse errors: {:?}",
            filename,
            parsed.errors()
        );

        let findings = TaintAnalyzer::new().analyze(&parsed);
        let located = findings_by_line(&parsed, &findings);

        for expected in &expectations {
            let matching: Vec<_> = located
                .iter()
                .filter(|(line, rule_id, message)| {
                    *line == expected.line
                        && *rule_id == expected.rule_id
                        && *message == expected.message
                })
                .collect();

            assert_eq!(
                matching.len(),
                1,
                "fixture {} line {}: expected exactly one `{}` finding, got {:?}",
                filename,
                expected.line,
                expected.rule_id,
                located
            );
        }

        for (line, rule_id, _) in &located {
            assert!(
                expectations.iter().any(|e| e.line == *line),
                "fixture {} line {}: unexpected {} finding",
                filename,
                line,
                rule_id
            );
        }
    }
}

#[test]
fn fixture_corpus_has_expected_finding_counts() {
    let fixtures = collect_fixtures("security");

    let summary: BTreeMap<String, usize> = fixtures
        .iter()
        .map(|(filename, content)| {
            let parsed = ParsedFile::from_source(filename, content);
            let findings = TaintAnalyzer::new().analyze(&parsed);
            (filename.clone(), findings.len())
        })
        .collect();

    insta::assert_json_snapshot!(summary, @r#"
    {
      "parameterized.js": 1,
      "string-concatenation.js": 3,
      "taint-flow.js": 3,
      "template-interpolation.js": 5
    }
    "#);
}

#[test]
fn analysis_over_fixtures_is_idempotent() {
    let analyzer = TaintAnalyzer::new();

    for (filename, content) in collect_fixtures("security") {
        let parsed = ParsedFile::from_source(&filename, &content);

        let first = analyzer.analyze(&parsed);
        let second = analyzer.analyze(&parsed);

        assert_eq!(first, second, "fixture {} is not order-stable", filename);
    }
}

#[test]
fn directive_parser_reads_rule_and_message() {
    let source = r#"
// <expect-error> sql-injection: Potential SQL injection vulnerability detected, use parameterized queries instead
db.query(v);
"#;

    let expectations = parse_expectations(source);

    assert_eq!(expectations.len(), 1);
    assert_eq!(expectations[0].line, 3);
    assert_eq!(expectations[0].rule_id, "sql-injection");
    assert!(expectations[0].message.starts_with("Potential SQL injection"));
}
