//! Sink matching over call expressions
//!
//! Walks the tree, decomposes each call's callee into its dotted access
//! chain, and checks matched sinks: a call produces at most one finding,
//! at the call's span, when any of its query-text arguments cannot be
//! proven free of unsafe interpolation.

use std::ops::ControlFlow;

use swc_ecma_ast::{Callee, CallExpr, Expr, Lit, Module};

use crate::semantic::ScopeModel;
use crate::taint::catalog::{ChainSegment, SinkCatalog, SinkSignature};
use crate::taint::classify::TaintClassifier;
use crate::taint::report::{Finding, FindingCollector};
use crate::visitor::{AstVisitor, VisitorContext, walk_ast};

pub struct SinkMatcher<'a> {
    catalog: &'a SinkCatalog,
}

impl<'a> SinkMatcher<'a> {
    pub fn new(catalog: &'a SinkCatalog) -> Self {
        Self { catalog }
    }

    /// Scan one module; findings come back in source order.
    pub fn scan(
        &self,
        module: &Module,
        scopes: &ScopeModel<'_>,
        ctx: &VisitorContext<'_>,
    ) -> Vec<Finding> {
        let mut scanner = CallScanner {
            catalog: self.catalog,
            scopes,
            collector: FindingCollector::new(),
        };
        walk_ast(module, &mut scanner, ctx);
        scanner.collector.into_findings()
    }
}

struct CallScanner<'a, 'ast> {
    catalog: &'a SinkCatalog,
    scopes: &'a ScopeModel<'ast>,
    collector: FindingCollector,
}

impl CallScanner<'_, '_> {
    fn check_call(&mut self, call: &CallExpr, signature: &SinkSignature) {
        if self.is_parameterized_safe(call, signature) {
            return;
        }

        let Some(scope) = self.scopes.scope_at(call.span) else {
            return;
        };

        let classifier = TaintClassifier::new(self.scopes);
        for &index in &signature.query_args {
            let Some(arg) = call.args.get(index) else {
                continue;
            };
            if !classifier.classify(&arg.expr, scope).is_safe() {
                tracing::debug!(
                    pattern = signature.pattern.as_str(),
                    "query sink received unsafe argument"
                );
                self.collector.push(Finding::new(call.span));
                // One finding per call, not per argument.
                break;
            }
        }
    }

    /// A sink whose signature declares a bind-parameter argument is safe
    /// outright when that argument is passed and the query text is a plain
    /// literal or an interpolation-free template. Placeholder characters
    /// like `?` or `$1` inside the literal are just text.
    fn is_parameterized_safe(&self, call: &CallExpr, signature: &SinkSignature) -> bool {
        let Some(param_index) = signature.param_arg else {
            return false;
        };
        if call.args.get(param_index).is_none() {
            return false;
        }

        signature.query_args.iter().all(|&index| {
            call.args
                .get(index)
                .is_none_or(|arg| is_static_query_text(&arg.expr))
        })
    }
}

impl AstVisitor for CallScanner<'_, '_> {
    fn visit_call_expr(&mut self, node: &CallExpr, _ctx: &VisitorContext) -> ControlFlow<()> {
        if let Some(chain) = callee_chain(&node.callee) {
            if let Some(signature) = self.catalog.lookup(&chain) {
                self.check_call(node, signature);
            }
        }
        ControlFlow::Continue(())
    }
}

/// Decompose a callee into its dotted access chain. Non-identifier links
/// (call results, `this`, computed properties) become dynamic segments that
/// only wildcard patterns can match.
fn callee_chain(callee: &Callee) -> Option<Vec<ChainSegment>> {
    let Callee::Expr(expr) = callee else {
        return None;
    };

    let mut segments = Vec::new();
    collect_segments(expr, &mut segments);
    if segments.is_empty() {
        None
    } else {
        Some(segments)
    }
}

fn collect_segments(expr: &Expr, segments: &mut Vec<ChainSegment>) {
    match expr {
        Expr::Ident(ident) => segments.push(ChainSegment::name(ident.sym.as_ref())),
        Expr::Member(member) => {
            collect_segments(&member.obj, segments);
            match &member.prop {
                swc_ecma_ast::MemberProp::Ident(prop) => {
                    segments.push(ChainSegment::name(prop.sym.as_ref()))
                }
                _ => segments.push(ChainSegment::Dynamic),
            }
        }
        Expr::Paren(paren) => collect_segments(&paren.expr, segments),
        Expr::TsAs(as_expr) => collect_segments(&as_expr.expr, segments),
        Expr::TsNonNull(non_null) => collect_segments(&non_null.expr, segments),
        _ => segments.push(ChainSegment::Dynamic),
    }
}

/// True for query text that cannot contain runtime interpolation: a string
/// literal or a template with no placeholders.
fn is_static_query_text(expr: &Expr) -> bool {
    match expr {
        Expr::Lit(Lit::Str(_)) => true,
        Expr::Tpl(tpl) => tpl.exprs.is_empty(),
        Expr::Paren(paren) => is_static_query_text(&paren.expr),
        Expr::TsAs(as_expr) => is_static_query_text(&as_expr.expr),
        Expr::TsNonNull(non_null) => is_static_query_text(&non_null.expr),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParsedFile;

    fn scan(code: &str) -> Vec<Finding> {
        let parsed = ParsedFile::from_source("test.js", code);
        let module = parsed.module().expect("test code parses");
        let scopes = ScopeModel::build(module);
        let ctx = VisitorContext::new(&parsed);
        let catalog = SinkCatalog::with_defaults();
        SinkMatcher::new(&catalog).scan(module, &scopes, &ctx)
    }

    #[test]
    fn flags_concatenated_query_argument() {
        let findings = scan(
            r#"connection.query("SELECT * FROM users WHERE username = '" + username + "'");"#,
        );

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id, "sql-injection");
    }

    #[test]
    fn ignores_static_query() {
        let findings = scan(r#"db.query("SELECT * FROM users WHERE active = true");"#);

        assert!(findings.is_empty());
    }

    #[test]
    fn ignores_parameterized_query_with_bind_array() {
        let findings = scan(r#"connection.query("SELECT * FROM users WHERE username = ?", [username]);"#);

        assert!(findings.is_empty());
    }

    #[test]
    fn parameterized_exemption_requires_static_query_text() {
        let findings = scan(r#"db.query("SELECT * FROM users WHERE id = " + id, [id]);"#);

        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn one_finding_per_call_with_multiple_tainted_interpolations() {
        let findings =
            scan(r#"pool.query(`SELECT * FROM users WHERE email = '${email}' AND phone = ${phone}`);"#);

        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn unmatched_calls_produce_nothing() {
        let findings = scan(r#"console.log("SELECT " + id); format(sql + id);"#);

        assert!(findings.is_empty());
    }

    #[test]
    fn nested_sink_call_is_still_found() {
        let findings = scan(r#"run(() => db.query("SELECT " + id));"#);

        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn dynamic_receiver_matches_wildcard_sink() {
        let findings = scan(r#"getDb().query("SELECT " + id);"#);

        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn deep_member_chain_matches_by_suffix() {
        let findings = scan(r#"app.locals.pool.query("SELECT " + id);"#);

        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn findings_are_reported_in_source_order() {
        let code = r#"
db.query("SELECT " + a);
db.query("SELECT 1");
db.query(`DELETE FROM t WHERE id = ${b}`);
"#;
        let parsed = ParsedFile::from_source("test.js", code);
        let module = parsed.module().unwrap();
        let scopes = ScopeModel::build(module);
        let ctx = VisitorContext::new(&parsed);
        let catalog = SinkCatalog::with_defaults();
        let findings = SinkMatcher::new(&catalog).scan(module, &scopes, &ctx);

        assert_eq!(findings.len(), 2);
        let lines: Vec<usize> = findings
            .iter()
            .map(|f| ctx.span_to_location(f.span).0)
            .collect();
        assert_eq!(lines, vec![2, 4]);
    }

    #[test]
    fn spread_argument_is_conservatively_flagged() {
        let findings = scan(r#"db.query(...parts);"#);

        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn missing_query_argument_produces_nothing() {
        let findings = scan(r#"db.query();"#);

        assert!(findings.is_empty());
    }

    #[test]
    fn custom_catalog_signature_is_matched() {
        let code = r#"driver.run("SELECT " + id);"#;
        let parsed = ParsedFile::from_source("test.js", code);
        let module = parsed.module().unwrap();
        let scopes = ScopeModel::build(module);
        let ctx = VisitorContext::new(&parsed);

        let mut catalog = SinkCatalog::new();
        catalog
            .insert(
                crate::taint::catalog::SinkSignature::new("*.run", vec![0], None, "custom").unwrap(),
            )
            .unwrap();

        let findings = SinkMatcher::new(&catalog).scan(module, &scopes, &ctx);

        assert_eq!(findings.len(), 1);
    }
}
