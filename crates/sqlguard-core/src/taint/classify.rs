//! Taint classification of query-text expressions
//!
//! Decides whether an expression is statically guaranteed free of
//! attacker-controlled interpolation. The classification is total over all
//! node kinds: anything not explicitly recognized is tainted, so an unusual
//! construct can never be silently treated as safe.

use swc_common::Spanned;
use swc_ecma_ast::{BinaryOp, Expr, Lit};

use crate::semantic::{ScopeId, ScopeModel};

/// Result of classifying one expression.
///
/// `Unknown` marks an identifier with no local definition (parameter,
/// import, external call result); sinks treat it exactly like `Tainted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Taint {
    Safe,
    Tainted,
    Unknown,
}

impl Taint {
    pub fn is_safe(self) -> bool {
        matches!(self, Taint::Safe)
    }
}

pub struct TaintClassifier<'a, 'ast> {
    scopes: &'a ScopeModel<'ast>,
}

impl<'a, 'ast> TaintClassifier<'a, 'ast> {
    pub fn new(scopes: &'a ScopeModel<'ast>) -> Self {
        Self { scopes }
    }

    /// Classify `expr` as seen from `scope`.
    pub fn classify(&self, expr: &Expr, scope: ScopeId) -> Taint {
        let mut resolving = Vec::new();
        self.classify_with_stack(expr, scope, &mut resolving)
    }

    fn classify_with_stack(
        &self,
        expr: &Expr,
        scope: ScopeId,
        resolving: &mut Vec<String>,
    ) -> Taint {
        match expr {
            Expr::Lit(
                Lit::Str(_) | Lit::Num(_) | Lit::Bool(_) | Lit::Null(_) | Lit::BigInt(_),
            ) => Taint::Safe,

            // A template is safe only when every interpolated expression is;
            // the first unsafe placeholder taints the whole template.
            Expr::Tpl(tpl) => {
                for placeholder in &tpl.exprs {
                    if !self
                        .classify_with_stack(placeholder, scope, resolving)
                        .is_safe()
                    {
                        return Taint::Tainted;
                    }
                }
                Taint::Safe
            }

            // Taint is absorbing under concatenation.
            Expr::Bin(bin) if bin.op == BinaryOp::Add => {
                let left = self.classify_with_stack(&bin.left, scope, resolving);
                let right = self.classify_with_stack(&bin.right, scope, resolving);
                if left.is_safe() && right.is_safe() {
                    Taint::Safe
                } else {
                    Taint::Tainted
                }
            }

            Expr::Ident(ident) => {
                let name = ident.sym.as_ref();
                if resolving.iter().any(|n| n == name) {
                    // Cyclic definition such as `a = a + b`; give up closed.
                    return Taint::Tainted;
                }

                let use_scope = self.scopes.scope_at(ident.span).unwrap_or(scope);
                match self.scopes.resolve(use_scope, name) {
                    Some(definition) => {
                        let def_scope = self
                            .scopes
                            .scope_at(definition.span())
                            .unwrap_or(use_scope);
                        resolving.push(name.to_string());
                        let taint = self.classify_with_stack(definition, def_scope, resolving);
                        resolving.pop();
                        taint
                    }
                    None => Taint::Unknown,
                }
            }

            Expr::Paren(paren) => self.classify_with_stack(&paren.expr, scope, resolving),

            // TypeScript type-only wrappers do not change the value.
            Expr::TsAs(as_expr) => self.classify_with_stack(&as_expr.expr, scope, resolving),
            Expr::TsNonNull(non_null) => {
                self.classify_with_stack(&non_null.expr, scope, resolving)
            }
            Expr::TsConstAssertion(assertion) => {
                self.classify_with_stack(&assertion.expr, scope, resolving)
            }
            Expr::TsTypeAssertion(assertion) => {
                self.classify_with_stack(&assertion.expr, scope, resolving)
            }
            Expr::TsSatisfies(satisfies) => {
                self.classify_with_stack(&satisfies.expr, scope, resolving)
            }

            // Member accesses, calls, and every other dynamic expression are
            // tainted; the engine does not reason about their runtime value.
            _ => Taint::Tainted,
        }
    }
}
