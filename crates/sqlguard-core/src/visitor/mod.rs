//! Visitor pattern for AST traversal.
//!
//! Provides a uniform way to traverse AST nodes with context information.

mod context;
mod traits;

pub use context::VisitorContext;
pub use traits::AstVisitor;

use std::ops::ControlFlow;

use swc_ecma_ast::Module;
use swc_ecma_visit::{Visit, VisitWith};

struct Walker<'a, V: AstVisitor> {
    visitor: &'a mut V,
    ctx: &'a VisitorContext<'a>,
    stopped: bool,
}

macro_rules! walk_node {
    ($self:ident, $method:ident, $node:ident) => {
        if $self.stopped {
            return;
        }
        if let ControlFlow::Break(()) = $self.visitor.$method($node, $self.ctx) {
            $self.stopped = true;
            return;
        }
        $node.visit_children_with($self);
    };
}

impl<V: AstVisitor> Visit for Walker<'_, V> {
    fn visit_fn_decl(&mut self, node: &swc_ecma_ast::FnDecl) {
        walk_node!(self, visit_fn_decl, node);
    }

    fn visit_arrow_expr(&mut self, node: &swc_ecma_ast::ArrowExpr) {
        walk_node!(self, visit_arrow_expr, node);
    }

    fn visit_var_decl(&mut self, node: &swc_ecma_ast::VarDecl) {
        walk_node!(self, visit_var_decl, node);
    }

    fn visit_call_expr(&mut self, node: &swc_ecma_ast::CallExpr) {
        walk_node!(self, visit_call_expr, node);
    }

    fn visit_member_expr(&mut self, node: &swc_ecma_ast::MemberExpr) {
        walk_node!(self, visit_member_expr, node);
    }

    fn visit_bin_expr(&mut self, node: &swc_ecma_ast::BinExpr) {
        walk_node!(self, visit_bin_expr, node);
    }

    fn visit_assign_expr(&mut self, node: &swc_ecma_ast::AssignExpr) {
        walk_node!(self, visit_assign_expr, node);
    }

    fn visit_ident(&mut self, node: &swc_ecma_ast::Ident) {
        walk_node!(self, visit_ident, node);
    }
}

pub fn walk_ast<V: AstVisitor>(module: &Module, visitor: &mut V, ctx: &VisitorContext) {
    let mut walker = Walker {
        visitor,
        ctx,
        stopped: false,
    };
    module.visit_with(&mut walker);
}
