//! Scope binding pass
//!
//! Builds a [`ScopeModel`] for one module: the lexical scope tree plus a
//! per-scope table mapping variable names to their most recent defining
//! expression. The pass covers the whole module before any sink analysis
//! runs, so a query string declared after its use site (hoisting-style
//! code) still resolves. Within one scope the last write in source order
//! wins; the analysis is deliberately not flow sensitive.

use std::collections::HashMap;

use swc_common::Span;
use swc_ecma_ast::{
    AssignOp, AssignTarget, BlockStmt, ClassMember, Decl, Expr, Function, Module, ModuleDecl,
    ModuleItem, Pat, SimpleAssignTarget, Stmt, VarDecl,
};

use super::scope::{ScopeId, ScopeKind, ScopeTree};

/// Scope tree plus bindings for a single file. Discarded after the file's
/// findings are collected; never shared across files.
pub struct ScopeModel<'ast> {
    tree: ScopeTree,
    bindings: HashMap<(ScopeId, String), &'ast Expr>,
}

impl<'ast> ScopeModel<'ast> {
    pub fn build(module: &'ast Module) -> Self {
        let mut binder = ScopeBinder {
            model: ScopeModel {
                tree: ScopeTree::new(),
                bindings: HashMap::new(),
            },
            current: None,
        };
        binder.visit_module(module);
        binder.model
    }

    pub fn tree(&self) -> &ScopeTree {
        &self.tree
    }

    pub fn root(&self) -> Option<ScopeId> {
        self.tree.root()
    }

    /// The innermost scope containing `span`.
    pub fn scope_at(&self, span: Span) -> Option<ScopeId> {
        self.tree.innermost_containing(span)
    }

    /// Record `name` as last defined by `expr` in `scope`, replacing any
    /// earlier binding for the same name in that scope.
    pub fn record(&mut self, scope: ScopeId, name: &str, expr: &'ast Expr) {
        self.bindings.insert((scope, name.to_string()), expr);
    }

    /// Resolve `name` starting at `scope` and walking outward through
    /// enclosing scopes. Returns the defining expression, or `None` for
    /// names with no local definition (parameters, imports, globals).
    pub fn resolve(&self, scope: ScopeId, name: &str) -> Option<&'ast Expr> {
        for ancestor in self.tree.ancestors(scope) {
            if let Some(&expr) = self.bindings.get(&(ancestor.id, name.to_string())) {
                return Some(expr);
            }
        }
        None
    }
}

struct ScopeBinder<'ast> {
    model: ScopeModel<'ast>,
    current: Option<ScopeId>,
}

impl<'ast> ScopeBinder<'ast> {
    fn visit_module(&mut self, module: &'ast Module) {
        let root = self
            .model
            .tree
            .create_scope(ScopeKind::Global, None, module.span);
        self.current = Some(root);

        for item in &module.body {
            self.visit_module_item(item);
        }
    }

    fn visit_module_item(&mut self, item: &'ast ModuleItem) {
        match item {
            ModuleItem::Stmt(stmt) => self.visit_stmt(stmt),
            ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => self.visit_decl(&export.decl),
            ModuleItem::ModuleDecl(_) => {}
        }
    }

    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        match stmt {
            Stmt::Decl(decl) => self.visit_decl(decl),
            Stmt::Expr(expr_stmt) => self.visit_expr(&expr_stmt.expr),
            Stmt::Block(block) => self.visit_scoped_block(ScopeKind::Block, block),
            Stmt::If(if_stmt) => {
                self.visit_expr(&if_stmt.test);
                self.visit_stmt(&if_stmt.cons);
                if let Some(alt) = &if_stmt.alt {
                    self.visit_stmt(alt);
                }
            }
            Stmt::For(for_stmt) => {
                match &for_stmt.init {
                    Some(swc_ecma_ast::VarDeclOrExpr::VarDecl(var_decl)) => {
                        self.visit_var_decl(var_decl)
                    }
                    Some(swc_ecma_ast::VarDeclOrExpr::Expr(expr)) => self.visit_expr(expr),
                    None => {}
                }
                if let Some(test) = &for_stmt.test {
                    self.visit_expr(test);
                }
                if let Some(update) = &for_stmt.update {
                    self.visit_expr(update);
                }
                self.visit_stmt(&for_stmt.body);
            }
            Stmt::ForIn(for_in) => {
                self.visit_expr(&for_in.right);
                self.visit_stmt(&for_in.body);
            }
            Stmt::ForOf(for_of) => {
                self.visit_expr(&for_of.right);
                self.visit_stmt(&for_of.body);
            }
            Stmt::While(while_stmt) => {
                self.visit_expr(&while_stmt.test);
                self.visit_stmt(&while_stmt.body);
            }
            Stmt::DoWhile(do_while) => {
                self.visit_stmt(&do_while.body);
                self.visit_expr(&do_while.test);
            }
            Stmt::Return(ret) => {
                if let Some(arg) = &ret.arg {
                    self.visit_expr(arg);
                }
            }
            Stmt::Switch(switch_stmt) => {
                self.visit_expr(&switch_stmt.discriminant);
                for case in &switch_stmt.cases {
                    if let Some(test) = &case.test {
                        self.visit_expr(test);
                    }
                    for stmt in &case.cons {
                        self.visit_stmt(stmt);
                    }
                }
            }
            Stmt::Try(try_stmt) => {
                self.visit_scoped_block(ScopeKind::Block, &try_stmt.block);
                if let Some(handler) = &try_stmt.handler {
                    self.visit_scoped_block(ScopeKind::Block, &handler.body);
                }
                if let Some(finalizer) = &try_stmt.finalizer {
                    self.visit_scoped_block(ScopeKind::Block, finalizer);
                }
            }
            Stmt::Throw(throw) => self.visit_expr(&throw.arg),
            _ => {}
        }
    }

    fn visit_scoped_block(&mut self, kind: ScopeKind, block: &'ast BlockStmt) {
        let saved = self.current;
        let scope = self.model.tree.create_scope(kind, saved, block.span);
        self.current = Some(scope);

        for stmt in &block.stmts {
            self.visit_stmt(stmt);
        }

        self.current = saved;
    }

    fn visit_decl(&mut self, decl: &'ast Decl) {
        match decl {
            Decl::Var(var_decl) => self.visit_var_decl(var_decl),
            Decl::Fn(fn_decl) => self.visit_function(&fn_decl.function),
            Decl::Class(class_decl) => self.visit_class_members(&class_decl.class.body),
            _ => {}
        }
    }

    fn visit_var_decl(&mut self, var_decl: &'ast VarDecl) {
        for declarator in &var_decl.decls {
            if let Some(init) = &declarator.init {
                if let (Pat::Ident(ident), Some(scope)) = (&declarator.name, self.current) {
                    self.model.record(scope, ident.sym.as_ref(), init);
                }
                self.visit_expr(init);
            }
        }
    }

    fn visit_function(&mut self, function: &'ast Function) {
        // Parameters are intentionally not bound: a parameter has no local
        // defining expression and must resolve to nothing.
        let saved = self.current;
        let scope = self
            .model
            .tree
            .create_scope(ScopeKind::Function, saved, function.span);
        self.current = Some(scope);

        if let Some(body) = &function.body {
            for stmt in &body.stmts {
                self.visit_stmt(stmt);
            }
        }

        self.current = saved;
    }

    fn visit_class_members(&mut self, members: &'ast [ClassMember]) {
        for member in members {
            match member {
                ClassMember::Method(method) => self.visit_function(&method.function),
                ClassMember::Constructor(ctor) => {
                    if let Some(body) = &ctor.body {
                        self.visit_scoped_block(ScopeKind::Function, body);
                    }
                }
                ClassMember::PrivateMethod(method) => self.visit_function(&method.function),
                _ => {}
            }
        }
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        match expr {
            Expr::Assign(assign) => {
                self.visit_expr(&assign.right);

                if let AssignTarget::Simple(SimpleAssignTarget::Ident(ident)) = &assign.left {
                    if let Some(scope) = self.current {
                        if assign.op == AssignOp::Assign {
                            self.model.record(scope, ident.sym.as_ref(), &assign.right);
                        } else {
                            // Compound assignment (`q += x`) folds the old value
                            // in; bind the whole expression so later reads stay
                            // conservative.
                            self.model.record(scope, ident.sym.as_ref(), expr);
                        }
                    }
                }
            }
            Expr::Arrow(arrow) => {
                let saved = self.current;
                let scope = self
                    .model
                    .tree
                    .create_scope(ScopeKind::Arrow, saved, arrow.span);
                self.current = Some(scope);

                match &*arrow.body {
                    swc_ecma_ast::BlockStmtOrExpr::BlockStmt(block) => {
                        for stmt in &block.stmts {
                            self.visit_stmt(stmt);
                        }
                    }
                    swc_ecma_ast::BlockStmtOrExpr::Expr(body_expr) => self.visit_expr(body_expr),
                }

                self.current = saved;
            }
            Expr::Fn(fn_expr) => self.visit_function(&fn_expr.function),
            Expr::Class(class_expr) => self.visit_class_members(&class_expr.class.body),
            Expr::Call(call) => {
                for arg in &call.args {
                    self.visit_expr(&arg.expr);
                }
            }
            Expr::New(new_expr) => {
                if let Some(args) = &new_expr.args {
                    for arg in args {
                        self.visit_expr(&arg.expr);
                    }
                }
            }
            Expr::Member(member) => self.visit_expr(&member.obj),
            Expr::Bin(bin) => {
                self.visit_expr(&bin.left);
                self.visit_expr(&bin.right);
            }
            Expr::Cond(cond) => {
                self.visit_expr(&cond.test);
                self.visit_expr(&cond.cons);
                self.visit_expr(&cond.alt);
            }
            Expr::Seq(seq) => {
                for expr in &seq.exprs {
                    self.visit_expr(expr);
                }
            }
            Expr::Paren(paren) => self.visit_expr(&paren.expr),
            Expr::Unary(unary) => self.visit_expr(&unary.arg),
            Expr::Tpl(tpl) => {
                for expr in &tpl.exprs {
                    self.visit_expr(expr);
                }
            }
            Expr::TaggedTpl(tagged) => {
                self.visit_expr(&tagged.tag);
                for expr in &tagged.tpl.exprs {
                    self.visit_expr(expr);
                }
            }
            Expr::Array(array) => {
                for elem in array.elems.iter().flatten() {
                    self.visit_expr(&elem.expr);
                }
            }
            Expr::Object(obj) => {
                for prop in &obj.props {
                    if let swc_ecma_ast::PropOrSpread::Prop(prop) = prop {
                        if let swc_ecma_ast::Prop::KeyValue(kv) = &**prop {
                            self.visit_expr(&kv.value);
                        }
                    }
                }
            }
            Expr::Await(await_expr) => self.visit_expr(&await_expr.arg),
            Expr::Yield(yield_expr) => {
                if let Some(arg) = &yield_expr.arg {
                    self.visit_expr(arg);
                }
            }
            Expr::TsAs(as_expr) => self.visit_expr(&as_expr.expr),
            Expr::TsNonNull(non_null) => self.visit_expr(&non_null.expr),
            Expr::TsSatisfies(satisfies) => self.visit_expr(&satisfies.expr),
            _ => {}
        }
    }
}
