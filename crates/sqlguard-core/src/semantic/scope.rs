//! Lexical scope tree for variable binding resolution
//!
//! Represents nested program scopes (global, function, block) as an
//! arena-backed tree. Each scope knows its source span, so any AST node can
//! be mapped back to the innermost scope that contains it.

use id_arena::{Arena, Id};
use swc_common::Span;

pub type ScopeId = Id<Scope>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Function,
    Arrow,
    Block,
}

#[derive(Debug)]
pub struct Scope {
    pub id: ScopeId,
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    pub span: Span,
}

pub struct ScopeTree {
    arena: Arena<Scope>,
    root: Option<ScopeId>,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    pub fn create_scope(
        &mut self,
        kind: ScopeKind,
        parent: Option<ScopeId>,
        span: Span,
    ) -> ScopeId {
        let id = self.arena.alloc_with_id(|id| Scope {
            id,
            kind,
            parent,
            children: Vec::new(),
            span,
        });

        if let Some(parent_id) = parent {
            self.arena[parent_id].children.push(id);
        }

        if self.root.is_none() {
            self.root = Some(id);
        }

        id
    }

    pub fn root(&self) -> Option<ScopeId> {
        self.root
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.arena[id]
    }

    pub fn parent(&self, id: ScopeId) -> Option<&Scope> {
        self.arena[id].parent.map(|p| &self.arena[p])
    }

    pub fn ancestors(&self, id: ScopeId) -> AncestorIter<'_> {
        AncestorIter {
            tree: self,
            current: Some(id),
        }
    }

    /// The innermost scope whose span contains `span`, or the root when no
    /// nested scope does. Returns `None` only for an empty tree.
    pub fn innermost_containing(&self, span: Span) -> Option<ScopeId> {
        let root = self.root?;
        let mut current = root;

        'descend: loop {
            for &child_id in &self.arena[current].children {
                let child = &self.arena[child_id];
                if child.span.lo <= span.lo && span.hi <= child.span.hi {
                    current = child_id;
                    continue 'descend;
                }
            }
            return Some(current);
        }
    }
}

pub struct AncestorIter<'a> {
    tree: &'a ScopeTree,
    current: Option<ScopeId>,
}

impl<'a> Iterator for AncestorIter<'a> {
    type Item = &'a Scope;

    fn next(&mut self) -> Option<Self::Item> {
        let current_id = self.current?;
        let scope = &self.tree.arena[current_id];
        self.current = scope.parent;
        Some(scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swc_common::BytePos;

    fn span_at(lo: u32, hi: u32) -> Span {
        Span::new(BytePos(lo), BytePos(hi))
    }

    #[test]
    fn creates_global_scope() {
        let mut tree = ScopeTree::new();
        let global = tree.create_scope(ScopeKind::Global, None, span_at(0, 100));

        assert_eq!(tree.root(), Some(global));

        let scope = tree.get(global);
        assert_eq!(scope.kind, ScopeKind::Global);
        assert!(scope.parent.is_none());
        assert!(scope.children.is_empty());
    }

    #[test]
    fn nested_scopes_have_correct_parent_chain() {
        let mut tree = ScopeTree::new();
        let global = tree.create_scope(ScopeKind::Global, None, span_at(0, 100));
        let func = tree.create_scope(ScopeKind::Function, Some(global), span_at(10, 90));
        let block = tree.create_scope(ScopeKind::Block, Some(func), span_at(20, 80));

        assert_eq!(tree.get(block).parent, Some(func));
        assert_eq!(tree.get(func).parent, Some(global));
        assert_eq!(tree.get(global).children, vec![func]);
        assert_eq!(tree.get(func).children, vec![block]);
    }

    #[test]
    fn ancestors_iterator_walks_outward() {
        let mut tree = ScopeTree::new();
        let global = tree.create_scope(ScopeKind::Global, None, span_at(0, 100));
        let func = tree.create_scope(ScopeKind::Function, Some(global), span_at(10, 90));
        let block = tree.create_scope(ScopeKind::Block, Some(func), span_at(20, 80));

        let kinds: Vec<ScopeKind> = tree.ancestors(block).map(|s| s.kind).collect();

        assert_eq!(
            kinds,
            vec![ScopeKind::Block, ScopeKind::Function, ScopeKind::Global]
        );
    }

    #[test]
    fn innermost_containing_picks_deepest_scope() {
        let mut tree = ScopeTree::new();
        let global = tree.create_scope(ScopeKind::Global, None, span_at(0, 100));
        let func = tree.create_scope(ScopeKind::Function, Some(global), span_at(10, 90));
        let block = tree.create_scope(ScopeKind::Block, Some(func), span_at(20, 80));

        assert_eq!(tree.innermost_containing(span_at(30, 40)), Some(block));
        assert_eq!(tree.innermost_containing(span_at(12, 15)), Some(func));
        assert_eq!(tree.innermost_containing(span_at(95, 99)), Some(global));
    }

    #[test]
    fn innermost_containing_with_sibling_scopes() {
        let mut tree = ScopeTree::new();
        let global = tree.create_scope(ScopeKind::Global, None, span_at(0, 100));
        let first = tree.create_scope(ScopeKind::Function, Some(global), span_at(10, 40));
        let second = tree.create_scope(ScopeKind::Function, Some(global), span_at(50, 90));

        assert_eq!(tree.innermost_containing(span_at(15, 20)), Some(first));
        assert_eq!(tree.innermost_containing(span_at(60, 70)), Some(second));
    }

    #[test]
    fn empty_tree_has_no_innermost_scope() {
        let tree = ScopeTree::new();

        assert_eq!(tree.innermost_containing(span_at(1, 2)), None);
    }
}
