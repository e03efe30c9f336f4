//! Semantic analysis: lexical scopes and name bindings
//!
//! The scope model gives the taint engine its view of "which expression does
//! this name currently stand for" at any point in the tree.

mod binder;
pub mod scope;

pub use binder::ScopeModel;
pub use scope::{Scope, ScopeId, ScopeKind, ScopeTree};
