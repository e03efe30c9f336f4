//! sqlguard-core: SQL injection detection for JavaScript/TypeScript
//!
//! The engine parses source files with SWC, builds a per-file scope model,
//! and runs a taint classification over the arguments of database-query
//! call sites. Safe patterns (string literals, parameterized queries,
//! prepared statements) pass; runtime string construction flowing into a
//! query sink is reported.

pub mod analysis;
pub mod config;
pub mod diagnostic;
pub mod disable_comments;
pub mod parser;
pub mod rules;
pub mod semantic;
pub mod taint;
pub mod visitor;
