//! Condition descriptions and their compilation into expression strings.
//!
//! A condition is described as a tree of [`Condition`] nodes over attribute
//! [`Operand`]s. [`compile_condition`] lowers the tree into the expression
//! string grammar, substituting `#n` aliases for attribute names and `:n`
//! placeholders for literal values:
//!
//! 1. **Describe**: build the condition tree with explicit `And`/`Or`/`Not`
//!    constructors, so attribute names can never collide with connectives.
//! 2. **Compile**: walk the tree once, interning aliases and placeholders in
//!    encounter order into a per-call context.

pub mod ast;
pub mod compiler;

pub use ast::{Condition, Operand, Operator};
pub use compiler::{compile_condition, ConditionExpression, ExpressionError};
