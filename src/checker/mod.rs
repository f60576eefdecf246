//! Semantic analysis module.
//!
//! This module walks the AST once, in source order, and:
//!
//! - Declares functions, parameters and locals in the scope tree
//! - Resolves every location and call against the enclosing scopes
//! - Types every expression with the rules in [`crate::type_system`]
//! - Validates `break` placement and the presence of an entry point
//!
//! Recoverable problems are collected as diagnostics and the walk carries on;
//! an expression that already produced a diagnostic types as `None` so that
//! nothing depending on it is reported a second time.

pub mod checker;
