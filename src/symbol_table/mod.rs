//! Symbol table for name resolution.
//!
//! A tree of lexical scopes (global plus one per function) mapping names to
//! their declarations. Lookup walks from the innermost scope outwards and
//! keeps the function namespace apart from the variable namespace.

pub mod symbol_table;
