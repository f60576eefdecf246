//! Intermediate code generation module for the compiler.
//!
//! This module lowers a checked AST into three-address code. It handles:
//!
//! - Virtual register allocation and the name to register binding map
//! - Lowering of expressions (bottom up, left operand first)
//! - Lowering of statements, including labels and branches for control flow
//! - The instruction set and its textual form

pub mod compiler;
pub mod expr;
pub mod ir;
pub mod stmt;

#[cfg(test)]
mod tests;
