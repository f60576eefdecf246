#![allow(clippy::module_inception)]

use log::debug;

use crate::{
    ast::ast::Program,
    compiler::ir::ProgramIR,
    errors::errors::CompileError,
};

pub mod ast;
pub mod checker;
pub mod compiler;
pub mod errors;
pub mod symbol_table;
pub mod type_system;

/// Knobs shared by the checker and the IR generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Function every program must define.
    pub entry_point: String,
    /// Prefix of virtual register names in the IR (`R1`, `R2`, ...).
    pub register_prefix: String,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            entry_point: String::from("main"),
            register_prefix: String::from("R"),
        }
    }
}

/// Checks `program` and, when it is free of diagnostics, lowers it to IR.
///
/// The IR generator is never run over a program that failed to check.
pub fn compile(program: &Program, options: &Options) -> Result<ProgramIR, CompileError> {
    let checked = checker::checker::check(program, options)?;

    if !checked.is_ok() {
        debug!("not lowering: {} diagnostic(s)", checked.diagnostics.len());
        return Err(CompileError::Semantic(checked.diagnostics));
    }

    Ok(compiler::compiler::generate(program, &checked.scopes, options)?)
}
