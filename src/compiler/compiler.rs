//! Main lowering module.
//!
//! This module contains the per-function [`Compiler`] state and the
//! [`generate`] entry point that lowers a checked program into one
//! three-address instruction list per function.

use std::collections::HashMap;

use log::{debug, trace};

use crate::{
    ast::ast::{FunctionDef, Program},
    errors::errors::LowerError,
    symbol_table::symbol_table::{FunctionDecl, ScopeId, ScopeTree, Symbol},
    type_system::type_system::Type,
    Options,
};

use super::{
    ir::{FunctionIR, Instr, ProgramIR, Register},
    stmt::gen_statement,
};

/// Hands out virtual registers and remembers which register currently holds
/// each declared name.
///
/// Labels are numbered from the same counter, so a label can never collide
/// with another one in the same function.
#[derive(Debug, Clone)]
pub struct RegisterAllocator {
    prefix: String,
    counter: usize,
    bindings: HashMap<String, Register>,
}

impl RegisterAllocator {
    pub fn new(prefix: &str) -> Self {
        RegisterAllocator {
            prefix: prefix.to_string(),
            counter: 0,
            bindings: HashMap::new(),
        }
    }

    fn next_id(&mut self) -> usize {
        self.counter += 1;
        self.counter
    }

    pub fn fresh(&mut self) -> Register {
        let id = self.next_id();
        Register(format!("{}{}", self.prefix, id))
    }

    /// A fresh numeric suffix for a group of related labels.
    pub fn fresh_label_id(&mut self) -> usize {
        self.next_id()
    }

    pub fn bind(&mut self, name: &str, register: Register) {
        self.bindings.insert(name.to_string(), register);
    }

    pub fn lookup(&self, name: &str) -> Option<&Register> {
        self.bindings.get(name)
    }
}

/// Lowering state for one function.
///
/// # Type Parameters
///
/// * `'a` - Lifetime of the checked scope tree and the options
pub struct Compiler<'a> {
    /// The decorated scope tree produced by the checker (read-only)
    pub scopes: &'a ScopeTree,
    pub options: &'a Options,
    /// Name of the function being lowered
    pub function: String,
    /// That function's scope
    pub scope: ScopeId,
    pub allocator: RegisterAllocator,
    /// Exit labels of the enclosing loops, innermost last
    pub loop_exits: Vec<String>,
    pub instrs: Vec<Instr>,
}

impl<'a> Compiler<'a> {
    /// Creates the lowering state for `function`.
    ///
    /// # Arguments
    ///
    /// * `scopes` - The scope tree returned by the checker
    /// * `options` - Shared options (register naming)
    /// * `function` - Name of the function to lower
    pub fn new(
        scopes: &'a ScopeTree,
        options: &'a Options,
        function: &str,
    ) -> Result<Self, LowerError> {
        let scope = scopes
            .function_scope(function)
            .ok_or_else(|| LowerError::MissingScope {
                name: function.to_string(),
            })?;

        Ok(Compiler {
            scopes,
            options,
            function: function.to_string(),
            scope,
            allocator: RegisterAllocator::new(&options.register_prefix),
            loop_exits: vec![],
            instrs: vec![],
        })
    }

    pub fn emit(&mut self, instr: Instr) {
        trace!("{}: {}", self.function, instr);
        self.instrs.push(instr);
    }

    /// Register currently holding `name`.
    pub fn bound(&self, name: &str) -> Result<Register, LowerError> {
        self.allocator
            .lookup(name)
            .cloned()
            .ok_or_else(|| LowerError::UnboundName {
                function: self.function.clone(),
                name: name.to_string(),
            })
    }

    /// Declared type of a variable or parameter visible from this function.
    pub fn variable_type(&self, name: &str) -> Result<Type, LowerError> {
        self.scopes
            .resolve_variable(self.scope, name)
            .and_then(Symbol::data_type)
            .map(Type::from)
            .ok_or_else(|| LowerError::UnboundName {
                function: self.function.clone(),
                name: name.to_string(),
            })
    }

    pub fn callee(&self, name: &str) -> Result<&'a FunctionDecl, LowerError> {
        self.scopes
            .resolve_function(self.scope, name)
            .ok_or_else(|| LowerError::UnknownFunction {
                name: name.to_string(),
            })
    }

    /// Binds `name` to a fresh register loaded from its named slot.
    pub fn reload(&mut self, name: &str) {
        let dst = self.allocator.fresh();
        self.emit(Instr::LoadI {
            name: name.to_string(),
            dst: dst.clone(),
        });
        self.allocator.bind(name, dst);
    }

    /// Lowers one function definition into its instruction list.
    pub fn compile_function(mut self, function: &FunctionDef) -> Result<FunctionIR, LowerError> {
        for param in function.parameters.iter() {
            self.reload(&param.name);
        }
        for local in function.locals.iter() {
            self.reload(&local.name);
        }

        for stmt in function.body.iter() {
            gen_statement(&mut self, stmt)?;
        }

        debug!(
            "lowered {} into {} instruction(s)",
            self.function,
            self.instrs.len()
        );

        Ok(FunctionIR {
            name: self.function,
            instrs: self.instrs,
        })
    }
}

/// Lowers a checked program.
///
/// `scopes` must come from a checker run over the same `program` that
/// reported no diagnostics; anything else surfaces as a [`LowerError`].
pub fn generate(
    program: &Program,
    scopes: &ScopeTree,
    options: &Options,
) -> Result<ProgramIR, LowerError> {
    let mut out = ProgramIR::new();
    for function in program.functions.iter() {
        let compiler = Compiler::new(scopes, options, &function.name)?;
        out.functions.push(compiler.compile_function(function)?);
    }
    Ok(out)
}
