use super::{statements::Stmt, types::DataType};

/// Root of a compilation unit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub functions: Vec<FunctionDef>,
}

/// A function definition.
///
/// There is no declared return type, the checker infers it from the
/// function's `return` statements.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub locals: Vec<VariableDecl>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub ty: DataType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecl {
    pub name: String,
    pub ty: DataType,
}

impl Program {
    pub fn new(functions: Vec<FunctionDef>) -> Self {
        Program { functions }
    }
}

impl FunctionDef {
    pub fn new(name: &str) -> Self {
        FunctionDef {
            name: name.to_string(),
            parameters: vec![],
            locals: vec![],
            body: vec![],
        }
    }

    pub fn param(mut self, name: &str, ty: DataType) -> Self {
        self.parameters.push(Parameter {
            name: name.to_string(),
            ty,
        });
        self
    }

    pub fn local(mut self, name: &str, ty: DataType) -> Self {
        self.locals.push(VariableDecl {
            name: name.to_string(),
            ty,
        });
        self
    }

    pub fn body(mut self, body: Vec<Stmt>) -> Self {
        self.body = body;
        self
    }
}
