use super::expressions::{Expr, Location};

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Assign(Location, Expr),
    Print(String),
    Write(Expr),
    Read(Location),
    While(Expr, Box<Stmt>),
    Break,
    If(Expr, Box<Stmt>, Option<Box<Stmt>>),
    Return(Expr),
    Skip,
    Block(Vec<Stmt>),
}

impl Stmt {
    pub fn assign(name: &str, value: Expr) -> Self {
        Stmt::Assign(Location::Simple(name.to_string()), value)
    }

    pub fn assign_index(name: &str, index: Expr, value: Expr) -> Self {
        Stmt::Assign(Location::Array(name.to_string(), Box::new(index)), value)
    }

    pub fn while_loop(condition: Expr, body: Stmt) -> Self {
        Stmt::While(condition, Box::new(body))
    }

    pub fn if_then(condition: Expr, then_body: Stmt) -> Self {
        Stmt::If(condition, Box::new(then_body), None)
    }

    pub fn if_else(condition: Expr, then_body: Stmt, else_body: Stmt) -> Self {
        Stmt::If(condition, Box::new(then_body), Some(Box::new(else_body)))
    }
}
