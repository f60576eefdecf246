use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display, str::FromStr};

use super::types::ScalarType;

lazy_static! {
    /// Operator spellings handed over by the parser.
    pub static ref OPERATOR_LOOKUP: HashMap<&'static str, Operator> = {
        let mut map = HashMap::new();
        map.insert("+", Operator::Plus);
        map.insert("-", Operator::Minus);
        map.insert("*", Operator::Star);
        map.insert("/", Operator::Slash);
        map.insert("<", Operator::Less);
        map.insert("<=", Operator::LessEquals);
        map.insert(">", Operator::Greater);
        map.insert(">=", Operator::GreaterEquals);
        map.insert("==", Operator::Equals);
        map.insert("!=", Operator::NotEquals);
        map.insert("and", Operator::And);
        map.insert("or", Operator::Or);
        map.insert("not", Operator::Not);
        map
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Operator {
    Plus,
    Minus,
    Star,
    Slash,

    Less,
    LessEquals,
    Greater,
    GreaterEquals,
    Equals,
    NotEquals,

    And,
    Or,
    Not,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Plus => "+",
            Operator::Minus => "-",
            Operator::Star => "*",
            Operator::Slash => "/",
            Operator::Less => "<",
            Operator::LessEquals => "<=",
            Operator::Greater => ">",
            Operator::GreaterEquals => ">=",
            Operator::Equals => "==",
            Operator::NotEquals => "!=",
            Operator::And => "and",
            Operator::Or => "or",
            Operator::Not => "not",
        }
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            Operator::Plus | Operator::Minus | Operator::Star | Operator::Slash
        )
    }

    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            Operator::Less
                | Operator::LessEquals
                | Operator::Greater
                | Operator::GreaterEquals
                | Operator::Equals
                | Operator::NotEquals
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, Operator::And | Operator::Or | Operator::Not)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOperator(pub String);

impl FromStr for Operator {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OPERATOR_LOOKUP
            .get(s)
            .copied()
            .ok_or_else(|| UnknownOperator(s.to_string()))
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A storage location: a bare name or an indexed array element.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    Simple(String),
    Array(String, Box<Expr>),
}

impl Location {
    pub fn name(&self) -> &str {
        match self {
            Location::Simple(name) | Location::Array(name, _) => name,
        }
    }
}

/// Expression nodes.
///
/// `Binary` carries the arithmetic operators, `Logical` the relational ones
/// together with `and`/`or`.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Int(i64),
    Float(f64),
    Location(Location),
    TypeCast(ScalarType, Box<Expr>),
    Call(String, Vec<Expr>),
    Binary(Operator, Box<Expr>, Box<Expr>),
    Logical(Operator, Box<Expr>, Box<Expr>),
    Unary(Operator, Box<Expr>),
}

impl Expr {
    pub fn var(name: &str) -> Self {
        Expr::Location(Location::Simple(name.to_string()))
    }

    pub fn index(name: &str, index: Expr) -> Self {
        Expr::Location(Location::Array(name.to_string(), Box::new(index)))
    }

    pub fn cast(target: ScalarType, expr: Expr) -> Self {
        Expr::TypeCast(target, Box::new(expr))
    }

    pub fn call(name: &str, args: Vec<Expr>) -> Self {
        Expr::Call(name.to_string(), args)
    }

    pub fn binary(op: Operator, left: Expr, right: Expr) -> Self {
        Expr::Binary(op, Box::new(left), Box::new(right))
    }

    pub fn logical(op: Operator, left: Expr, right: Expr) -> Self {
        Expr::Logical(op, Box::new(left), Box::new(right))
    }

    pub fn unary(op: Operator, operand: Expr) -> Self {
        Expr::Unary(op, Box::new(operand))
    }
}
