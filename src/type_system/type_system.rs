use std::fmt::Display;

use crate::ast::{
    expressions::Operator,
    types::{DataType, ScalarType},
};

/// Types an expression can have once checked.
///
/// `Bool` only ever comes out of relational/logical operators and is used for
/// conditions. `Void` is the type of a call to a function that never returned
/// a value; it is a real type, unlike the checker's "unknown" (`None`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Float,
    Bool,
    Void,
    Array(ScalarType, usize),
}

impl Type {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Float)
    }

    /// The scalar kind behind numeric types.
    pub fn scalar(&self) -> Option<ScalarType> {
        match self {
            Type::Int => Some(ScalarType::Int),
            Type::Float => Some(ScalarType::Float),
            _ => None,
        }
    }
}

impl From<ScalarType> for Type {
    fn from(scalar: ScalarType) -> Self {
        match scalar {
            ScalarType::Int => Type::Int,
            ScalarType::Float => Type::Float,
        }
    }
}

impl From<DataType> for Type {
    fn from(data_type: DataType) -> Self {
        match data_type {
            DataType::Simple(scalar) => scalar.into(),
            DataType::Array(scalar, dim) => Type::Array(scalar, dim),
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Float => write!(f, "float"),
            Type::Bool => write!(f, "bool"),
            Type::Void => write!(f, "void"),
            Type::Array(scalar, dim) => write!(f, "{}[{}]", scalar, dim),
        }
    }
}

/// Result type of `left op right`, or `None` when the operands don't fit.
///
/// There is no implicit int/float promotion: both sides must already agree.
pub fn check_binary_op(op: Operator, left: Type, right: Type) -> Option<Type> {
    if op.is_arithmetic() {
        (left == right && left.is_numeric()).then_some(left)
    } else if op.is_relational() {
        (left == right && left.is_numeric()).then_some(Type::Bool)
    } else {
        match op {
            Operator::And | Operator::Or => {
                (left == Type::Bool && right == Type::Bool).then_some(Type::Bool)
            }
            _ => None,
        }
    }
}

/// Result type of `op operand`, or `None` when the operand doesn't fit.
pub fn check_unary_op(op: Operator, operand: Type) -> Option<Type> {
    match op {
        Operator::Plus | Operator::Minus => operand.is_numeric().then_some(operand),
        Operator::Not => (operand == Type::Bool).then_some(Type::Bool),
        _ => None,
    }
}

/// Result type of an explicit cast.
///
/// Casts are trusted: the target wins whatever the inner expression was,
/// including an inner expression that already failed to check.
pub fn check_cast(target: ScalarType) -> Type {
    target.into()
}
