//! Type annotations as written in the source program.
//!
//! Declarations carry either a simple scalar type (`int`, `float`) or an
//! array type with a fixed dimension. These are the *declared* types; the
//! checker maps them onto the richer [`Type`](crate::type_system::type_system::Type)
//! lattice which also knows about `bool` and `void`.

use std::fmt::Display;

/// The two scalar types a program can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Int,
    Float,
}

impl ScalarType {
    /// Maps a type keyword onto a scalar type.
    ///
    /// The parser only hands over `int` or `float`, anything else is `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int" => Some(ScalarType::Int),
            "float" => Some(ScalarType::Float),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScalarType::Int => "int",
            ScalarType::Float => "float",
        }
    }
}

impl Display for ScalarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A declared type: `SimpleType(name)` or `ArrayType(name, dim)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Simple(ScalarType),
    Array(ScalarType, usize),
}

impl DataType {
    pub fn int() -> Self {
        DataType::Simple(ScalarType::Int)
    }

    pub fn float() -> Self {
        DataType::Simple(ScalarType::Float)
    }

    pub fn array(scalar: ScalarType, dim: usize) -> Self {
        DataType::Array(scalar, dim)
    }

    /// Element type for arrays, the type itself for scalars.
    pub fn scalar(&self) -> ScalarType {
        match self {
            DataType::Simple(scalar) | DataType::Array(scalar, _) => *scalar,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, DataType::Array(..))
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataType::Simple(scalar) => write!(f, "{}", scalar),
            DataType::Array(scalar, dim) => write!(f, "{}[{}]", scalar, dim),
        }
    }
}
