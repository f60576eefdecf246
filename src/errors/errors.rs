use std::fmt::Display;

use thiserror::Error;

use crate::type_system::type_system::Type;

/// Stable codes for the recoverable semantic diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiagnosticCode {
    E1,
    E2,
    E3,
    E4,
    E5,
    E6,
    E7,
    E8,
    E9,
    E10,
    E11,
    E12,
    E13,
}

impl Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A recoverable semantic error found by the checker.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Diagnostic {
    #[error("name {name:?} is not defined")]
    UndefinedName { name: String },
    #[error("array {name:?} used without an index")]
    ArrayWithoutIndex { name: String },
    #[error("scalar {name:?} cannot be indexed")]
    IndexOnScalar { name: String },
    #[error("cannot assign {found} to {name:?} of type {expected}")]
    AssignmentMismatch {
        name: String,
        expected: Type,
        found: Type,
    },
    #[error("operator {operator} does not accept {left} and {right}")]
    OperatorMismatch {
        operator: String,
        left: Type,
        right: Type,
    },
    #[error("operator {operator} does not accept {operand}")]
    UnaryOperatorMismatch { operator: String, operand: Type },
    #[error("break outside of a while loop")]
    BreakOutsideLoop,
    #[error("function {name:?} is not defined")]
    UndefinedFunction { name: String },
    #[error("function {name:?} expects {expected} arguments, received {received}")]
    ArgumentCountMismatch {
        name: String,
        expected: usize,
        received: usize,
    },
    #[error("argument {position} of {name:?}: expected {expected}, received {received}")]
    ArgumentTypeMismatch {
        name: String,
        position: usize,
        expected: Type,
        received: Type,
    },
    #[error("program has no {name:?} function")]
    MissingEntryPoint { name: String },
    #[error("condition must be bool, found {found}")]
    ConditionNotBool { found: Type },
    #[error("function {name:?} returns {found} but already returned {expected}")]
    ReturnTypeConflict {
        name: String,
        expected: Type,
        found: Type,
    },
    #[error("index into {name:?} must be int, found {found}")]
    IndexNotInt { name: String, found: Type },
}

impl Diagnostic {
    pub fn code(&self) -> DiagnosticCode {
        match self {
            Diagnostic::UndefinedName { .. } => DiagnosticCode::E1,
            Diagnostic::ArrayWithoutIndex { .. } => DiagnosticCode::E2,
            Diagnostic::IndexOnScalar { .. } => DiagnosticCode::E3,
            Diagnostic::AssignmentMismatch { .. } => DiagnosticCode::E4,
            Diagnostic::OperatorMismatch { .. } | Diagnostic::UnaryOperatorMismatch { .. } => {
                DiagnosticCode::E5
            }
            Diagnostic::BreakOutsideLoop => DiagnosticCode::E6,
            Diagnostic::UndefinedFunction { .. } => DiagnosticCode::E7,
            Diagnostic::ArgumentCountMismatch { .. } => DiagnosticCode::E8,
            Diagnostic::ArgumentTypeMismatch { .. } => DiagnosticCode::E9,
            Diagnostic::MissingEntryPoint { .. } => DiagnosticCode::E10,
            Diagnostic::ConditionNotBool { .. } => DiagnosticCode::E11,
            Diagnostic::ReturnTypeConflict { .. } => DiagnosticCode::E12,
            Diagnostic::IndexNotInt { .. } => DiagnosticCode::E13,
        }
    }

    /// The primary name the diagnostic is about (variable, function or operator).
    pub fn name(&self) -> &str {
        match self {
            Diagnostic::UndefinedName { name }
            | Diagnostic::ArrayWithoutIndex { name }
            | Diagnostic::IndexOnScalar { name }
            | Diagnostic::AssignmentMismatch { name, .. }
            | Diagnostic::UndefinedFunction { name }
            | Diagnostic::ArgumentCountMismatch { name, .. }
            | Diagnostic::ArgumentTypeMismatch { name, .. }
            | Diagnostic::MissingEntryPoint { name }
            | Diagnostic::ReturnTypeConflict { name, .. }
            | Diagnostic::IndexNotInt { name, .. } => name,
            Diagnostic::OperatorMismatch { operator, .. }
            | Diagnostic::UnaryOperatorMismatch { operator, .. } => operator,
            Diagnostic::BreakOutsideLoop => "break",
            Diagnostic::ConditionNotBool { .. } => "condition",
        }
    }

    /// The type pair involved, when the diagnostic carries types.
    pub fn types(&self) -> (Option<Type>, Option<Type>) {
        match self {
            Diagnostic::AssignmentMismatch { expected, found, .. }
            | Diagnostic::ReturnTypeConflict { expected, found, .. } => {
                (Some(*expected), Some(*found))
            }
            Diagnostic::OperatorMismatch { left, right, .. } => (Some(*left), Some(*right)),
            Diagnostic::UnaryOperatorMismatch { operand, .. } => (Some(*operand), None),
            Diagnostic::ArgumentTypeMismatch { expected, received, .. } => {
                (Some(*expected), Some(*received))
            }
            Diagnostic::ConditionNotBool { found } | Diagnostic::IndexNotInt { found, .. } => {
                (Some(*found), None)
            }
            _ => (None, None),
        }
    }

    pub fn get_error_name(&self) -> &str {
        match self {
            Diagnostic::UndefinedName { .. } => "UndefinedName",
            Diagnostic::ArrayWithoutIndex { .. } => "ArrayWithoutIndex",
            Diagnostic::IndexOnScalar { .. } => "IndexOnScalar",
            Diagnostic::AssignmentMismatch { .. } => "AssignmentMismatch",
            Diagnostic::OperatorMismatch { .. } => "OperatorMismatch",
            Diagnostic::UnaryOperatorMismatch { .. } => "UnaryOperatorMismatch",
            Diagnostic::BreakOutsideLoop => "BreakOutsideLoop",
            Diagnostic::UndefinedFunction { .. } => "UndefinedFunction",
            Diagnostic::ArgumentCountMismatch { .. } => "ArgumentCountMismatch",
            Diagnostic::ArgumentTypeMismatch { .. } => "ArgumentTypeMismatch",
            Diagnostic::MissingEntryPoint { .. } => "MissingEntryPoint",
            Diagnostic::ConditionNotBool { .. } => "ConditionNotBool",
            Diagnostic::ReturnTypeConflict { .. } => "ReturnTypeConflict",
            Diagnostic::IndexNotInt { .. } => "IndexNotInt",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match self {
            Diagnostic::UndefinedName { name } => ErrorTip::Suggestion(format!(
                "Declare `{}` as a parameter or local variable",
                name
            )),
            Diagnostic::ArrayWithoutIndex { name } => {
                ErrorTip::Suggestion(format!("Index the array, e.g. `{}[0]`", name))
            }
            Diagnostic::IndexOnScalar { name } => {
                ErrorTip::Suggestion(format!("`{}` is not an array", name))
            }
            Diagnostic::AssignmentMismatch { expected, .. } => ErrorTip::Suggestion(format!(
                "Convert the value with an explicit `{}(...)` cast",
                expected
            )),
            Diagnostic::OperatorMismatch { .. } => ErrorTip::Suggestion(String::from(
                "Both operands must have the same type, there is no implicit conversion",
            )),
            Diagnostic::ArgumentCountMismatch { expected, received, .. } => ErrorTip::Suggestion(
                format!("Expected {} arguments, received {}", expected, received),
            ),
            Diagnostic::ArgumentTypeMismatch { expected, received, .. } => {
                ErrorTip::Suggestion(format!(
                    "Expected argument type `{}`, received `{}`",
                    expected, received
                ))
            }
            Diagnostic::MissingEntryPoint { name } => {
                ErrorTip::Suggestion(format!("Define a function called `{}`", name))
            }
            Diagnostic::UndefinedFunction { .. } => ErrorTip::Suggestion(String::from(
                "Functions must be defined before they are called",
            )),
            Diagnostic::UnaryOperatorMismatch { .. }
            | Diagnostic::BreakOutsideLoop
            | Diagnostic::ConditionNotBool { .. }
            | Diagnostic::ReturnTypeConflict { .. }
            | Diagnostic::IndexNotInt { .. } => ErrorTip::None,
        }
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

/// What a name was previously declared as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Function,
    Variable,
    Parameter,
}

impl Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SymbolKind::Function => write!(f, "function"),
            SymbolKind::Variable => write!(f, "variable"),
            SymbolKind::Parameter => write!(f, "parameter"),
        }
    }
}

/// A name declared twice in one scope.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{name:?} already declared as {prior} in {scope_context}")]
pub struct AlreadyDeclared {
    pub name: String,
    pub scope_context: String,
    pub prior: SymbolKind,
}

/// Fatal errors that stop the checker.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CheckError {
    #[error(transparent)]
    AlreadyDeclared(#[from] AlreadyDeclared),
}

/// Precondition violations hit while lowering an unchecked tree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LowerError {
    #[error("no register bound to {name:?} in {function:?}")]
    UnboundName { function: String, name: String },
    #[error("call to unknown function {name:?}")]
    UnknownFunction { name: String },
    #[error("function {name:?} has no scope")]
    MissingScope { name: String },
    #[error("break outside of a loop in {function:?}")]
    BreakOutsideLoop { function: String },
    #[error("expression of type {ty} has no register value")]
    NotAValue { ty: Type },
    #[error("operator {operator} cannot be lowered here")]
    UnsupportedOperator { operator: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("{0}")]
    Check(#[from] CheckError),
    #[error("semantic analysis reported {} diagnostic(s)", .0.len())]
    Semantic(Vec<Diagnostic>),
    #[error("{0}")]
    Lower(#[from] LowerError),
}
