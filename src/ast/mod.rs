/// AST (Abstract Syntax Tree) module
/// Contains the node taxonomy handed over by the parser
///
/// Submodules:
/// - ast: Program, function definitions and declarations
/// - expressions: Expressions, locations and operators
/// - statements: Statements
/// - types: Declared (source-level) types
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;
