//! Type system for the language.
//!
//! Pure functions deciding whether an operator accepts its operand types and
//! what the result type is. Nothing here is ever coerced: an explicit cast is
//! the only way to move between `int` and `float`.

pub mod type_system;
