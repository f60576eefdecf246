//! Error types and error handling for the compiler.
//!
//! This module defines the error types used throughout the compilation
//! process. It includes:
//!
//! - Recoverable semantic diagnostics, each tied to a stable code
//! - Fatal construction errors (duplicate declarations)
//! - Lowering precondition errors
//! - Helpful error messages and suggestions

pub mod errors;
