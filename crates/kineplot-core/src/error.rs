//! Core Error Types
//!
//! Errors raised by expression evaluation, compilation and the
//! frame/point graphs.

use thiserror::Error;

/// Errors raised while evaluating expressions or compiled programs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// A symbol had no bound value at evaluation time
    #[error("unbound symbol `{0}`")]
    UnboundSymbol(String),

    /// A compiled evaluator was called with the wrong number of arguments
    #[error("expected {expected} arguments, got {got}")]
    ArityMismatch { expected: usize, got: usize },

    /// A compiled program popped an empty stack (corrupt program)
    #[error("stack underflow while running compiled program")]
    StackUnderflow,
}

/// Errors raised while compiling expressions to stack programs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// An expression references a symbol not listed in the arguments
    #[error("symbol `{0}` is not among the evaluator arguments")]
    UnboundSymbol(String),
}

/// Errors raised by reference-frame graph queries.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameError {
    /// Two frames do not share a common ancestor
    #[error("frames `{a}` and `{b}` are not connected")]
    Disconnected { a: String, b: String },
}

/// Errors raised by point graph queries.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PointError {
    /// Two points do not share a common ancestor
    #[error("points `{a}` and `{b}` are not connected")]
    Disconnected { a: String, b: String },
}
