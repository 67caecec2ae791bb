//! Runtime error types for the Shard evaluator.

use thiserror::Error;

use crate::value::Value;

/// A fatal runtime condition. Nothing here is recoverable: the running
/// program stops and the error is surfaced to the host.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// Array or string access outside the valid range.
    #[error("index {index} is out of range for length {len}")]
    IndexOutOfRange { index: i32, len: usize },

    /// `ReadInt` got something that is not an integer.
    #[error("malformed integer input: {0}")]
    InputFormat(String),

    /// Call depth exceeded the frame limit.
    #[error("call stack exhausted after {0} frames")]
    StackExhausted(usize),

    /// `/` or `%` with a zero right operand.
    #[error("division by zero")]
    DivisionByZero,

    /// Member or element access through `null`.
    #[error("null reference: {0}")]
    NullReference(String),

    /// `new T[n]` with `n < 0`.
    #[error("negative array length: {0}")]
    NegativeArrayLength(i32),

    /// An interpreter invariant was violated (unbound node, bad frame).
    /// Reaching this is a bug in the engine, not in the program.
    #[error("internal error: {0}")]
    Internal(String),

    /// `return` control flow; consumed by the call that pushed the frame
    /// and never surfaced to the host.
    #[error("return")]
    Return(Value),
}

/// Result alias for evaluator operations.
pub type EvalResult<T> = Result<T, RuntimeError>;
