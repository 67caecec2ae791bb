//! Shared types for the Shard engine.
//!
//! This crate defines the AST node types, source spans, error types,
//! and other shared data structures used across all engine stages.

mod error;
mod span;
pub mod ast;

pub use error::{CompileErrors, ErrorCategory, ErrorCode, Severity, ShardError, MAX_ERRORS};
pub use span::{SourceFile, Span};

/// Result type used throughout the Shard front end.
pub type Result<T> = std::result::Result<T, ShardError>;
