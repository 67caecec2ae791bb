//! Shard semantic analysis.
//!
//! Four pieces, each depending only on the ones before it:
//!
//! - [`ty`]: the closed semantic type set and its assignability relation
//! - [`table`]: the immutable declaration table (classes, overload sets,
//!   pre-registered built-ins)
//! - [`resolve`]: the overload-resolution algorithm shared by method calls
//!   and operator applications
//! - [`checker`]: the binding pass that types every expression once and
//!   caches each call site's resolution in a side table

pub mod checker;
mod env;
pub mod resolve;
pub mod table;
pub mod ty;

pub use checker::{analyze, Analysis, Binding, Bindings};
pub use resolve::{resolve_overload, Candidate, ResolveError};
pub use table::{
    BuiltinMethod, BuiltinOp, ClassEntry, DeclTable, FieldSig, MethodKind, MethodRef, MethodSig,
    OperatorKind, OperatorRef, OperatorSig, CONSOLE_CLASS,
};
pub use ty::Type;
