use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of errors reported before fail-fast.
pub const MAX_ERRORS: usize = 20;

/// Error severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Error category, determined by error code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Syntax,
    Type,
    Resolution,
    Declaration,
    Access,
}

/// Numeric error code (E100–E599).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Syntax errors (E100–E199) ──
    pub const UNEXPECTED_TOKEN: Self = Self(100);
    pub const UNTERMINATED_STRING: Self = Self(101);
    pub const UNTERMINATED_COMMENT: Self = Self(102);
    pub const INVALID_ESCAPE: Self = Self(103);
    pub const INVALID_CHAR_LITERAL: Self = Self(104);
    pub const INT_LITERAL_OVERFLOW: Self = Self(105);
    pub const UNEXPECTED_CHARACTER: Self = Self(106);

    // ── Type errors (E200–E299) ──
    pub const UNKNOWN_TYPE: Self = Self(200);
    pub const TYPE_MISMATCH: Self = Self(201);
    pub const ARRAY_INDEX_NOT_INT: Self = Self(202);
    pub const CANNOT_INFER_VAR: Self = Self(203);
    pub const VOID_VALUE: Self = Self(204);

    // ── Resolution errors (E300–E399) ──
    pub const NO_APPLICABLE_OVERLOAD: Self = Self(300);
    pub const AMBIGUOUS_OVERLOAD: Self = Self(301);
    pub const UNDEFINED_VARIABLE: Self = Self(302);
    pub const UNKNOWN_MEMBER: Self = Self(303);
    pub const NOT_CALLABLE: Self = Self(304);
    pub const NOT_ASSIGNABLE_TARGET: Self = Self(305);

    // ── Declaration errors (E400–E499) ──
    pub const DUPLICATE_OVERLOAD: Self = Self(400);
    pub const DUPLICATE_FIELD: Self = Self(401);
    pub const DUPLICATE_CLASS: Self = Self(402);
    pub const DUPLICATE_VARIABLE: Self = Self(403);
    pub const NO_ENTRY_POINT: Self = Self(404);
    pub const MULTIPLE_ENTRY_POINTS: Self = Self(405);
    pub const READONLY_PROPERTY: Self = Self(406);
    pub const BAD_OPERATOR_ARITY: Self = Self(407);

    // ── Access errors (E500–E599) ──
    pub const PRIVATE_MEMBER_ACCESS: Self = Self(500);
    pub const INSTANCE_MEMBER_IN_STATIC: Self = Self(501);
    pub const STATIC_CALL_ON_INSTANCE: Self = Self(502);

    /// Get the category for this error code.
    pub fn category(self) -> ErrorCategory {
        match self.0 {
            100..=199 => ErrorCategory::Syntax,
            200..=299 => ErrorCategory::Type,
            300..=399 => ErrorCategory::Resolution,
            400..=499 => ErrorCategory::Declaration,
            500..=599 => ErrorCategory::Access,
            _ => ErrorCategory::Syntax, // fallback
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// A structured Shard diagnostic.
///
/// Hosts render these directly; messages are stable and the numeric code
/// identifies the failure class without string matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShardError {
    /// Source file name.
    pub file: String,
    /// Error code (e.g., E300).
    pub code: ErrorCode,
    /// Error severity.
    pub severity: Severity,
    /// Error category (derived from code).
    pub category: ErrorCategory,
    /// Human-readable error message.
    pub message: String,
    /// Source location.
    #[serde(flatten)]
    pub span: Span,
    /// The exact source line for context.
    pub source_line: String,
    /// Optional fix suggestion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ShardError {
    /// Create a new error.
    pub fn new(
        file: impl Into<String>,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        source_line: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            code,
            severity: Severity::Error,
            category: code.category(),
            message: message.into(),
            span,
            source_line: source_line.into(),
            suggestion: None,
        }
    }

    /// Attach a fix suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for ShardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} [{}] {}",
            self.span, self.code, self.category, self.message
        )
    }
}

impl std::error::Error for ShardError {}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => write!(f, "syntax"),
            Self::Type => write!(f, "type"),
            Self::Resolution => write!(f, "resolution"),
            Self::Declaration => write!(f, "declaration"),
            Self::Access => write!(f, "access"),
        }
    }
}

/// Collected diagnostics for one front-end run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileErrors {
    pub errors: Vec<ShardError>,
    pub warnings: Vec<ShardError>,
    pub total_errors: usize,
    pub total_warnings: usize,
}

impl CompileErrors {
    /// Create an empty result (no errors).
    pub fn empty() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            total_errors: 0,
            total_warnings: 0,
        }
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    /// Add an error, respecting the MAX_ERRORS limit.
    pub fn push_error(&mut self, error: ShardError) {
        if self.errors.len() < MAX_ERRORS {
            self.errors.push(error);
        }
        self.total_errors += 1;
    }

    /// Add a warning.
    pub fn push_warning(&mut self, warning: ShardError) {
        self.warnings.push(warning);
        self.total_warnings += 1;
    }

    /// Move every diagnostic from `other` into `self`, preserving totals
    /// even when `other` already hit the storage cap.
    pub fn absorb(&mut self, other: CompileErrors) {
        let error_overflow = other.total_errors.saturating_sub(other.errors.len());
        for e in other.errors {
            self.push_error(e);
        }
        self.total_errors += error_overflow;
        let warning_overflow = other.total_warnings.saturating_sub(other.warnings.len());
        for w in other.warnings {
            self.push_warning(w);
        }
        self.total_warnings += warning_overflow;
    }
}

impl Default for CompileErrors {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_category() {
        assert_eq!(ErrorCode::UNEXPECTED_TOKEN.category(), ErrorCategory::Syntax);
        assert_eq!(ErrorCode::TYPE_MISMATCH.category(), ErrorCategory::Type);
        assert_eq!(
            ErrorCode::NO_APPLICABLE_OVERLOAD.category(),
            ErrorCategory::Resolution
        );
        assert_eq!(
            ErrorCode::DUPLICATE_OVERLOAD.category(),
            ErrorCategory::Declaration
        );
        assert_eq!(
            ErrorCode::PRIVATE_MEMBER_ACCESS.category(),
            ErrorCategory::Access
        );
    }

    #[test]
    fn error_code_display() {
        assert_eq!(format!("{}", ErrorCode::AMBIGUOUS_OVERLOAD), "E301");
        assert_eq!(format!("{}", ErrorCode::UNEXPECTED_TOKEN), "E100");
    }

    #[test]
    fn shard_error_creation() {
        let err = ShardError::new(
            "overloads.shard",
            ErrorCode::AMBIGUOUS_OVERLOAD,
            "call to 'Method' is ambiguous",
            Span::new(12, 5, 12, 22),
            "        m.Method(null);",
        );
        assert_eq!(err.code, ErrorCode::AMBIGUOUS_OVERLOAD);
        assert_eq!(err.severity, Severity::Error);
        assert_eq!(err.category, ErrorCategory::Resolution);
    }

    #[test]
    fn shard_error_with_suggestion() {
        let err = ShardError::new(
            "t.shard",
            ErrorCode::READONLY_PROPERTY,
            "'Length' is read-only",
            Span::new(4, 1, 4, 14),
            "str.Length = 10;",
        )
        .with_suggestion("remove the assignment; Length cannot be written");
        assert_eq!(
            err.suggestion.as_deref(),
            Some("remove the assignment; Length cannot be written")
        );
    }

    #[test]
    fn shard_error_json_serialization() {
        let err = ShardError::new(
            "fib.shard",
            ErrorCode::NO_APPLICABLE_OVERLOAD,
            "no overload of 'Fib' accepts (bool)",
            Span::new(9, 20, 9, 29),
            "            return Fib(true);",
        );

        let json = serde_json::to_string_pretty(&err).unwrap();
        assert!(json.contains("\"code\""));
        assert!(json.contains("\"message\""));
        assert!(json.contains("\"source_line\""));
        assert!(json.contains("\"start_line\""));

        // Round-trip
        let deserialized: ShardError = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.code, err.code);
        assert_eq!(deserialized.message, err.message);
        assert_eq!(deserialized.span, err.span);
    }

    #[test]
    fn compile_errors_max_limit() {
        let mut errs = CompileErrors::empty();
        for i in 0..25 {
            errs.push_error(ShardError::new(
                "t.shard",
                ErrorCode::UNEXPECTED_TOKEN,
                format!("error {i}"),
                Span::point(i as u32 + 1, 1),
                "",
            ));
        }
        // Only 20 stored, but total count is 25
        assert_eq!(errs.errors.len(), 20);
        assert_eq!(errs.total_errors, 25);
        assert!(errs.has_errors());
    }

    #[test]
    fn compile_errors_empty() {
        let errs = CompileErrors::empty();
        assert!(!errs.has_errors());
        assert_eq!(errs.total_errors, 0);
        assert_eq!(errs.total_warnings, 0);
    }

    #[test]
    fn compile_errors_absorb_preserves_totals() {
        let mut lex_errors = CompileErrors::empty();
        for i in 0..3 {
            lex_errors.push_error(ShardError::new(
                "t.shard",
                ErrorCode::UNEXPECTED_CHARACTER,
                format!("bad character {i}"),
                Span::point(1, i as u32 + 1),
                "",
            ));
        }
        let mut all = CompileErrors::empty();
        all.push_error(ShardError::new(
            "t.shard",
            ErrorCode::UNEXPECTED_TOKEN,
            "bad token",
            Span::point(2, 1),
            "",
        ));
        all.absorb(lex_errors);
        assert_eq!(all.total_errors, 4);
        assert_eq!(all.errors.len(), 4);
    }
}
