//! Core parser infrastructure: token cursor, error reporting, helpers.

use shard_lexer::token::{Token, TokenKind};
use shard_types::ast::{Expr, ExprKind, NodeId, Program};
use shard_types::{CompileErrors, ErrorCode, ShardError, SourceFile, Span};

/// The Shard parser.
///
/// Consumes a token stream produced by the lexer and builds an AST.
/// Collects errors and attempts recovery when possible. Every expression
/// node receives a fresh [`NodeId`] so later stages can attach binding
/// information in a side table.
pub struct Parser<'src> {
    /// The token stream.
    tokens: Vec<Token>,
    /// Current index into `tokens`.
    pos: usize,
    /// Source file for error context.
    source_file: &'src SourceFile,
    /// File name for error messages.
    file_name: String,
    /// Collected errors.
    errors: CompileErrors,
    /// Next expression node id to hand out.
    next_node_id: u32,
}

/// Result of parsing.
pub struct ParseResult {
    pub program: Option<Program>,
    pub errors: CompileErrors,
}

impl<'src> Parser<'src> {
    /// Create a new parser from a token stream and source file.
    pub fn new(tokens: Vec<Token>, source_file: &'src SourceFile) -> Self {
        Self {
            tokens,
            pos: 0,
            file_name: source_file.name.clone(),
            source_file,
            errors: CompileErrors::empty(),
            next_node_id: 0,
        }
    }

    /// Parse the whole token stream into a [`Program`].
    pub fn parse(mut self) -> ParseResult {
        let program = self.parse_program();
        ParseResult {
            program,
            errors: self.errors,
        }
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    /// Returns the current token without advancing.
    pub(crate) fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or_else(|| {
            self.tokens
                .last()
                .expect("token stream should end with Eof")
        })
    }

    /// Returns the kind of the current token.
    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    /// Advance the cursor by one and return the consumed token.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    /// Returns the previously consumed token's span.
    pub(crate) fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::point(1, 1)
        }
    }

    /// Returns the span of the current token.
    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    /// Returns `true` if the current token is `Eof`.
    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    /// Check if the current token matches the given kind exactly.
    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// If the current token matches, advance and return `true`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Look ahead by `n` tokens from current position.
    pub(crate) fn look_ahead(&self, n: usize) -> &TokenKind {
        let idx = self.pos + n;
        self.tokens
            .get(idx)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    // ── Expect Helpers ────────────────────────────────────────────────────────

    /// Expect a specific token kind. Returns the token if matched, or emits
    /// an error and returns `None`.
    pub(crate) fn expect(&mut self, expected: &TokenKind) -> Option<Token> {
        if self.check(expected) {
            Some(self.advance())
        } else {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected '{}', got '{}'", expected, self.peek_kind()),
            );
            None
        }
    }

    /// Expect an identifier and return it with its span.
    pub(crate) fn expect_identifier(
        &mut self,
        what: &str,
    ) -> Option<shard_types::ast::Ident> {
        if let TokenKind::Identifier(name) = self.peek_kind() {
            let name = name.clone();
            let span = self.current_span();
            self.advance();
            Some(shard_types::ast::Ident::new(name, span))
        } else {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected {what}, got '{}'", self.peek_kind()),
            );
            None
        }
    }

    // ── Error Reporting & Recovery ────────────────────────────────────────────

    /// Report an error at the current token.
    pub(crate) fn error_at_current(&mut self, code: ErrorCode, message: impl Into<String>) {
        let span = self.current_span();
        self.error_at(code, message, span);
    }

    /// Report an error at an explicit span.
    pub(crate) fn error_at(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self
            .source_file
            .line(span.start_line)
            .unwrap_or("")
            .to_string();
        self.errors.push_error(ShardError::new(
            self.file_name.clone(),
            code,
            message,
            span,
            source_line,
        ));
    }

    /// Returns `true` once the error cap is reached; parsing stops early.
    pub(crate) fn error_limit_reached(&self) -> bool {
        self.errors.total_errors >= shard_types::MAX_ERRORS
    }

    /// Skip tokens until just past a `;` or just before a `}`, to resume
    /// statement parsing after an error.
    pub(crate) fn synchronize_stmt(&mut self) {
        while !self.at_end() {
            match self.peek_kind() {
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::RBrace => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Skip tokens until just before a `}` or `Eof`, to resume member
    /// parsing after an error.
    pub(crate) fn synchronize_member(&mut self) {
        let mut depth = 0usize;
        while !self.at_end() {
            match self.peek_kind() {
                TokenKind::LBrace => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::RBrace => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                    self.advance();
                }
                TokenKind::Semicolon if depth == 0 => {
                    self.advance();
                    return;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    // ── Node Construction ─────────────────────────────────────────────────────

    /// Hand out the next expression node id.
    pub(crate) fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    /// Build an expression node with a fresh id.
    pub(crate) fn make_expr(&mut self, kind: ExprKind, span: Span) -> Expr {
        Expr {
            id: self.next_id(),
            kind,
            span,
        }
    }

    /// Deep-clone an expression, reassigning fresh node ids throughout.
    ///
    /// Used by the `++`/`--` desugaring, which duplicates its target
    /// expression; node ids must stay unique within the program.
    pub(crate) fn clone_with_fresh_ids(&mut self, expr: &Expr) -> Expr {
        let kind = match &expr.kind {
            ExprKind::IntLit(v) => ExprKind::IntLit(*v),
            ExprKind::BoolLit(v) => ExprKind::BoolLit(*v),
            ExprKind::CharLit(v) => ExprKind::CharLit(*v),
            ExprKind::StringLit(v) => ExprKind::StringLit(v.clone()),
            ExprKind::NullLit => ExprKind::NullLit,
            ExprKind::Ident(name) => ExprKind::Ident(name.clone()),
            ExprKind::Field { recv, name } => ExprKind::Field {
                recv: Box::new(self.clone_with_fresh_ids(recv)),
                name: name.clone(),
            },
            ExprKind::Index { recv, index } => ExprKind::Index {
                recv: Box::new(self.clone_with_fresh_ids(recv)),
                index: Box::new(self.clone_with_fresh_ids(index)),
            },
            ExprKind::Call { recv, name, args } => ExprKind::Call {
                recv: recv
                    .as_ref()
                    .map(|r| Box::new(self.clone_with_fresh_ids(r))),
                name: name.clone(),
                args: args.iter().map(|a| self.clone_with_fresh_ids(a)).collect(),
            },
            ExprKind::New { class } => ExprKind::New {
                class: class.clone(),
            },
            ExprKind::NewArray { elem, len } => ExprKind::NewArray {
                elem: elem.clone(),
                len: Box::new(self.clone_with_fresh_ids(len)),
            },
            ExprKind::Unary { op, operand } => ExprKind::Unary {
                op: *op,
                operand: Box::new(self.clone_with_fresh_ids(operand)),
            },
            ExprKind::Binary { op, lhs, rhs } => ExprKind::Binary {
                op: *op,
                lhs: Box::new(self.clone_with_fresh_ids(lhs)),
                rhs: Box::new(self.clone_with_fresh_ids(rhs)),
            },
            ExprKind::Assign { target, value } => ExprKind::Assign {
                target: Box::new(self.clone_with_fresh_ids(target)),
                value: Box::new(self.clone_with_fresh_ids(value)),
            },
            ExprKind::Paren(inner) => ExprKind::Paren(Box::new(self.clone_with_fresh_ids(inner))),
        };
        Expr {
            id: self.next_id(),
            kind,
            span: expr.span,
        }
    }
}
