//! Expression parsing: precedence climbing, postfix chains, `new` forms.
//!
//! `++`/`--` have no AST node; both prefix and postfix forms desugar to an
//! assignment of `target ± 1` (the value of the desugared expression is the
//! updated value in both forms).

use shard_lexer::token::TokenKind;
use shard_types::ast::{BinaryOp, Expr, ExprKind, TypeKind, UnaryOp};
use shard_types::ErrorCode;

use crate::parser::Parser;

impl Parser<'_> {
    /// Parse a full expression.
    pub(crate) fn parse_expr(&mut self) -> Option<Expr> {
        self.parse_assignment()
    }

    /// `assignment := or-expr [ '=' assignment ]` (right-associative)
    fn parse_assignment(&mut self) -> Option<Expr> {
        let target = self.parse_or()?;
        if self.eat(&TokenKind::Assign) {
            let value = self.parse_assignment()?;
            let span = target.span.merge(value.span);
            return Some(self.make_expr(
                ExprKind::Assign {
                    target: Box::new(target),
                    value: Box::new(value),
                },
                span,
            ));
        }
        Some(target)
    }

    fn parse_or(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_and()?;
        while self.eat(&TokenKind::OrOr) {
            let rhs = self.parse_and()?;
            lhs = self.binary(BinaryOp::Or, lhs, rhs);
        }
        Some(lhs)
    }

    fn parse_and(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_equality()?;
        while self.eat(&TokenKind::AndAnd) {
            let rhs = self.parse_equality()?;
            lhs = self.binary(BinaryOp::And, lhs, rhs);
        }
        Some(lhs)
    }

    fn parse_equality(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_relational()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::Ne,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_relational()?;
            lhs = self.binary(op, lhs, rhs);
        }
        Some(lhs)
    }

    fn parse_relational(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Less => BinaryOp::Lt,
                TokenKind::Greater => BinaryOp::Gt,
                TokenKind::LessEq => BinaryOp::Le,
                TokenKind::GreaterEq => BinaryOp::Ge,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_additive()?;
            lhs = self.binary(op, lhs, rhs);
        }
        Some(lhs)
    }

    fn parse_additive(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_multiplicative()?;
            lhs = self.binary(op, lhs, rhs);
        }
        Some(lhs)
    }

    fn parse_multiplicative(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Rem,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = self.binary(op, lhs, rhs);
        }
        Some(lhs)
    }

    fn parse_unary(&mut self) -> Option<Expr> {
        match self.peek_kind() {
            TokenKind::Minus => {
                let start = self.current_span();
                self.advance();
                let operand = self.parse_unary()?;
                let span = start.merge(operand.span);
                Some(self.make_expr(
                    ExprKind::Unary {
                        op: UnaryOp::Neg,
                        operand: Box::new(operand),
                    },
                    span,
                ))
            }
            TokenKind::Bang => {
                let start = self.current_span();
                self.advance();
                let operand = self.parse_unary()?;
                let span = start.merge(operand.span);
                Some(self.make_expr(
                    ExprKind::Unary {
                        op: UnaryOp::Not,
                        operand: Box::new(operand),
                    },
                    span,
                ))
            }
            TokenKind::PlusPlus => {
                let start = self.current_span();
                self.advance();
                let target = self.parse_unary()?;
                Some(self.desugar_inc_dec(target, BinaryOp::Add, start))
            }
            TokenKind::MinusMinus => {
                let start = self.current_span();
                self.advance();
                let target = self.parse_unary()?;
                Some(self.desugar_inc_dec(target, BinaryOp::Sub, start))
            }
            _ => self.parse_postfix(),
        }
    }

    /// Postfix chains: `.name`, `.Name(args)`, `[index]`, trailing `++`/`--`.
    fn parse_postfix(&mut self) -> Option<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.eat(&TokenKind::Dot) {
                let name = self.expect_identifier("a member name")?;
                if self.check(&TokenKind::LParen) {
                    let args = self.parse_args()?;
                    let span = expr.span.merge(self.previous_span());
                    expr = self.make_expr(
                        ExprKind::Call {
                            recv: Some(Box::new(expr)),
                            name,
                            args,
                        },
                        span,
                    );
                } else {
                    let span = expr.span.merge(name.span);
                    expr = self.make_expr(
                        ExprKind::Field {
                            recv: Box::new(expr),
                            name,
                        },
                        span,
                    );
                }
            } else if self.check(&TokenKind::LBracket) {
                self.advance();
                let index = self.parse_expr()?;
                self.expect(&TokenKind::RBracket)?;
                let span = expr.span.merge(self.previous_span());
                expr = self.make_expr(
                    ExprKind::Index {
                        recv: Box::new(expr),
                        index: Box::new(index),
                    },
                    span,
                );
            } else if self.check(&TokenKind::PlusPlus) {
                let start = self.current_span();
                self.advance();
                expr = self.desugar_inc_dec(expr, BinaryOp::Add, start);
            } else if self.check(&TokenKind::MinusMinus) {
                let start = self.current_span();
                self.advance();
                expr = self.desugar_inc_dec(expr, BinaryOp::Sub, start);
            } else {
                break;
            }
        }
        Some(expr)
    }

    fn parse_primary(&mut self) -> Option<Expr> {
        let span = self.current_span();
        match self.peek_kind().clone() {
            TokenKind::IntLit(value) => {
                self.advance();
                Some(self.make_expr(ExprKind::IntLit(value), span))
            }
            TokenKind::CharLit(value) => {
                self.advance();
                Some(self.make_expr(ExprKind::CharLit(value), span))
            }
            TokenKind::StringLit(value) => {
                self.advance();
                Some(self.make_expr(ExprKind::StringLit(value), span))
            }
            TokenKind::True => {
                self.advance();
                Some(self.make_expr(ExprKind::BoolLit(true), span))
            }
            TokenKind::False => {
                self.advance();
                Some(self.make_expr(ExprKind::BoolLit(false), span))
            }
            TokenKind::Null => {
                self.advance();
                Some(self.make_expr(ExprKind::NullLit, span))
            }
            TokenKind::Identifier(name) => {
                self.advance();
                if self.check(&TokenKind::LParen) {
                    let args = self.parse_args()?;
                    let full = span.merge(self.previous_span());
                    let ident = shard_types::ast::Ident::new(name, span);
                    Some(self.make_expr(
                        ExprKind::Call {
                            recv: None,
                            name: ident,
                            args,
                        },
                        full,
                    ))
                } else {
                    Some(self.make_expr(ExprKind::Ident(name), span))
                }
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                let full = span.merge(self.previous_span());
                Some(self.make_expr(ExprKind::Paren(Box::new(inner)), full))
            }
            TokenKind::New => self.parse_new(),
            other => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected an expression, got '{other}'"),
                );
                None
            }
        }
    }

    /// `new Class`, `new Ns.Class`, or `new elem[len]`.
    fn parse_new(&mut self) -> Option<Expr> {
        let start = self.current_span();
        self.expect(&TokenKind::New)?;
        let base = self.parse_base_type()?;

        if self.check(&TokenKind::LBracket) {
            self.advance();
            let len = self.parse_expr()?;
            self.expect(&TokenKind::RBracket)?;
            let span = start.merge(self.previous_span());
            return Some(self.make_expr(
                ExprKind::NewArray {
                    elem: base,
                    len: Box::new(len),
                },
                span,
            ));
        }

        match base.kind {
            TypeKind::Named(class) => {
                let span = start.merge(self.previous_span());
                Some(self.make_expr(ExprKind::New { class }, span))
            }
            _ => {
                self.error_at(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("cannot instantiate '{}' with 'new'", base.display_name()),
                    base.span,
                );
                None
            }
        }
    }

    /// `( [expr (, expr)*] )`
    fn parse_args(&mut self) -> Option<Vec<Expr>> {
        self.expect(&TokenKind::LParen)?;
        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                args.push(self.parse_expr()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen)?;
        Some(args)
    }

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn binary(&mut self, op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        let span = lhs.span.merge(rhs.span);
        self.make_expr(
            ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            span,
        )
    }

    /// Desugar `++target`/`target--` into `target = target ± 1`.
    fn desugar_inc_dec(
        &mut self,
        target: Expr,
        op: BinaryOp,
        op_span: shard_types::Span,
    ) -> Expr {
        let span = target.span.merge(op_span);
        let read_back = self.clone_with_fresh_ids(&target);
        let one = self.make_expr(ExprKind::IntLit(1), op_span);
        let updated = self.binary(op, read_back, one);
        self.make_expr(
            ExprKind::Assign {
                target: Box::new(target),
                value: Box::new(updated),
            },
            span,
        )
    }
}
