//! Type annotation parsing.

use shard_lexer::token::TokenKind;
use shard_types::ast::{Ident, TypeAnnotation, TypeKind};
use shard_types::ErrorCode;

use crate::parser::Parser;

impl Parser<'_> {
    /// Returns `true` if the current token can begin a type annotation.
    pub(crate) fn at_type_keyword(&self) -> bool {
        matches!(
            self.peek_kind(),
            TokenKind::Int
                | TokenKind::Bool
                | TokenKind::Char
                | TokenKind::String
                | TokenKind::Void
                | TokenKind::Var
        )
    }

    /// Parse a full type annotation: a base type followed by any number of
    /// `[]` suffixes. `int[]`, `System.Console`, `var`.
    pub(crate) fn parse_type(&mut self) -> Option<TypeAnnotation> {
        let mut ty = self.parse_base_type()?;
        while self.check(&TokenKind::LBracket) && self.look_ahead(1) == &TokenKind::RBracket {
            self.advance();
            let close = self.advance();
            let span = ty.span.merge(close.span);
            ty = TypeAnnotation {
                kind: TypeKind::Array(Box::new(ty)),
                span,
            };
        }
        Some(ty)
    }

    /// Parse a base type without array suffixes: a primitive keyword, `var`,
    /// or a possibly-qualified class name.
    pub(crate) fn parse_base_type(&mut self) -> Option<TypeAnnotation> {
        let span = self.current_span();
        let kind = match self.peek_kind() {
            TokenKind::Int => {
                self.advance();
                TypeKind::Int
            }
            TokenKind::Bool => {
                self.advance();
                TypeKind::Bool
            }
            TokenKind::Char => {
                self.advance();
                TypeKind::Char
            }
            TokenKind::String => {
                self.advance();
                TypeKind::String
            }
            TokenKind::Void => {
                self.advance();
                TypeKind::Void
            }
            TokenKind::Var => {
                self.advance();
                TypeKind::Var
            }
            TokenKind::Identifier(_) => {
                let parts = self.parse_qualified_name()?;
                let span = parts
                    .first()
                    .map(|f| f.span.merge(parts.last().map(|l| l.span).unwrap_or(f.span)))
                    .unwrap_or(span);
                return Some(TypeAnnotation {
                    kind: TypeKind::Named(parts),
                    span,
                });
            }
            other => {
                let msg = format!("expected a type, got '{other}'");
                self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, msg);
                return None;
            }
        };
        Some(TypeAnnotation { kind, span })
    }

    /// Parse a dotted identifier chain: `Fraction`, `System.Console`.
    pub(crate) fn parse_qualified_name(&mut self) -> Option<Vec<Ident>> {
        let mut parts = vec![self.expect_identifier("a name")?];
        while self.check(&TokenKind::Dot) && matches!(self.look_ahead(1), TokenKind::Identifier(_))
        {
            self.advance();
            parts.push(self.expect_identifier("a name")?);
        }
        Some(parts)
    }
}
