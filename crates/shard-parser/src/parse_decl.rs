//! Declaration parsing: namespaces, classes, fields, methods, operators.

use shard_lexer::token::TokenKind;
use shard_types::ast::{
    ClassDecl, FieldDecl, MethodDecl, NamespaceDecl, OperatorDecl, OperatorSym, Param, Program,
    Stmt, Visibility,
};
use shard_types::ErrorCode;

use crate::parser::Parser;

impl Parser<'_> {
    /// `program := namespace-decl*`
    pub(crate) fn parse_program(&mut self) -> Option<Program> {
        let start = self.current_span();
        let mut namespaces = Vec::new();

        while !self.at_end() && !self.error_limit_reached() {
            if self.check(&TokenKind::Namespace) {
                if let Some(ns) = self.parse_namespace() {
                    namespaces.push(ns);
                }
            } else {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected 'namespace', got '{}'", self.peek_kind()),
                );
                self.advance();
            }
        }

        let span = namespaces
            .iter()
            .fold(start, |acc, ns| acc.merge(ns.span));
        Some(Program { namespaces, span })
    }

    /// `namespace Name { class-decl* }`
    fn parse_namespace(&mut self) -> Option<NamespaceDecl> {
        let start = self.current_span();
        self.expect(&TokenKind::Namespace)?;
        let name = self.expect_identifier("a namespace name")?;
        self.expect(&TokenKind::LBrace)?;

        let mut classes = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() && !self.error_limit_reached() {
            if let Some(class) = self.parse_class() {
                classes.push(class);
            } else {
                self.synchronize_member();
            }
        }
        self.expect(&TokenKind::RBrace)?;

        Some(NamespaceDecl {
            name,
            classes,
            span: start.merge(self.previous_span()),
        })
    }

    /// `[visibility] class Name { member* }`
    fn parse_class(&mut self) -> Option<ClassDecl> {
        let start = self.current_span();
        let visibility = self.parse_visibility().unwrap_or(Visibility::Public);
        self.expect(&TokenKind::Class)?;
        let name = self.expect_identifier("a class name")?;
        self.expect(&TokenKind::LBrace)?;

        let mut fields = Vec::new();
        let mut methods = Vec::new();
        let mut operators = Vec::new();

        while !self.check(&TokenKind::RBrace) && !self.at_end() && !self.error_limit_reached() {
            match self.parse_member() {
                Some(Member::Field(f)) => fields.push(f),
                Some(Member::Method(m)) => methods.push(m),
                Some(Member::Operator(o)) => operators.push(o),
                None => self.synchronize_member(),
            }
        }
        self.expect(&TokenKind::RBrace)?;

        Some(ClassDecl {
            visibility,
            name,
            fields,
            methods,
            operators,
            span: start.merge(self.previous_span()),
        })
    }

    /// Parse an optional visibility modifier. Absent means the language
    /// default (`private`, as in the language this resembles).
    fn parse_visibility(&mut self) -> Option<Visibility> {
        let vis = match self.peek_kind() {
            TokenKind::Public => Visibility::Public,
            TokenKind::Protected => Visibility::Protected,
            TokenKind::Private => Visibility::Private,
            _ => return None,
        };
        self.advance();
        Some(vis)
    }

    /// `member := [visibility] [static] type (operator-sym | name) ...`
    fn parse_member(&mut self) -> Option<Member> {
        let start = self.current_span();
        let visibility = self.parse_visibility().unwrap_or(Visibility::Private);
        let is_static = self.eat(&TokenKind::Static);
        let ty = self.parse_type()?;

        if self.eat(&TokenKind::Operator) {
            let symbol = self.parse_operator_symbol()?;
            let params = self.parse_params()?;
            let body = self.parse_body()?;
            let span = start.merge(self.previous_span());
            if !is_static {
                self.error_at(
                    ErrorCode::UNEXPECTED_TOKEN,
                    "operator overloads must be declared static",
                    span,
                );
            }
            return Some(Member::Operator(OperatorDecl {
                visibility,
                symbol,
                return_type: ty,
                params,
                body,
                span,
            }));
        }

        let name = self.expect_identifier("a member name")?;

        if self.check(&TokenKind::LParen) {
            let params = self.parse_params()?;
            let body = self.parse_body()?;
            let span = start.merge(self.previous_span());
            return Some(Member::Method(MethodDecl {
                visibility,
                is_static,
                return_type: ty,
                name,
                params,
                body,
                span,
            }));
        }

        // Field: optional initializer, then ';'
        let init = if self.eat(&TokenKind::Assign) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect(&TokenKind::Semicolon)?;
        let span = start.merge(self.previous_span());
        if is_static {
            self.error_at(
                ErrorCode::UNEXPECTED_TOKEN,
                "static fields are not supported",
                span,
            );
        }
        Some(Member::Field(FieldDecl {
            visibility,
            ty,
            name,
            init,
            span,
        }))
    }

    /// The operator token after the `operator` keyword.
    fn parse_operator_symbol(&mut self) -> Option<OperatorSym> {
        let sym = match self.peek_kind() {
            TokenKind::Plus => OperatorSym::Add,
            TokenKind::Minus => OperatorSym::Sub,
            TokenKind::Star => OperatorSym::Mul,
            TokenKind::Slash => OperatorSym::Div,
            TokenKind::Percent => OperatorSym::Rem,
            TokenKind::Less => OperatorSym::Lt,
            TokenKind::Greater => OperatorSym::Gt,
            TokenKind::LessEq => OperatorSym::Le,
            TokenKind::GreaterEq => OperatorSym::Ge,
            TokenKind::EqEq => OperatorSym::Eq,
            TokenKind::NotEq => OperatorSym::Ne,
            other => {
                let msg = format!("expected an overloadable operator symbol, got '{other}'");
                self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, msg);
                return None;
            }
        };
        self.advance();
        Some(sym)
    }

    /// `( [type name (, type name)*] )`
    fn parse_params(&mut self) -> Option<Vec<Param>> {
        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let start = self.current_span();
                let ty = self.parse_type()?;
                let name = self.expect_identifier("a parameter name")?;
                let span = start.merge(name.span);
                params.push(Param { ty, name, span });
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen)?;
        Some(params)
    }

    /// `{ stmt* }` as a method/operator body.
    fn parse_body(&mut self) -> Option<Vec<Stmt>> {
        self.expect(&TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() && !self.error_limit_reached() {
            match self.parse_stmt() {
                Some(stmt) => stmts.push(stmt),
                None => self.synchronize_stmt(),
            }
        }
        self.expect(&TokenKind::RBrace)?;
        Some(stmts)
    }

}

/// A parsed class member, before being filed into its bucket.
enum Member {
    Field(FieldDecl),
    Method(MethodDecl),
    Operator(OperatorDecl),
}
