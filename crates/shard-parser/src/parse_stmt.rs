//! Statement parsing.

use shard_lexer::token::TokenKind;
use shard_types::ast::{
    BlockStmt, DoWhileStmt, Expr, ExprStmt, ForInit, ForStmt, IfStmt, ReturnStmt, Stmt,
    VarDeclStmt, WhileStmt,
};

use crate::parser::Parser;

impl Parser<'_> {
    /// Parse one statement.
    pub(crate) fn parse_stmt(&mut self) -> Option<Stmt> {
        match self.peek_kind() {
            TokenKind::Semicolon => {
                let span = self.current_span();
                self.advance();
                Some(Stmt::Empty(span))
            }
            TokenKind::LBrace => self.parse_block_stmt(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Do => self.parse_do_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Return => self.parse_return(),
            _ if self.at_var_decl() => self.parse_var_decl().map(Stmt::VarDecl),
            _ => self.parse_expr_stmt(),
        }
    }

    /// Decide whether the upcoming tokens begin a local variable
    /// declaration rather than an expression statement.
    ///
    /// A type keyword always does. For identifiers we look ahead for the
    /// shape `Name ('.' Name)* ('[' ']')* Name`, which cannot start an
    /// expression (`First.Class c`, `Foo f = ...`), as opposed to
    /// `foo.Bar();` where a `(`, `=` or operator follows instead.
    fn at_var_decl(&self) -> bool {
        if self.at_type_keyword() {
            return true;
        }
        if !matches!(self.peek_kind(), TokenKind::Identifier(_)) {
            return false;
        }
        let mut i = 1;
        while self.look_ahead(i) == &TokenKind::Dot
            && matches!(self.look_ahead(i + 1), TokenKind::Identifier(_))
        {
            i += 2;
        }
        while self.look_ahead(i) == &TokenKind::LBracket
            && self.look_ahead(i + 1) == &TokenKind::RBracket
        {
            i += 2;
        }
        matches!(self.look_ahead(i), TokenKind::Identifier(_))
    }

    /// `type name [= expr] ;`
    pub(crate) fn parse_var_decl(&mut self) -> Option<VarDeclStmt> {
        let start = self.current_span();
        let ty = self.parse_type()?;
        let name = self.expect_identifier("a variable name")?;
        let init = if self.eat(&TokenKind::Assign) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect(&TokenKind::Semicolon)?;
        Some(VarDeclStmt {
            ty,
            name,
            init,
            span: start.merge(self.previous_span()),
        })
    }

    fn parse_expr_stmt(&mut self) -> Option<Stmt> {
        let expr = self.parse_expr()?;
        self.expect(&TokenKind::Semicolon)?;
        let span = expr.span.merge(self.previous_span());
        Some(Stmt::Expr(ExprStmt { expr, span }))
    }

    fn parse_block_stmt(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.expect(&TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() && !self.error_limit_reached() {
            match self.parse_stmt() {
                Some(stmt) => stmts.push(stmt),
                None => self.synchronize_stmt(),
            }
        }
        self.expect(&TokenKind::RBrace)?;
        Some(Stmt::Block(BlockStmt {
            stmts,
            span: start.merge(self.previous_span()),
        }))
    }

    /// `if (cond) stmt [else stmt]`
    fn parse_if(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.expect(&TokenKind::If)?;
        self.expect(&TokenKind::LParen)?;
        let condition = self.parse_expr()?;
        self.expect(&TokenKind::RParen)?;
        let then_branch = self.parse_stmt()?;
        let else_branch = if self.eat(&TokenKind::Else) {
            Some(self.parse_stmt()?)
        } else {
            None
        };
        let span = start.merge(self.previous_span());
        Some(Stmt::If(Box::new(IfStmt {
            condition,
            then_branch,
            else_branch,
            span,
        })))
    }

    /// `while (cond) stmt`
    fn parse_while(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.expect(&TokenKind::While)?;
        self.expect(&TokenKind::LParen)?;
        let condition = self.parse_expr()?;
        self.expect(&TokenKind::RParen)?;
        let body = self.parse_stmt()?;
        let span = start.merge(self.previous_span());
        Some(Stmt::While(Box::new(WhileStmt {
            condition,
            body,
            span,
        })))
    }

    /// `do stmt while (cond) ;`
    fn parse_do_while(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.expect(&TokenKind::Do)?;
        let body = self.parse_stmt()?;
        self.expect(&TokenKind::While)?;
        self.expect(&TokenKind::LParen)?;
        let condition = self.parse_expr()?;
        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::Semicolon)?;
        let span = start.merge(self.previous_span());
        Some(Stmt::DoWhile(Box::new(DoWhileStmt {
            body,
            condition,
            span,
        })))
    }

    /// `for (init; cond; step) stmt` — each header slot may be empty.
    fn parse_for(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.expect(&TokenKind::For)?;
        self.expect(&TokenKind::LParen)?;

        let init = if self.eat(&TokenKind::Semicolon) {
            None
        } else if self.at_var_decl() {
            // parse_var_decl consumes the ';'
            Some(ForInit::VarDecl(self.parse_var_decl()?))
        } else {
            let expr = self.parse_expr()?;
            self.expect(&TokenKind::Semicolon)?;
            Some(ForInit::Expr(expr))
        };

        let condition: Option<Expr> = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(&TokenKind::Semicolon)?;

        let step = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(&TokenKind::RParen)?;

        let body = self.parse_stmt()?;
        let span = start.merge(self.previous_span());
        Some(Stmt::For(Box::new(ForStmt {
            init,
            condition,
            step,
            body,
            span,
        })))
    }

    /// `return [expr] ;`
    fn parse_return(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.expect(&TokenKind::Return)?;
        let value = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(&TokenKind::Semicolon)?;
        Some(Stmt::Return(ReturnStmt {
            value,
            span: start.merge(self.previous_span()),
        }))
    }
}
