//! Core Shard lexer — converts source text to a token stream.
//!
//! Features:
//! - all Shard tokens (keywords, operators, punctuation, literals)
//! - regular string literals with C-style escapes
//! - verbatim string literals (`@"..."`, `""` doubles a quote)
//! - line (`//`) and block (`/* */`) comments stripped
//! - error recovery: collects up to 20 errors instead of stopping at the first

use shard_types::{CompileErrors, ErrorCode, ShardError, SourceFile, Span};

use crate::token::{Token, TokenKind};

/// The Shard lexer.
///
/// Converts source text into a vector of [`Token`]s, collecting up to
/// [`shard_types::MAX_ERRORS`] errors along the way.
pub struct Lexer<'src> {
    /// The full source text as bytes.
    source: &'src [u8],
    /// Source file for error reporting.
    source_file: &'src SourceFile,
    /// File name (for errors).
    file_name: &'src str,
    /// Current byte offset into `source`.
    pos: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    col: u32,
    /// Collected errors.
    errors: CompileErrors,
}

/// Result of lexing: tokens + any errors collected.
pub struct LexResult {
    /// The token stream (always ends with [`TokenKind::Eof`]).
    pub tokens: Vec<Token>,
    /// Errors encountered during lexing.
    pub errors: CompileErrors,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source file.
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self {
            source: source_file.source.as_bytes(),
            source_file,
            file_name: &source_file.name,
            pos: 0,
            line: 1,
            col: 1,
            errors: CompileErrors::empty(),
        }
    }

    /// Lex the entire source file into a token stream.
    pub fn lex(mut self) -> LexResult {
        let mut tokens = Vec::new();

        loop {
            if self.errors.total_errors >= shard_types::MAX_ERRORS {
                break;
            }
            let token = self.scan_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        // Ensure token stream always ends with Eof
        if tokens.last().map(|t| &t.kind) != Some(&TokenKind::Eof) {
            tokens.push(Token::new(TokenKind::Eof, Span::point(self.line, self.col)));
        }

        LexResult {
            tokens,
            errors: self.errors,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.source.get(self.pos).copied()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn eat(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Error reporting
    // ─────────────────────────────────────────────────────────────

    fn error(&mut self, code: ErrorCode, message: impl Into<std::string::String>, span: Span) {
        let source_line = self
            .source_file
            .line(span.start_line)
            .unwrap_or("")
            .to_string();
        self.errors
            .push_error(ShardError::new(self.file_name, code, message, span, source_line));
    }

    fn span_from(&self, start_line: u32, start_col: u32) -> Span {
        let end_col = if self.line == start_line {
            self.col.saturating_sub(1).max(start_col)
        } else {
            self.col.saturating_sub(1).max(1)
        };
        Span::new(start_line, start_col, self.line, end_col)
    }

    // ─────────────────────────────────────────────────────────────
    // Scanning
    // ─────────────────────────────────────────────────────────────

    fn scan_token(&mut self) -> Token {
        self.skip_trivia();

        let start_line = self.line;
        let start_col = self.col;

        let Some(ch) = self.advance() else {
            return Token::new(TokenKind::Eof, Span::point(self.line, self.col));
        };

        let kind = match ch {
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,
            b';' => TokenKind::Semicolon,
            b',' => TokenKind::Comma,
            b'.' => TokenKind::Dot,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'%' => TokenKind::Percent,

            b'+' => {
                if self.eat(b'+') {
                    TokenKind::PlusPlus
                } else {
                    TokenKind::Plus
                }
            }
            b'-' => {
                if self.eat(b'-') {
                    TokenKind::MinusMinus
                } else {
                    TokenKind::Minus
                }
            }
            b'=' => {
                if self.eat(b'=') {
                    TokenKind::EqEq
                } else {
                    TokenKind::Assign
                }
            }
            b'!' => {
                if self.eat(b'=') {
                    TokenKind::NotEq
                } else {
                    TokenKind::Bang
                }
            }
            b'<' => {
                if self.eat(b'=') {
                    TokenKind::LessEq
                } else {
                    TokenKind::Less
                }
            }
            b'>' => {
                if self.eat(b'=') {
                    TokenKind::GreaterEq
                } else {
                    TokenKind::Greater
                }
            }
            b'&' => {
                if self.eat(b'&') {
                    TokenKind::AndAnd
                } else {
                    let span = self.span_from(start_line, start_col);
                    self.error(
                        ErrorCode::UNEXPECTED_CHARACTER,
                        "unexpected character '&' (did you mean '&&'?)",
                        span,
                    );
                    return self.scan_token();
                }
            }
            b'|' => {
                if self.eat(b'|') {
                    TokenKind::OrOr
                } else {
                    let span = self.span_from(start_line, start_col);
                    self.error(
                        ErrorCode::UNEXPECTED_CHARACTER,
                        "unexpected character '|' (did you mean '||'?)",
                        span,
                    );
                    return self.scan_token();
                }
            }

            b'"' => return self.scan_string(start_line, start_col),
            b'@' => {
                if self.eat(b'"') {
                    return self.scan_verbatim_string(start_line, start_col);
                }
                let span = self.span_from(start_line, start_col);
                self.error(
                    ErrorCode::UNEXPECTED_CHARACTER,
                    "'@' must be followed by a string literal",
                    span,
                );
                return self.scan_token();
            }
            b'\'' => return self.scan_char(start_line, start_col),

            b'0'..=b'9' => return self.scan_number(start_line, start_col),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => return self.scan_identifier(start_line, start_col),

            other => {
                let span = self.span_from(start_line, start_col);
                self.error(
                    ErrorCode::UNEXPECTED_CHARACTER,
                    format!("unexpected character '{}'", other as char),
                    span,
                );
                return self.scan_token();
            }
        };

        Token::new(kind, self.span_from(start_line, start_col))
    }

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n') => {
                    self.advance();
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while let Some(ch) = self.peek() {
                        if ch == b'\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    let start_line = self.line;
                    let start_col = self.col;
                    self.advance();
                    self.advance();
                    let mut closed = false;
                    while let Some(ch) = self.advance() {
                        if ch == b'*' && self.eat(b'/') {
                            closed = true;
                            break;
                        }
                    }
                    if !closed {
                        let span = Span::point(start_line, start_col);
                        self.error(
                            ErrorCode::UNTERMINATED_COMMENT,
                            "unterminated block comment",
                            span,
                        );
                    }
                }
                _ => break,
            }
        }
    }

    fn scan_identifier(&mut self, start_line: u32, start_col: u32) -> Token {
        let start = self.pos - 1;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == b'_' {
                self.advance();
            } else {
                break;
            }
        }
        let text = std::str::from_utf8(&self.source[start..self.pos])
            .unwrap_or_default()
            .to_string();
        let kind = TokenKind::keyword(&text).unwrap_or(TokenKind::Identifier(text));
        Token::new(kind, self.span_from(start_line, start_col))
    }

    fn scan_number(&mut self, start_line: u32, start_col: u32) -> Token {
        let start = self.pos - 1;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }
        let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap_or_default();
        let span = self.span_from(start_line, start_col);
        let value = match text.parse::<i32>() {
            Ok(v) => v,
            Err(_) => {
                self.error(
                    ErrorCode::INT_LITERAL_OVERFLOW,
                    format!("integer literal '{text}' does not fit in 32 bits"),
                    span,
                );
                0
            }
        };
        Token::new(TokenKind::IntLit(value), span)
    }

    /// Decode one escape sequence after a `\` has been consumed.
    fn scan_escape(&mut self, start_line: u32, start_col: u32) -> char {
        match self.advance() {
            Some(b'n') => '\n',
            Some(b't') => '\t',
            Some(b'r') => '\r',
            Some(b'0') => '\0',
            Some(b'\\') => '\\',
            Some(b'\'') => '\'',
            Some(b'"') => '"',
            other => {
                let span = self.span_from(start_line, start_col);
                let shown = other.map(|c| c as char).unwrap_or(' ');
                self.error(
                    ErrorCode::INVALID_ESCAPE,
                    format!("unknown escape sequence '\\{shown}'"),
                    span,
                );
                shown
            }
        }
    }

    fn scan_char(&mut self, start_line: u32, start_col: u32) -> Token {
        let value = match self.advance() {
            Some(b'\\') => self.scan_escape(start_line, start_col),
            Some(b'\'') | None => {
                let span = self.span_from(start_line, start_col);
                self.error(
                    ErrorCode::INVALID_CHAR_LITERAL,
                    "empty character literal",
                    span,
                );
                return Token::new(TokenKind::CharLit('\0'), span);
            }
            Some(ch) => ch as char,
        };
        if !self.eat(b'\'') {
            let span = self.span_from(start_line, start_col);
            self.error(
                ErrorCode::INVALID_CHAR_LITERAL,
                "character literal must contain exactly one character",
                span,
            );
            // Recover: skip to the closing quote on this line, if any.
            while let Some(ch) = self.peek() {
                if ch == b'\'' || ch == b'\n' {
                    self.eat(b'\'');
                    break;
                }
                self.advance();
            }
        }
        Token::new(TokenKind::CharLit(value), self.span_from(start_line, start_col))
    }

    /// Scan a regular string literal; the opening `"` is already consumed.
    fn scan_string(&mut self, start_line: u32, start_col: u32) -> Token {
        let mut content = String::new();
        loop {
            match self.peek() {
                None | Some(b'\n') => {
                    let span = self.span_from(start_line, start_col);
                    self.error(
                        ErrorCode::UNTERMINATED_STRING,
                        "unterminated string literal",
                        span,
                    );
                    break;
                }
                Some(b'"') => {
                    self.advance();
                    break;
                }
                Some(b'\\') => {
                    self.advance();
                    content.push(self.scan_escape(start_line, start_col));
                }
                Some(ch) => {
                    self.advance();
                    content.push(ch as char);
                }
            }
        }
        Token::new(
            TokenKind::StringLit(content),
            self.span_from(start_line, start_col),
        )
    }

    /// Scan a verbatim string literal; `@"` is already consumed.
    ///
    /// Inside a verbatim string `""` stands for one quote and backslashes
    /// are plain characters; newlines are allowed.
    fn scan_verbatim_string(&mut self, start_line: u32, start_col: u32) -> Token {
        let mut content = String::new();
        loop {
            match self.peek() {
                None => {
                    let span = self.span_from(start_line, start_col);
                    self.error(
                        ErrorCode::UNTERMINATED_STRING,
                        "unterminated verbatim string literal",
                        span,
                    );
                    break;
                }
                Some(b'"') => {
                    self.advance();
                    if self.eat(b'"') {
                        content.push('"');
                    } else {
                        break;
                    }
                }
                Some(ch) => {
                    self.advance();
                    content.push(ch as char);
                }
            }
        }
        Token::new(
            TokenKind::StringLit(content),
            self.span_from(start_line, start_col),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> LexResult {
        let sf = SourceFile::new("test.shard", source);
        Lexer::new(&sf).lex()
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        let result = lex(source);
        assert!(
            !result.errors.has_errors(),
            "unexpected lex errors: {:?}",
            result.errors.errors
        );
        result.tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn empty_input_is_just_eof() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            kinds("namespace Fib public class Main"),
            vec![
                TokenKind::Namespace,
                TokenKind::Identifier("Fib".into()),
                TokenKind::Public,
                TokenKind::Class,
                TokenKind::Identifier("Main".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn operators_two_char_before_one_char() {
        assert_eq!(
            kinds("== = <= < ++ + != !"),
            vec![
                TokenKind::EqEq,
                TokenKind::Assign,
                TokenKind::LessEq,
                TokenKind::Less,
                TokenKind::PlusPlus,
                TokenKind::Plus,
                TokenKind::NotEq,
                TokenKind::Bang,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn int_literal() {
        assert_eq!(
            kinds("42 0"),
            vec![TokenKind::IntLit(42), TokenKind::IntLit(0), TokenKind::Eof]
        );
    }

    #[test]
    fn int_literal_overflow_is_error() {
        let result = lex("2147483648");
        assert!(result.errors.has_errors());
        assert_eq!(
            result.errors.errors[0].code,
            ErrorCode::INT_LITERAL_OVERFLOW
        );
    }

    #[test]
    fn int_max_fits() {
        assert_eq!(
            kinds("2147483647"),
            vec![TokenKind::IntLit(i32::MAX), TokenKind::Eof]
        );
    }

    #[test]
    fn char_literal_with_escape() {
        assert_eq!(
            kinds(r"'g' '\n' '\''"),
            vec![
                TokenKind::CharLit('g'),
                TokenKind::CharLit('\n'),
                TokenKind::CharLit('\''),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn string_literal() {
        assert_eq!(
            kinds(r#""Test string""#),
            vec![TokenKind::StringLit("Test string".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn string_with_escapes() {
        assert_eq!(
            kinds(r#""a\tb\n""#),
            vec![TokenKind::StringLit("a\tb\n".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn verbatim_string_doubles_quotes() {
        // @"The string is """ + s  ⇒  literal: The string is "
        assert_eq!(
            kinds(r#"@"say ""hi"" now""#),
            vec![
                TokenKind::StringLit("say \"hi\" now".into()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn verbatim_string_keeps_backslashes() {
        assert_eq!(
            kinds(r#"@"a\b""#),
            vec![TokenKind::StringLit("a\\b".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn unterminated_string_is_error() {
        let result = lex("\"abc\n");
        assert!(result.errors.has_errors());
        assert_eq!(result.errors.errors[0].code, ErrorCode::UNTERMINATED_STRING);
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("// line comment\nint /* block\ncomment */ x"),
            vec![
                TokenKind::Int,
                TokenKind::Identifier("x".into()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn unterminated_block_comment_is_error() {
        let result = lex("/* never closed");
        assert!(result.errors.has_errors());
        assert_eq!(
            result.errors.errors[0].code,
            ErrorCode::UNTERMINATED_COMMENT
        );
    }

    #[test]
    fn spans_are_one_based() {
        let result = lex("int x");
        let int_tok = &result.tokens[0];
        assert_eq!(int_tok.span, Span::new(1, 1, 1, 3));
        let x_tok = &result.tokens[1];
        assert_eq!(x_tok.span, Span::new(1, 5, 1, 5));
    }

    #[test]
    fn method_chain_snippet() {
        assert_eq!(
            kinds("(new Fraction).SetNumerator(1)"),
            vec![
                TokenKind::LParen,
                TokenKind::New,
                TokenKind::Identifier("Fraction".into()),
                TokenKind::RParen,
                TokenKind::Dot,
                TokenKind::Identifier("SetNumerator".into()),
                TokenKind::LParen,
                TokenKind::IntLit(1),
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexing_is_deterministic() {
        let src = "for (int i = 0; i < n; ++i) { a[i] = a[i] + 1; }";
        let first = kinds(src);
        for _ in 0..50 {
            assert_eq!(first, kinds(src));
        }
    }
}
