//! Token types for the Shard lexer.
//!
//! Defines [`TokenKind`] covering every lexeme in the language and
//! [`Token`], which pairs a kind with a source [`Span`].

use shard_types::Span;
use std::fmt;

/// All reserved identifiers in Shard.
///
/// These cannot be used as user-defined names. The lexer recognises each
/// one and emits a specific keyword token instead of [`TokenKind::Identifier`].
pub const ALL_KEYWORDS: &[&str] = &[
    // Declarations (8)
    "namespace", "class", "public", "private", "protected", "static", "operator", "var",
    // Type names (5)
    "int", "bool", "char", "string", "void",
    // Statements (7)
    "if", "else", "while", "do", "for", "return", "new",
    // Literals (3)
    "true", "false", "null",
];

// ─────────────────────────────────────────────────────────────────────
// Token
// ─────────────────────────────────────────────────────────────────────

/// A single token produced by the Shard lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What kind of token this is.
    pub kind: TokenKind,
    /// Source location.
    pub span: Span,
}

impl Token {
    /// Create a new token.
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

// ─────────────────────────────────────────────────────────────────────
// TokenKind
// ─────────────────────────────────────────────────────────────────────

/// Every token kind in the Shard language.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ── Literals ──────────────────────────────────────────────

    /// Integer literal: `42`
    IntLit(i32),
    /// Character literal: `'g'`
    CharLit(char),
    /// String literal, regular or verbatim: `"hi"`, `@"say ""hi"""`
    StringLit(String),
    /// `true`
    True,
    /// `false`
    False,
    /// `null`
    Null,

    // ── Identifiers ──────────────────────────────────────────

    /// User-defined identifier: `Fraction`, `numerator`
    Identifier(String),

    // ── Keywords ─────────────────────────────────────────────

    Namespace,
    Class,
    Public,
    Private,
    Protected,
    Static,
    Operator,
    Var,
    Int,
    Bool,
    Char,
    String,
    Void,
    If,
    Else,
    While,
    Do,
    For,
    Return,
    New,

    // ── Punctuation ──────────────────────────────────────────

    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// `.`
    Dot,

    // ── Operators ────────────────────────────────────────────

    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `=`
    Assign,
    /// `==`
    EqEq,
    /// `!=`
    NotEq,
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `<=`
    LessEq,
    /// `>=`
    GreaterEq,
    /// `&&`
    AndAnd,
    /// `||`
    OrOr,
    /// `!`
    Bang,
    /// `++`
    PlusPlus,
    /// `--`
    MinusMinus,

    /// End of input. The token stream always ends with exactly one.
    Eof,
}

impl TokenKind {
    /// Map a scanned identifier to its keyword token, if it is one.
    pub fn keyword(ident: &str) -> Option<TokenKind> {
        let kind = match ident {
            "namespace" => TokenKind::Namespace,
            "class" => TokenKind::Class,
            "public" => TokenKind::Public,
            "private" => TokenKind::Private,
            "protected" => TokenKind::Protected,
            "static" => TokenKind::Static,
            "operator" => TokenKind::Operator,
            "var" => TokenKind::Var,
            "int" => TokenKind::Int,
            "bool" => TokenKind::Bool,
            "char" => TokenKind::Char,
            "string" => TokenKind::String,
            "void" => TokenKind::Void,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "do" => TokenKind::Do,
            "for" => TokenKind::For,
            "return" => TokenKind::Return,
            "new" => TokenKind::New,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            _ => return None,
        };
        Some(kind)
    }

    /// Returns `true` if this token is a reserved keyword.
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Namespace
                | TokenKind::Class
                | TokenKind::Public
                | TokenKind::Private
                | TokenKind::Protected
                | TokenKind::Static
                | TokenKind::Operator
                | TokenKind::Var
                | TokenKind::Int
                | TokenKind::Bool
                | TokenKind::Char
                | TokenKind::String
                | TokenKind::Void
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::While
                | TokenKind::Do
                | TokenKind::For
                | TokenKind::Return
                | TokenKind::New
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IntLit(n) => write!(f, "{n}"),
            Self::CharLit(c) => write!(f, "'{c}'"),
            Self::StringLit(s) => write!(f, "\"{s}\""),
            Self::True => write!(f, "true"),
            Self::False => write!(f, "false"),
            Self::Null => write!(f, "null"),
            Self::Identifier(name) => write!(f, "{name}"),
            Self::Namespace => write!(f, "namespace"),
            Self::Class => write!(f, "class"),
            Self::Public => write!(f, "public"),
            Self::Private => write!(f, "private"),
            Self::Protected => write!(f, "protected"),
            Self::Static => write!(f, "static"),
            Self::Operator => write!(f, "operator"),
            Self::Var => write!(f, "var"),
            Self::Int => write!(f, "int"),
            Self::Bool => write!(f, "bool"),
            Self::Char => write!(f, "char"),
            Self::String => write!(f, "string"),
            Self::Void => write!(f, "void"),
            Self::If => write!(f, "if"),
            Self::Else => write!(f, "else"),
            Self::While => write!(f, "while"),
            Self::Do => write!(f, "do"),
            Self::For => write!(f, "for"),
            Self::Return => write!(f, "return"),
            Self::New => write!(f, "new"),
            Self::LBrace => write!(f, "{{"),
            Self::RBrace => write!(f, "}}"),
            Self::LParen => write!(f, "("),
            Self::RParen => write!(f, ")"),
            Self::LBracket => write!(f, "["),
            Self::RBracket => write!(f, "]"),
            Self::Semicolon => write!(f, ";"),
            Self::Comma => write!(f, ","),
            Self::Dot => write!(f, "."),
            Self::Plus => write!(f, "+"),
            Self::Minus => write!(f, "-"),
            Self::Star => write!(f, "*"),
            Self::Slash => write!(f, "/"),
            Self::Percent => write!(f, "%"),
            Self::Assign => write!(f, "="),
            Self::EqEq => write!(f, "=="),
            Self::NotEq => write!(f, "!="),
            Self::Less => write!(f, "<"),
            Self::Greater => write!(f, ">"),
            Self::LessEq => write!(f, "<="),
            Self::GreaterEq => write!(f, ">="),
            Self::AndAnd => write!(f, "&&"),
            Self::OrOr => write!(f, "||"),
            Self::Bang => write!(f, "!"),
            Self::PlusPlus => write!(f, "++"),
            Self::MinusMinus => write!(f, "--"),
            Self::Eof => write!(f, "end of file"),
        }
    }
}
