//! AST node types for the Shard language.
//!
//! Every node carries a [`Span`] for error reporting. Expressions also
//! carry a [`NodeId`] so later stages can attach per-node information
//! (resolved call targets, operator bindings) in a side table without
//! mutating the tree. Large recursive types are boxed to keep enum sizes
//! reasonable.

use crate::Span;
use std::fmt;

// ══════════════════════════════════════════════════════════════════════════════
// Node identity
// ══════════════════════════════════════════════════════════════════════════════

/// Identity of an expression node, unique within one parsed [`Program`].
///
/// Assigned by the parser in creation order. Binding results are keyed by
/// `NodeId`; the id never changes after parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Top Level
// ══════════════════════════════════════════════════════════════════════════════

/// A complete Shard program: one or more namespace declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub namespaces: Vec<NamespaceDecl>,
    pub span: Span,
}

/// `namespace Name { classes }`
#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceDecl {
    pub name: Ident,
    pub classes: Vec<ClassDecl>,
    pub span: Span,
}

/// A spanned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// Member visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Protected => write!(f, "protected"),
            Self::Private => write!(f, "private"),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Classes & Members
// ══════════════════════════════════════════════════════════════════════════════

/// `public class Name { members }`
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub visibility: Visibility,
    pub name: Ident,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<MethodDecl>,
    pub operators: Vec<OperatorDecl>,
    pub span: Span,
}

/// `public int A;` or `private System.Console console = new System.Console;`
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub visibility: Visibility,
    pub ty: TypeAnnotation,
    pub name: Ident,
    pub init: Option<Expr>,
    pub span: Span,
}

/// `public static void Main() { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub visibility: Visibility,
    pub is_static: bool,
    pub return_type: TypeAnnotation,
    pub name: Ident,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// `public static Foo operator+(Foo lhs, int rhs) { body }`
///
/// Operator declarations are always static. `symbol` is the surface
/// operator token; arity is the parameter count (two for the binary forms
/// the language accepts).
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorDecl {
    pub visibility: Visibility,
    pub symbol: OperatorSym,
    pub return_type: TypeAnnotation,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// The overloadable operator symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OperatorSym {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
}

impl OperatorSym {
    /// The surface spelling of the symbol.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Eq => "==",
            Self::Ne => "!=",
        }
    }
}

impl fmt::Display for OperatorSym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A formal method/operator parameter: `int n`, `Foo lhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub ty: TypeAnnotation,
    pub name: Ident,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Type annotations
// ══════════════════════════════════════════════════════════════════════════════

/// The syntactic form of a type as written in source.
///
/// Distinct from the semantic type used during checking; annotations still
/// carry unresolved names (`Named`) and the `var` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnnotation {
    pub kind: TypeKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Int,
    Bool,
    Char,
    String,
    Void,
    /// `var` — the declared type is inferred from the initializer.
    Var,
    /// `T[]`
    Array(Box<TypeAnnotation>),
    /// A possibly-qualified class name: `Fraction`, `System.Console`.
    Named(Vec<Ident>),
}

impl TypeAnnotation {
    /// Render the annotation the way it was written.
    pub fn display_name(&self) -> String {
        match &self.kind {
            TypeKind::Int => "int".to_string(),
            TypeKind::Bool => "bool".to_string(),
            TypeKind::Char => "char".to_string(),
            TypeKind::String => "string".to_string(),
            TypeKind::Void => "void".to_string(),
            TypeKind::Var => "var".to_string(),
            TypeKind::Array(inner) => format!("{}[]", inner.display_name()),
            TypeKind::Named(parts) => parts
                .iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
                .join("."),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `int x = 0;` / `var m = new M;` / `Foo f;`
    VarDecl(VarDeclStmt),
    /// An expression evaluated for its effect: `m.Method(a);`
    Expr(ExprStmt),
    If(Box<IfStmt>),
    While(Box<WhileStmt>),
    DoWhile(Box<DoWhileStmt>),
    For(Box<ForStmt>),
    Return(ReturnStmt),
    Block(BlockStmt),
    /// A bare `;`.
    Empty(Span),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::VarDecl(s) => s.span,
            Stmt::Expr(s) => s.span,
            Stmt::If(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::DoWhile(s) => s.span,
            Stmt::For(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::Block(s) => s.span,
            Stmt::Empty(span) => *span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDeclStmt {
    pub ty: TypeAnnotation,
    pub name: Ident,
    pub init: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_branch: Stmt,
    pub else_branch: Option<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Stmt,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DoWhileStmt {
    pub body: Stmt,
    pub condition: Expr,
    pub span: Span,
}

/// `for (init; condition; step) body` — every header slot is optional.
#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub init: Option<ForInit>,
    pub condition: Option<Expr>,
    pub step: Option<Expr>,
    pub body: Stmt,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    VarDecl(VarDeclStmt),
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmt {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

/// A spanned, identified expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    IntLit(i32),
    BoolLit(bool),
    CharLit(char),
    StringLit(String),
    NullLit,

    /// A bare name: local variable, parameter, or an implicit field of the
    /// enclosing class (disambiguated during binding).
    Ident(String),

    /// `recv.name` — field access or a built-in property (`Length`).
    Field { recv: Box<Expr>, name: Ident },

    /// `recv[index]`
    Index { recv: Box<Expr>, index: Box<Expr> },

    /// `recv.Name(args)` with a receiver, or `Name(args)` on the enclosing
    /// class when `recv` is `None`.
    Call {
        recv: Option<Box<Expr>>,
        name: Ident,
        args: Vec<Expr>,
    },

    /// `new Fraction` / `new System.Console` — no argument list.
    New { class: Vec<Ident> },

    /// `new int[n]`
    NewArray {
        elem: TypeAnnotation,
        len: Box<Expr>,
    },

    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },

    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },

    /// `target = value`, where the target is a name, field, or element.
    /// Assignment is an expression; its value is the assigned value.
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },

    /// `( inner )`
    Paren(Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `!x`
    Not,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Not => "!",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::And => "&&",
            Self::Or => "||",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span {
        Span::point(1, 1)
    }

    #[test]
    fn operator_symbols_round_trip() {
        let syms = [
            OperatorSym::Add,
            OperatorSym::Sub,
            OperatorSym::Mul,
            OperatorSym::Div,
            OperatorSym::Rem,
            OperatorSym::Lt,
            OperatorSym::Gt,
            OperatorSym::Le,
            OperatorSym::Ge,
            OperatorSym::Eq,
            OperatorSym::Ne,
        ];
        let spellings: Vec<_> = syms.iter().map(|s| s.as_str()).collect();
        assert_eq!(
            spellings,
            ["+", "-", "*", "/", "%", "<", ">", "<=", ">=", "==", "!="]
        );
    }

    #[test]
    fn binary_op_spellings_cover_logic_operators() {
        assert_eq!(BinaryOp::And.as_str(), "&&");
        assert_eq!(BinaryOp::Or.as_str(), "||");
        assert_eq!(BinaryOp::Rem.as_str(), "%");
    }

    #[test]
    fn type_annotation_display() {
        let int = TypeAnnotation {
            kind: TypeKind::Int,
            span: span(),
        };
        assert_eq!(int.display_name(), "int");

        let arr = TypeAnnotation {
            kind: TypeKind::Array(Box::new(int)),
            span: span(),
        };
        assert_eq!(arr.display_name(), "int[]");

        let named = TypeAnnotation {
            kind: TypeKind::Named(vec![
                Ident::new("System", span()),
                Ident::new("Console", span()),
            ]),
            span: span(),
        };
        assert_eq!(named.display_name(), "System.Console");
    }
}
