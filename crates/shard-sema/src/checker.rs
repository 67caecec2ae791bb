//! The binding pass.
//!
//! Walks every method, operator, and field-initializer body once, infers
//! the static type of each expression, and resolves every call site and
//! operator application against the declaration table. Each resolution is
//! cached in a `NodeId → Binding` side table; the evaluator dispatches
//! through that table and never re-resolves (recursion and loops hit the
//! same node many times against the same static types).
//!
//! Resolution failures are local to their call site: one unresolved call
//! does not stop unrelated call sites from being checked and bound.

use std::collections::BTreeMap;

use shard_types::ast::*;
use shard_types::{CompileErrors, ErrorCode, SourceFile, Span};

use crate::env::ScopeStack;
use crate::resolve::{resolve_overload, ResolveError};
use crate::table::{report, DeclTable, FieldSig, MethodRef, MethodSig, OperatorSig};
use crate::ty::{display_type_list, Type};

/// Per-node binding results, keyed by the parser-assigned [`NodeId`].
pub type Bindings = BTreeMap<NodeId, Binding>;

/// The cached result of resolving one expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    /// A call node's selected method declaration.
    Method(MethodSig),
    /// An operator node's selected operator declaration.
    Operator(OperatorSig),
    /// A bare identifier that names a field of the enclosing class.
    ImplicitField,
    /// A field access resolved against a class declaration.
    Field { class: String, field: String },
    /// `arr.Length`
    ArrayLength,
    /// `str.Length`
    StringLength,
    /// `new C` for a user class, by qualified name.
    NewObject { class: String },
    /// `new System.Console`
    NewConsole,
    /// `new T[n]`, with the resolved element type.
    NewArray { elem: Type },
}

/// Everything the evaluator needs: the immutable declaration table, the
/// per-node bindings, and the entry point.
#[derive(Debug)]
pub struct Analysis {
    pub table: DeclTable,
    pub bindings: Bindings,
    pub entry: MethodRef,
}

/// Build the declaration table and bind the whole program.
///
/// Returns the analysis on success, or every diagnostic collected across
/// table build and binding on failure.
pub fn analyze(program: &Program, source: &SourceFile) -> Result<Analysis, CompileErrors> {
    let (table, errors) = DeclTable::build(program, source);

    let mut checker = Checker {
        program,
        source,
        table,
        bindings: BTreeMap::new(),
        errors,
        ns_name: String::new(),
        class_qualified: String::new(),
        class_fields: Vec::new(),
        ret: Type::Void,
        in_static: false,
        scopes: ScopeStack::new(),
    };

    checker.check_program();
    let entry = checker.find_entry();

    if checker.errors.has_errors() {
        return Err(checker.errors);
    }
    match entry {
        Some(entry) => Ok(Analysis {
            table: checker.table,
            bindings: checker.bindings,
            entry,
        }),
        None => Err(checker.errors),
    }
}

struct Checker<'a> {
    program: &'a Program,
    source: &'a SourceFile,
    table: DeclTable,
    bindings: Bindings,
    errors: CompileErrors,

    // ── Current context ──
    /// Enclosing namespace name.
    ns_name: String,
    /// Enclosing class qualified name.
    class_qualified: String,
    /// The enclosing class's fields (cloned out of the table so lookups
    /// don't hold a borrow while reporting).
    class_fields: Vec<FieldSig>,
    /// Declared return type of the body being checked.
    ret: Type,
    /// Whether the body has no `this` (static methods, operators).
    in_static: bool,
    /// Local variables in scope.
    scopes: ScopeStack,
}

impl Checker<'_> {
    // ══════════════════════════════════════════════════════════════════════
    // Program walk
    // ══════════════════════════════════════════════════════════════════════

    fn check_program(&mut self) {
        let program = self.program;
        for (ns_idx, ns) in program.namespaces.iter().enumerate() {
            for (class_idx, class) in ns.classes.iter().enumerate() {
                self.enter_class(ns, class);
                self.check_field_inits(class);
                for (m_idx, method) in class.methods.iter().enumerate() {
                    self.check_method(ns_idx, class_idx, m_idx, method);
                }
                for op in &class.operators {
                    self.check_operator(op);
                }
            }
        }
    }

    fn enter_class(&mut self, ns: &NamespaceDecl, class: &ClassDecl) {
        self.ns_name = ns.name.name.clone();
        self.class_qualified = format!("{}.{}", ns.name.name, class.name.name);
        self.class_fields = self
            .table
            .class(&self.class_qualified)
            .map(|entry| entry.fields.clone())
            .unwrap_or_default();
    }

    /// Field initializers run at construction with `this` in scope.
    fn check_field_inits(&mut self, class: &ClassDecl) {
        self.in_static = false;
        self.ret = Type::Void;
        for field in &class.fields {
            let Some(init) = &field.init else { continue };
            self.scopes = ScopeStack::new();
            let declared = self
                .class_fields
                .iter()
                .find(|f| f.name == field.name.name)
                .map(|f| f.ty.clone())
                .unwrap_or(Type::Unknown);
            let init_ty = self.infer_expr(init);
            if !init_ty.is_assignable_to(&declared) {
                self.error(
                    ErrorCode::TYPE_MISMATCH,
                    format!(
                        "cannot initialize field of type '{declared}' with a value of type '{init_ty}'"
                    ),
                    init.span,
                );
            }
        }
    }

    fn check_method(&mut self, ns_idx: usize, class_idx: usize, m_idx: usize, method: &MethodDecl) {
        let wanted = MethodRef {
            ns: ns_idx,
            class: class_idx,
            method: m_idx,
        };
        let sig = self
            .table
            .lookup_methods(&self.class_qualified, &method.name.name)
            .into_iter()
            .find(|s| s.kind == crate::table::MethodKind::User(wanted));

        // A declaration that lost the duplicate-overload race still gets
        // its body checked, with silently re-resolved types.
        let (params, ret) = match sig {
            Some(sig) => (sig.params, sig.ret),
            None => (
                method
                    .params
                    .iter()
                    .map(|p| self.resolve_quietly(&p.ty))
                    .collect(),
                self.resolve_quietly(&method.return_type),
            ),
        };

        self.ret = ret;
        self.in_static = method.is_static;
        self.scopes = ScopeStack::new();
        for (param, ty) in method.params.iter().zip(params.into_iter()) {
            if !self.scopes.define(&param.name.name, ty) {
                self.error(
                    ErrorCode::DUPLICATE_VARIABLE,
                    format!("parameter '{}' is already defined", param.name.name),
                    param.name.span,
                );
            }
        }
        for stmt in &method.body {
            self.check_stmt(stmt);
        }
    }

    /// Operator bodies are static two-parameter bodies.
    fn check_operator(&mut self, op: &OperatorDecl) {
        self.ret = self.resolve_quietly(&op.return_type);
        self.in_static = true;
        self.scopes = ScopeStack::new();
        for param in &op.params {
            let ty = self.resolve_quietly(&param.ty);
            if !self.scopes.define(&param.name.name, ty) {
                self.error(
                    ErrorCode::DUPLICATE_VARIABLE,
                    format!("parameter '{}' is already defined", param.name.name),
                    param.name.span,
                );
            }
        }
        for stmt in &op.body {
            self.check_stmt(stmt);
        }
    }

    /// Find the unique `static Main` entry point.
    fn find_entry(&mut self) -> Option<MethodRef> {
        let program = self.program;
        let mut found: Vec<(MethodRef, Span, &MethodDecl)> = Vec::new();
        for (ns_idx, ns) in program.namespaces.iter().enumerate() {
            for (class_idx, class) in ns.classes.iter().enumerate() {
                for (m_idx, method) in class.methods.iter().enumerate() {
                    if method.name.name == "Main" && method.is_static {
                        found.push((
                            MethodRef {
                                ns: ns_idx,
                                class: class_idx,
                                method: m_idx,
                            },
                            method.name.span,
                            method,
                        ));
                    }
                }
            }
        }
        match found.as_slice() {
            [] => {
                self.error(
                    ErrorCode::NO_ENTRY_POINT,
                    "program has no 'static void Main()' entry point",
                    self.program.span,
                );
                None
            }
            [(entry, span, method)] => {
                if !method.params.is_empty() || method.return_type.kind != TypeKind::Void {
                    self.error(
                        ErrorCode::TYPE_MISMATCH,
                        "entry point must be declared 'public static void Main()'",
                        *span,
                    );
                }
                Some(*entry)
            }
            multiple => {
                let (_, second_span, _) = multiple[1];
                self.error(
                    ErrorCode::MULTIPLE_ENTRY_POINTS,
                    format!("program has {} 'static Main' methods; exactly one is required", multiple.len()),
                    second_span,
                );
                None
            }
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Statements
    // ══════════════════════════════════════════════════════════════════════

    fn check_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::VarDecl(decl) => self.check_var_decl(decl),
            Stmt::Expr(s) => {
                self.infer_expr(&s.expr);
            }
            Stmt::If(s) => {
                self.expect_bool(&s.condition, "if condition");
                self.check_stmt(&s.then_branch);
                if let Some(else_branch) = &s.else_branch {
                    self.check_stmt(else_branch);
                }
            }
            Stmt::While(s) => {
                self.expect_bool(&s.condition, "while condition");
                self.check_stmt(&s.body);
            }
            Stmt::DoWhile(s) => {
                self.check_stmt(&s.body);
                self.expect_bool(&s.condition, "do-while condition");
            }
            Stmt::For(s) => {
                self.scopes.push();
                match &s.init {
                    Some(ForInit::VarDecl(decl)) => self.check_var_decl(decl),
                    Some(ForInit::Expr(expr)) => {
                        self.infer_expr(expr);
                    }
                    None => {}
                }
                if let Some(cond) = &s.condition {
                    self.expect_bool(cond, "for condition");
                }
                if let Some(step) = &s.step {
                    self.infer_expr(step);
                }
                self.check_stmt(&s.body);
                self.scopes.pop();
            }
            Stmt::Return(s) => self.check_return(s),
            Stmt::Block(s) => {
                self.scopes.push();
                for stmt in &s.stmts {
                    self.check_stmt(stmt);
                }
                self.scopes.pop();
            }
            Stmt::Empty(_) => {}
        }
    }

    fn check_var_decl(&mut self, decl: &VarDeclStmt) {
        let declared = match decl.ty.kind {
            TypeKind::Var => None,
            _ => Some(self.resolve_reported(&decl.ty)),
        };
        let init_ty = decl.init.as_ref().map(|init| self.infer_expr(init));

        let ty = match (declared, init_ty) {
            (Some(declared), Some(init_ty)) => {
                if !init_ty.is_assignable_to(&declared) {
                    self.error(
                        ErrorCode::TYPE_MISMATCH,
                        format!(
                            "cannot assign a value of type '{init_ty}' to a variable of type '{declared}'"
                        ),
                        decl.span,
                    );
                }
                declared
            }
            (Some(declared), None) => declared,
            (None, Some(init_ty)) => match init_ty {
                Type::Null => {
                    self.error(
                        ErrorCode::CANNOT_INFER_VAR,
                        "cannot infer a type for 'var' from 'null'",
                        decl.span,
                    );
                    Type::Unknown
                }
                Type::Void => {
                    self.error(
                        ErrorCode::VOID_VALUE,
                        "initializer expression has no value",
                        decl.span,
                    );
                    Type::Unknown
                }
                other => other,
            },
            (None, None) => {
                self.error(
                    ErrorCode::CANNOT_INFER_VAR,
                    "'var' declarations require an initializer",
                    decl.span,
                );
                Type::Unknown
            }
        };

        if !self.scopes.define(&decl.name.name, ty) {
            self.error(
                ErrorCode::DUPLICATE_VARIABLE,
                format!("variable '{}' is already defined in this scope", decl.name.name),
                decl.name.span,
            );
        }
    }

    fn check_return(&mut self, stmt: &ReturnStmt) {
        match (&self.ret.clone(), &stmt.value) {
            (Type::Void, None) => {}
            (Type::Void, Some(value)) => {
                self.infer_expr(value);
                self.error(
                    ErrorCode::TYPE_MISMATCH,
                    "cannot return a value from a 'void' method",
                    stmt.span,
                );
            }
            (expected, None) => {
                self.error(
                    ErrorCode::TYPE_MISMATCH,
                    format!("this method must return a value of type '{expected}'"),
                    stmt.span,
                );
            }
            (expected, Some(value)) => {
                let actual = self.infer_expr(value);
                if !actual.is_assignable_to(expected) {
                    self.error(
                        ErrorCode::TYPE_MISMATCH,
                        format!("return type mismatch: expected '{expected}', found '{actual}'"),
                        value.span,
                    );
                }
            }
        }
    }

    fn expect_bool(&mut self, condition: &Expr, what: &str) {
        let ty = self.infer_expr(condition);
        if !matches!(ty, Type::Bool | Type::Unknown) {
            self.error(
                ErrorCode::TYPE_MISMATCH,
                format!("{what} must be 'bool', found '{ty}'"),
                condition.span,
            );
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expressions
    // ══════════════════════════════════════════════════════════════════════

    fn infer_expr(&mut self, expr: &Expr) -> Type {
        match &expr.kind {
            ExprKind::IntLit(_) => Type::Int,
            ExprKind::BoolLit(_) => Type::Bool,
            ExprKind::CharLit(_) => Type::Char,
            ExprKind::StringLit(_) => Type::String,
            ExprKind::NullLit => Type::Null,

            ExprKind::Ident(name) => self.infer_ident(expr.id, name, expr.span),
            ExprKind::Field { recv, name } => {
                let recv_ty = self.infer_expr(recv);
                self.infer_field(expr.id, &recv_ty, name, false)
            }
            ExprKind::Index { recv, index } => self.infer_index(recv, index),
            ExprKind::Call { recv, name, args } => self.infer_call(expr, recv.as_deref(), name, args),
            ExprKind::New { class } => self.infer_new(expr.id, class, expr.span),
            ExprKind::NewArray { elem, len } => self.infer_new_array(expr.id, elem, len),
            ExprKind::Unary { op, operand } => self.infer_unary(expr, *op, operand),
            ExprKind::Binary { op, lhs, rhs } => self.infer_binary(expr, *op, lhs, rhs),
            ExprKind::Assign { target, value } => self.infer_assign(target, value, expr.span),
            ExprKind::Paren(inner) => self.infer_expr(inner),
        }
    }

    /// A bare name: local first, then an implicit field of `this`.
    fn infer_ident(&mut self, id: NodeId, name: &str, span: Span) -> Type {
        if let Some(ty) = self.scopes.lookup(name) {
            return ty.clone();
        }
        if let Some(field) = self.class_fields.iter().find(|f| f.name == name) {
            let ty = field.ty.clone();
            if self.in_static {
                self.error(
                    ErrorCode::INSTANCE_MEMBER_IN_STATIC,
                    format!("cannot use instance field '{name}' in a static context"),
                    span,
                );
                return ty;
            }
            self.bindings.insert(id, Binding::ImplicitField);
            return ty;
        }
        self.error(
            ErrorCode::UNDEFINED_VARIABLE,
            format!("name '{name}' is not defined"),
            span,
        );
        Type::Unknown
    }

    /// `recv.name` — class field or built-in `Length` property.
    fn infer_field(&mut self, id: NodeId, recv_ty: &Type, name: &Ident, assigning: bool) -> Type {
        match recv_ty {
            Type::Array(_) if name.name == "Length" => {
                if assigning {
                    self.report_readonly_length(name.span);
                } else {
                    self.bindings.insert(id, Binding::ArrayLength);
                }
                Type::Int
            }
            Type::String if name.name == "Length" => {
                if assigning {
                    self.report_readonly_length(name.span);
                } else {
                    self.bindings.insert(id, Binding::StringLength);
                }
                Type::Int
            }
            Type::Class(class) => {
                let Some(field) = self
                    .table
                    .class(class)
                    .and_then(|entry| entry.field(&name.name))
                    .cloned()
                else {
                    self.error(
                        ErrorCode::UNKNOWN_MEMBER,
                        format!("class '{class}' has no field named '{}'", name.name),
                        name.span,
                    );
                    return Type::Unknown;
                };
                if field.visibility != Visibility::Public && *class != self.class_qualified {
                    self.error(
                        ErrorCode::PRIVATE_MEMBER_ACCESS,
                        format!(
                            "field '{}' of class '{class}' is {}",
                            name.name, field.visibility
                        ),
                        name.span,
                    );
                }
                self.bindings.insert(
                    id,
                    Binding::Field {
                        class: class.clone(),
                        field: name.name.clone(),
                    },
                );
                field.ty
            }
            Type::Unknown => Type::Unknown,
            other => {
                self.error(
                    ErrorCode::UNKNOWN_MEMBER,
                    format!("type '{other}' has no field named '{}'", name.name),
                    name.span,
                );
                Type::Unknown
            }
        }
    }

    fn report_readonly_length(&mut self, span: Span) {
        self.errors.push_error(
            shard_types::ShardError::new(
                self.source.name.clone(),
                ErrorCode::READONLY_PROPERTY,
                "'Length' is read-only and cannot be assigned",
                span,
                self.source.line(span.start_line).unwrap_or("").to_string(),
            )
            .with_suggestion("Length is derived from the value; remove the assignment"),
        );
    }

    fn infer_index(&mut self, recv: &Expr, index: &Expr) -> Type {
        let recv_ty = self.infer_expr(recv);
        let index_ty = self.infer_expr(index);
        if !matches!(index_ty, Type::Int | Type::Unknown) {
            self.error(
                ErrorCode::ARRAY_INDEX_NOT_INT,
                format!("array index must be 'int', found '{index_ty}'"),
                index.span,
            );
        }
        match recv_ty {
            Type::Array(elem) => *elem,
            Type::Unknown => Type::Unknown,
            other => {
                self.error(
                    ErrorCode::TYPE_MISMATCH,
                    format!("cannot index a value of type '{other}'"),
                    recv.span,
                );
                Type::Unknown
            }
        }
    }

    /// A call with or without a receiver. Resolution runs against the
    /// receiver class's overload set (or the enclosing class for
    /// receiver-less calls, or the `string` built-ins).
    fn infer_call(
        &mut self,
        expr: &Expr,
        recv: Option<&Expr>,
        name: &Ident,
        args: &[Expr],
    ) -> Type {
        let arg_types: Vec<Type> = args.iter().map(|arg| self.infer_expr(arg)).collect();

        let (set, target_class): (Vec<MethodSig>, Option<String>) = match recv {
            None => (
                self.table.lookup_methods(&self.class_qualified, &name.name),
                Some(self.class_qualified.clone()),
            ),
            Some(receiver) => {
                let recv_ty = self.infer_expr(receiver);
                match recv_ty {
                    Type::Class(class) => {
                        (self.table.lookup_methods(&class, &name.name), Some(class))
                    }
                    Type::String => (self.table.lookup_string_methods(&name.name), None),
                    Type::Unknown => return Type::Unknown,
                    other => {
                        self.error(
                            ErrorCode::NOT_CALLABLE,
                            format!("type '{other}' has no method named '{}'", name.name),
                            name.span,
                        );
                        return Type::Unknown;
                    }
                }
            }
        };

        // One bad argument already produced its own diagnostic.
        if arg_types.iter().any(|t| matches!(t, Type::Unknown)) {
            return Type::Unknown;
        }

        let sig = match resolve_overload(&set, &arg_types) {
            Ok(sig) => sig.clone(),
            Err(err) => {
                self.report_resolution_failure(
                    err,
                    &format!("method '{}'", name.name),
                    &set.iter().map(|s| display_type_list(&s.params)).collect::<Vec<_>>(),
                    &arg_types,
                    expr.span,
                );
                return Type::Unknown;
            }
        };

        // Static/instance agreement and visibility.
        match recv {
            None => {
                if !sig.is_static && self.in_static {
                    self.error(
                        ErrorCode::INSTANCE_MEMBER_IN_STATIC,
                        format!(
                            "cannot call instance method '{}' from a static context",
                            name.name
                        ),
                        name.span,
                    );
                }
            }
            Some(_) => {
                if sig.is_static {
                    self.error(
                        ErrorCode::STATIC_CALL_ON_INSTANCE,
                        format!(
                            "static method '{}' cannot be called through an instance",
                            name.name
                        ),
                        name.span,
                    );
                }
                if sig.visibility != Visibility::Public
                    && target_class.as_deref() != Some(self.class_qualified.as_str())
                {
                    self.error(
                        ErrorCode::PRIVATE_MEMBER_ACCESS,
                        format!("method '{}' is {}", name.name, sig.visibility),
                        name.span,
                    );
                }
            }
        }

        let ret = sig.ret.clone();
        self.bindings.insert(expr.id, Binding::Method(sig));
        ret
    }

    fn infer_new(&mut self, id: NodeId, class: &[Ident], span: Span) -> Type {
        match self.table.resolve_class(&self.ns_name, class) {
            Some(entry) => {
                let qualified = entry.qualified_name.clone();
                let binding = if entry.is_builtin() {
                    Binding::NewConsole
                } else {
                    Binding::NewObject {
                        class: qualified.clone(),
                    }
                };
                self.bindings.insert(id, binding);
                Type::Class(qualified)
            }
            None => {
                let shown = DeclTable::qualify(&self.ns_name, class);
                self.error(
                    ErrorCode::UNKNOWN_TYPE,
                    format!("unknown class '{shown}'"),
                    span,
                );
                Type::Unknown
            }
        }
    }

    fn infer_new_array(&mut self, id: NodeId, elem: &TypeAnnotation, len: &Expr) -> Type {
        let elem_ty = self.resolve_reported(elem);
        let len_ty = self.infer_expr(len);
        if !matches!(len_ty, Type::Int | Type::Unknown) {
            self.error(
                ErrorCode::ARRAY_INDEX_NOT_INT,
                format!("array length must be 'int', found '{len_ty}'"),
                len.span,
            );
        }
        self.bindings.insert(
            id,
            Binding::NewArray {
                elem: elem_ty.clone(),
            },
        );
        Type::Array(Box::new(elem_ty))
    }

    fn infer_unary(&mut self, expr: &Expr, op: UnaryOp, operand: &Expr) -> Type {
        let operand_ty = self.infer_expr(operand);
        if matches!(operand_ty, Type::Unknown) {
            return Type::Unknown;
        }
        self.resolve_operator(expr, op.as_str(), vec![operand_ty])
    }

    fn infer_binary(&mut self, expr: &Expr, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> Type {
        let lhs_ty = self.infer_expr(lhs);
        let rhs_ty = self.infer_expr(rhs);
        if matches!(lhs_ty, Type::Unknown) || matches!(rhs_ty, Type::Unknown) {
            return Type::Unknown;
        }
        self.resolve_operator(expr, op.as_str(), vec![lhs_ty, rhs_ty])
    }

    /// Operators resolve exactly like calls: the overload set for the
    /// symbol (user declarations in the current namespace + built-ins)
    /// against the operands' static types.
    fn resolve_operator(&mut self, expr: &Expr, symbol: &str, operand_types: Vec<Type>) -> Type {
        let set = self.table.lookup_operators(&self.ns_name, symbol);
        match resolve_overload(&set, &operand_types) {
            Ok(sig) => {
                let ret = sig.ret.clone();
                self.bindings.insert(expr.id, Binding::Operator(sig.clone()));
                ret
            }
            Err(err) => {
                self.report_resolution_failure(
                    err,
                    &format!("operator '{symbol}'"),
                    &set.iter().map(|s| display_type_list(&s.params)).collect::<Vec<_>>(),
                    &operand_types,
                    expr.span,
                );
                Type::Unknown
            }
        }
    }

    fn infer_assign(&mut self, target: &Expr, value: &Expr, span: Span) -> Type {
        let target_ty = self.infer_assign_target(target);
        let value_ty = self.infer_expr(value);
        if !value_ty.is_assignable_to(&target_ty) {
            self.error(
                ErrorCode::TYPE_MISMATCH,
                format!("cannot assign a value of type '{value_ty}' to a target of type '{target_ty}'"),
                span,
            );
        }
        target_ty
    }

    /// Assignment targets: a name, a field, or an array element.
    fn infer_assign_target(&mut self, target: &Expr) -> Type {
        match &target.kind {
            ExprKind::Ident(name) => self.infer_ident(target.id, name, target.span),
            ExprKind::Field { recv, name } => {
                let recv_ty = self.infer_expr(recv);
                self.infer_field(target.id, &recv_ty, name, true)
            }
            ExprKind::Index { recv, index } => self.infer_index(recv, index),
            _ => {
                self.error(
                    ErrorCode::NOT_ASSIGNABLE_TARGET,
                    "this expression cannot be assigned to",
                    target.span,
                );
                self.infer_expr(target)
            }
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Diagnostics
    // ══════════════════════════════════════════════════════════════════════

    fn report_resolution_failure(
        &mut self,
        err: ResolveError,
        what: &str,
        candidates: &[String],
        args: &[Type],
        span: Span,
    ) {
        match err {
            ResolveError::NoApplicable => {
                let message = if candidates.is_empty() {
                    format!("{what} is not declared in this scope")
                } else {
                    format!(
                        "no overload of {what} accepts {}; candidates: {}",
                        display_type_list(args),
                        candidates.join(", ")
                    )
                };
                self.error(ErrorCode::NO_APPLICABLE_OVERLOAD, message, span);
            }
            ResolveError::Ambiguous { applicable } => {
                let shown: Vec<&String> = applicable
                    .iter()
                    .filter_map(|&i| candidates.get(i))
                    .collect();
                self.error(
                    ErrorCode::AMBIGUOUS_OVERLOAD,
                    format!(
                        "call to {what} with {} is ambiguous between {}",
                        display_type_list(args),
                        shown
                            .iter()
                            .map(|s| s.as_str())
                            .collect::<Vec<_>>()
                            .join(" and ")
                    ),
                    span,
                );
            }
        }
    }

    fn error(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        report(&mut self.errors, self.source, code, message, span);
    }

    /// Resolve an annotation, reporting failures at its span.
    fn resolve_reported(&mut self, ann: &TypeAnnotation) -> Type {
        match self.table.resolve_annotation(&self.ns_name, ann, false) {
            Ok(ty) => ty,
            Err((code, message)) => {
                self.error(code, message, ann.span);
                Type::Unknown
            }
        }
    }

    /// Resolve an annotation without reporting — used for bodies whose
    /// signature errors were already reported by the table build.
    fn resolve_quietly(&self, ann: &TypeAnnotation) -> Type {
        self.table
            .resolve_annotation(&self.ns_name, ann, true)
            .unwrap_or(Type::Unknown)
    }
}
