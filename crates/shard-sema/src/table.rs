//! The declaration table.
//!
//! Built once by folding the parsed program's declarations into
//! per-namespace/per-class maps; immutable afterwards, so independent
//! evaluation contexts may share it read-only. Overload sets are keyed by
//! name (methods, per class) and by operator symbol (per namespace), with
//! duplicate parameter-type tuples rejected at build time.
//!
//! Built-ins live in the same maps as user declarations so that both go
//! through one resolution path: `System.Console` methods, the `string`
//! method set, the primitive/string operators, and a per-class identity
//! `==`/`!=` for every class that declares no equality of its own.

use std::collections::BTreeMap;

use shard_types::ast::{Ident, Program, TypeAnnotation, TypeKind, Visibility};
use shard_types::{CompileErrors, ErrorCode, ShardError, SourceFile, Span};

use crate::ty::{display_type_list, Type};

/// Qualified name of the built-in console class.
pub const CONSOLE_CLASS: &str = "System.Console";

// ══════════════════════════════════════════════════════════════════════════════
// Signatures
// ══════════════════════════════════════════════════════════════════════════════

/// Path of a user method body inside the [`Program`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodRef {
    pub ns: usize,
    pub class: usize,
    pub method: usize,
}

/// Path of a user operator body inside the [`Program`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorRef {
    pub ns: usize,
    pub class: usize,
    pub operator: usize,
}

/// Built-in methods, dispatched by the evaluator without a Shard body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinMethod {
    ConsoleWrite,
    ConsoleWriteLine,
    ConsoleReadInt,
    StringIndexOfChar,
    StringIndexOfString,
    StringSubstring,
    StringCharAt,
    StringEquals,
}

/// What a resolved method call executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    User(MethodRef),
    Builtin(BuiltinMethod),
}

/// One method declaration in an overload set.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodSig {
    pub name: String,
    /// Declared parameter types, in order. The receiver is not included.
    pub params: Vec<Type>,
    pub ret: Type,
    pub is_static: bool,
    pub visibility: Visibility,
    pub kind: MethodKind,
}

/// Built-in operators on primitives and strings, plus the per-class
/// identity equality defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinOp {
    IntAdd,
    IntSub,
    IntMul,
    IntDiv,
    IntRem,
    IntNeg,
    IntLt,
    IntGt,
    IntLe,
    IntGe,
    IntEq,
    IntNe,
    BoolEq,
    BoolNe,
    BoolAnd,
    BoolOr,
    BoolNot,
    CharEq,
    CharNe,
    CharLt,
    CharGt,
    CharLe,
    CharGe,
    StrConcat,
    StrEq,
    StrNe,
    /// Reference-identity equality, auto-registered per class.
    RefEq,
    RefNe,
}

/// What a resolved operator application executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    User(OperatorRef),
    Builtin(BuiltinOp),
}

/// One operator declaration in an overload set. Unary built-ins carry one
/// operand type; binary forms carry two. The symbol spelling is shared
/// between arities (`-` is both negation and subtraction) — the resolver's
/// arity filter tells them apart.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorSig {
    pub symbol: String,
    pub params: Vec<Type>,
    pub ret: Type,
    pub kind: OperatorKind,
}

impl crate::resolve::Candidate for MethodSig {
    fn param_types(&self) -> &[Type] {
        &self.params
    }
}

impl crate::resolve::Candidate for OperatorSig {
    fn param_types(&self) -> &[Type] {
        &self.params
    }
}

/// One declared field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSig {
    pub name: String,
    pub ty: Type,
    pub visibility: Visibility,
}

/// One class: its fields and its per-name method overload sets.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassEntry {
    pub qualified_name: String,
    /// `(namespace index, class index)` into the program for user classes;
    /// `None` for built-ins.
    pub decl: Option<(usize, usize)>,
    pub fields: Vec<FieldSig>,
    pub methods: BTreeMap<String, Vec<MethodSig>>,
}

impl ClassEntry {
    pub fn is_builtin(&self) -> bool {
        self.decl.is_none()
    }

    pub fn field(&self, name: &str) -> Option<&FieldSig> {
        self.fields.iter().find(|f| f.name == name)
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// The table
// ══════════════════════════════════════════════════════════════════════════════

/// The immutable declaration table.
#[derive(Debug, Clone)]
pub struct DeclTable {
    /// All classes by qualified name, built-ins included.
    classes: BTreeMap<String, ClassEntry>,
    /// Per-namespace operator overload sets, keyed by symbol spelling.
    operators: BTreeMap<String, BTreeMap<String, Vec<OperatorSig>>>,
    /// Operators on primitives and strings, visible from every namespace.
    builtin_operators: BTreeMap<String, Vec<OperatorSig>>,
    /// The built-in `string` method set (receiver excluded from params).
    string_methods: BTreeMap<String, Vec<MethodSig>>,
}

impl DeclTable {
    // ── Lookup ────────────────────────────────────────────────────────────────

    /// Get a class entry by qualified name.
    pub fn class(&self, qualified: &str) -> Option<&ClassEntry> {
        self.classes.get(qualified)
    }

    /// Resolve a possibly-qualified class reference from inside
    /// `current_ns`: a single name looks up in the current namespace, a
    /// dotted name is taken as fully qualified.
    pub fn resolve_class(&self, current_ns: &str, parts: &[Ident]) -> Option<&ClassEntry> {
        let key = Self::qualify(current_ns, parts);
        self.classes.get(&key)
    }

    /// The qualified-name key a class reference resolves through.
    pub fn qualify(current_ns: &str, parts: &[Ident]) -> String {
        if parts.len() == 1 {
            format!("{current_ns}.{}", parts[0].name)
        } else {
            parts
                .iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
                .join(".")
        }
    }

    /// The (possibly empty) method overload set visible on a class under
    /// `name`. An empty result is not itself an error — the resolver turns
    /// it into a no-applicable-overload failure at the call site.
    pub fn lookup_methods(&self, class_qualified: &str, name: &str) -> Vec<MethodSig> {
        self.classes
            .get(class_qualified)
            .and_then(|entry| entry.methods.get(name))
            .cloned()
            .unwrap_or_default()
    }

    /// The operator overload set for `symbol` visible from `namespace`:
    /// user declarations in that namespace plus the built-ins, one merged
    /// set resolved exactly like a method call.
    pub fn lookup_operators(&self, namespace: &str, symbol: &str) -> Vec<OperatorSig> {
        let mut set: Vec<OperatorSig> = self
            .operators
            .get(namespace)
            .and_then(|per_sym| per_sym.get(symbol))
            .cloned()
            .unwrap_or_default();
        if let Some(builtins) = self.builtin_operators.get(symbol) {
            set.extend(builtins.iter().cloned());
        }
        set
    }

    /// The built-in method overload set on `string` under `name`.
    pub fn lookup_string_methods(&self, name: &str) -> Vec<MethodSig> {
        self.string_methods.get(name).cloned().unwrap_or_default()
    }

    // ── Build ─────────────────────────────────────────────────────────────────

    /// Fold a parsed program into a declaration table.
    ///
    /// Duplicate classes, duplicate fields, and duplicate overload tuples
    /// are reported into the returned [`CompileErrors`]; the offending
    /// declarations are left out of the table so later stages see a
    /// consistent view.
    pub fn build(program: &Program, source: &SourceFile) -> (DeclTable, CompileErrors) {
        let mut errors = CompileErrors::empty();
        let mut table = DeclTable::with_builtins();

        // Pass 1: class names. Later passes resolve annotations against
        // the full name set, so classes may reference classes declared
        // after them.
        for (ns_idx, ns) in program.namespaces.iter().enumerate() {
            for (class_idx, class) in ns.classes.iter().enumerate() {
                let qualified = format!("{}.{}", ns.name.name, class.name.name);
                if table.classes.contains_key(&qualified) {
                    report(
                        &mut errors,
                        source,
                        ErrorCode::DUPLICATE_CLASS,
                        format!("class '{qualified}' is already defined"),
                        class.name.span,
                    );
                    continue;
                }
                table.classes.insert(
                    qualified.clone(),
                    ClassEntry {
                        qualified_name: qualified,
                        decl: Some((ns_idx, class_idx)),
                        fields: Vec::new(),
                        methods: BTreeMap::new(),
                    },
                );
            }
        }

        // Pass 2: member signatures and operator registration.
        let mut user_classes: Vec<(String, String)> = Vec::new(); // (ns name, qualified)
        for (ns_idx, ns) in program.namespaces.iter().enumerate() {
            let ns_name = ns.name.name.clone();
            for (class_idx, class) in ns.classes.iter().enumerate() {
                let qualified = format!("{}.{}", ns_name, class.name.name);
                // Skip declarations that lost the duplicate-class race.
                let owns_entry = table
                    .classes
                    .get(&qualified)
                    .is_some_and(|e| e.decl == Some((ns_idx, class_idx)));
                if !owns_entry {
                    continue;
                }
                user_classes.push((ns_name.clone(), qualified.clone()));

                let fields = table.build_fields(class, &ns_name, source, &mut errors);
                let methods =
                    table.build_methods(class, ns_idx, class_idx, &ns_name, source, &mut errors);
                if let Some(entry) = table.classes.get_mut(&qualified) {
                    entry.fields = fields;
                    entry.methods = methods;
                }
                table.build_operators(class, ns_idx, class_idx, &ns_name, source, &mut errors);
            }
        }

        // Pass 3: identity equality defaults. Every class without a user
        // `==`/`!=` over its own type gets a reference-identity pair, so
        // comparing two instances always resolves.
        for (ns_name, qualified) in &user_classes {
            let class_ty = Type::Class(qualified.clone());
            let tuple = vec![class_ty.clone(), class_ty];
            for (symbol, op) in [("==", BuiltinOp::RefEq), ("!=", BuiltinOp::RefNe)] {
                let declared = table
                    .operators
                    .get(ns_name)
                    .and_then(|per_sym| per_sym.get(symbol))
                    .is_some_and(|set| set.iter().any(|sig| sig.params == tuple));
                if !declared {
                    table
                        .operators
                        .entry(ns_name.clone())
                        .or_default()
                        .entry(symbol.to_string())
                        .or_default()
                        .push(OperatorSig {
                            symbol: symbol.to_string(),
                            params: tuple.clone(),
                            ret: Type::Bool,
                            kind: OperatorKind::Builtin(op),
                        });
                }
            }
        }

        (table, errors)
    }

    fn build_fields(
        &self,
        class: &shard_types::ast::ClassDecl,
        ns_name: &str,
        source: &SourceFile,
        errors: &mut CompileErrors,
    ) -> Vec<FieldSig> {
        let mut fields: Vec<FieldSig> = Vec::new();
        for field in &class.fields {
            let ty = self.annotation_or_report(ns_name, &field.ty, false, source, errors);
            if fields.iter().any(|f| f.name == field.name.name) {
                report(
                    errors,
                    source,
                    ErrorCode::DUPLICATE_FIELD,
                    format!(
                        "field '{}' is already defined in class '{}'",
                        field.name.name, class.name.name
                    ),
                    field.name.span,
                );
                continue;
            }
            fields.push(FieldSig {
                name: field.name.name.clone(),
                ty,
                visibility: field.visibility,
            });
        }
        fields
    }

    fn build_methods(
        &self,
        class: &shard_types::ast::ClassDecl,
        ns_idx: usize,
        class_idx: usize,
        ns_name: &str,
        source: &SourceFile,
        errors: &mut CompileErrors,
    ) -> BTreeMap<String, Vec<MethodSig>> {
        let mut methods: BTreeMap<String, Vec<MethodSig>> = BTreeMap::new();
        for (m_idx, method) in class.methods.iter().enumerate() {
            let params: Vec<Type> = method
                .params
                .iter()
                .map(|p| self.annotation_or_report(ns_name, &p.ty, false, source, errors))
                .collect();
            let ret = self.annotation_or_report(ns_name, &method.return_type, true, source, errors);

            let set = methods.entry(method.name.name.clone()).or_default();
            if set.iter().any(|sig| sig.params == params) {
                report(
                    errors,
                    source,
                    ErrorCode::DUPLICATE_OVERLOAD,
                    format!(
                        "method '{}{}' is already defined in class '{}'",
                        method.name.name,
                        display_type_list(&params),
                        class.name.name
                    ),
                    method.name.span,
                );
                continue;
            }
            set.push(MethodSig {
                name: method.name.name.clone(),
                params,
                ret,
                is_static: method.is_static,
                visibility: method.visibility,
                kind: MethodKind::User(MethodRef {
                    ns: ns_idx,
                    class: class_idx,
                    method: m_idx,
                }),
            });
        }
        methods
    }

    fn build_operators(
        &mut self,
        class: &shard_types::ast::ClassDecl,
        ns_idx: usize,
        class_idx: usize,
        ns_name: &str,
        source: &SourceFile,
        errors: &mut CompileErrors,
    ) {
        for (o_idx, op) in class.operators.iter().enumerate() {
            if op.params.len() != 2 {
                report(
                    errors,
                    source,
                    ErrorCode::BAD_OPERATOR_ARITY,
                    format!(
                        "operator '{}' must take exactly two operands, found {}",
                        op.symbol,
                        op.params.len()
                    ),
                    op.span,
                );
                continue;
            }
            let params: Vec<Type> = op
                .params
                .iter()
                .map(|p| self.annotation_or_report(ns_name, &p.ty, false, source, errors))
                .collect();
            let ret = self.annotation_or_report(ns_name, &op.return_type, false, source, errors);
            let symbol = op.symbol.as_str().to_string();

            let duplicate = self
                .operators
                .get(ns_name)
                .and_then(|per_sym| per_sym.get(&symbol))
                .is_some_and(|set| set.iter().any(|sig| sig.params == params))
                || self
                    .builtin_operators
                    .get(&symbol)
                    .is_some_and(|set| set.iter().any(|sig| sig.params == params));
            if duplicate {
                report(
                    errors,
                    source,
                    ErrorCode::DUPLICATE_OVERLOAD,
                    format!(
                        "operator '{}{}' is already defined",
                        symbol,
                        display_type_list(&params)
                    ),
                    op.span,
                );
                continue;
            }
            self.operators
                .entry(ns_name.to_string())
                .or_default()
                .entry(symbol.clone())
                .or_default()
                .push(OperatorSig {
                    symbol,
                    params,
                    ret,
                    kind: OperatorKind::User(OperatorRef {
                        ns: ns_idx,
                        class: class_idx,
                        operator: o_idx,
                    }),
                });
        }
    }

    /// Resolve an annotation, reporting failures and falling back to
    /// [`Type::Unknown`] so checking can continue.
    fn annotation_or_report(
        &self,
        current_ns: &str,
        ann: &TypeAnnotation,
        allow_void: bool,
        source: &SourceFile,
        errors: &mut CompileErrors,
    ) -> Type {
        match self.resolve_annotation(current_ns, ann, allow_void) {
            Ok(ty) => ty,
            Err((code, message)) => {
                report(errors, source, code, message, ann.span);
                Type::Unknown
            }
        }
    }

    /// Resolve a syntactic annotation to a semantic type.
    pub fn resolve_annotation(
        &self,
        current_ns: &str,
        ann: &TypeAnnotation,
        allow_void: bool,
    ) -> Result<Type, (ErrorCode, String)> {
        match &ann.kind {
            TypeKind::Int => Ok(Type::Int),
            TypeKind::Bool => Ok(Type::Bool),
            TypeKind::Char => Ok(Type::Char),
            TypeKind::String => Ok(Type::String),
            TypeKind::Void if allow_void => Ok(Type::Void),
            TypeKind::Void => Err((
                ErrorCode::VOID_VALUE,
                "'void' is only valid as a return type".to_string(),
            )),
            TypeKind::Var => Err((
                ErrorCode::CANNOT_INFER_VAR,
                "'var' is only valid for an initialized local variable".to_string(),
            )),
            TypeKind::Array(inner) => {
                let elem = self.resolve_annotation(current_ns, inner, false)?;
                Ok(Type::Array(Box::new(elem)))
            }
            TypeKind::Named(parts) => match self.resolve_class(current_ns, parts) {
                Some(entry) => Ok(Type::Class(entry.qualified_name.clone())),
                None => Err((
                    ErrorCode::UNKNOWN_TYPE,
                    format!("unknown type '{}'", ann.display_name()),
                )),
            },
        }
    }

    // ── Built-ins ─────────────────────────────────────────────────────────────

    /// The table before any user declaration: `System.Console`, the
    /// `string` method set, and the primitive/string operators.
    fn with_builtins() -> DeclTable {
        let mut table = DeclTable {
            classes: BTreeMap::new(),
            operators: BTreeMap::new(),
            builtin_operators: BTreeMap::new(),
            string_methods: BTreeMap::new(),
        };
        table.register_console();
        table.register_string_methods();
        table.register_builtin_operators();
        table
    }

    fn register_console(&mut self) {
        let mut methods: BTreeMap<String, Vec<MethodSig>> = BTreeMap::new();

        let write_overloads = [Type::Int, Type::Bool, Type::Char, Type::String];
        for name in ["Write", "WriteLine"] {
            let builtin = if name == "Write" {
                BuiltinMethod::ConsoleWrite
            } else {
                BuiltinMethod::ConsoleWriteLine
            };
            let mut set: Vec<MethodSig> = write_overloads
                .iter()
                .map(|ty| builtin_method(name, vec![ty.clone()], Type::Void, builtin))
                .collect();
            if name == "WriteLine" {
                set.push(builtin_method(name, Vec::new(), Type::Void, builtin));
            }
            methods.insert(name.to_string(), set);
        }
        methods.insert(
            "ReadInt".to_string(),
            vec![builtin_method(
                "ReadInt",
                Vec::new(),
                Type::Int,
                BuiltinMethod::ConsoleReadInt,
            )],
        );

        self.classes.insert(
            CONSOLE_CLASS.to_string(),
            ClassEntry {
                qualified_name: CONSOLE_CLASS.to_string(),
                decl: None,
                fields: Vec::new(),
                methods,
            },
        );
    }

    /// The `string` methods. `Length` is a read-only property handled by
    /// the checker, not a method, so it is absent here.
    fn register_string_methods(&mut self) {
        let entries: [(&str, Vec<Type>, Type, BuiltinMethod); 5] = [
            (
                "IndexOf",
                vec![Type::Char],
                Type::Int,
                BuiltinMethod::StringIndexOfChar,
            ),
            (
                "IndexOf",
                vec![Type::String],
                Type::Int,
                BuiltinMethod::StringIndexOfString,
            ),
            (
                "Substring",
                vec![Type::Int],
                Type::String,
                BuiltinMethod::StringSubstring,
            ),
            (
                "CharAt",
                vec![Type::Int],
                Type::Char,
                BuiltinMethod::StringCharAt,
            ),
            (
                "Equals",
                vec![Type::String],
                Type::Bool,
                BuiltinMethod::StringEquals,
            ),
        ];
        for (name, params, ret, builtin) in entries {
            self.string_methods
                .entry(name.to_string())
                .or_default()
                .push(builtin_method(name, params, ret, builtin));
        }
    }

    fn register_builtin_operators(&mut self) {
        use BuiltinOp::*;
        let int = || Type::Int;
        let boolean = || Type::Bool;
        let ch = || Type::Char;
        let string = || Type::String;

        let binary: [(&str, Type, Type, Type, BuiltinOp); 24] = [
            ("+", int(), int(), int(), IntAdd),
            ("-", int(), int(), int(), IntSub),
            ("*", int(), int(), int(), IntMul),
            ("/", int(), int(), int(), IntDiv),
            ("%", int(), int(), int(), IntRem),
            ("<", int(), int(), boolean(), IntLt),
            (">", int(), int(), boolean(), IntGt),
            ("<=", int(), int(), boolean(), IntLe),
            (">=", int(), int(), boolean(), IntGe),
            ("==", int(), int(), boolean(), IntEq),
            ("!=", int(), int(), boolean(), IntNe),
            ("==", boolean(), boolean(), boolean(), BoolEq),
            ("!=", boolean(), boolean(), boolean(), BoolNe),
            ("&&", boolean(), boolean(), boolean(), BoolAnd),
            ("||", boolean(), boolean(), boolean(), BoolOr),
            ("==", ch(), ch(), boolean(), CharEq),
            ("!=", ch(), ch(), boolean(), CharNe),
            ("<", ch(), ch(), boolean(), CharLt),
            (">", ch(), ch(), boolean(), CharGt),
            ("<=", ch(), ch(), boolean(), CharLe),
            (">=", ch(), ch(), boolean(), CharGe),
            ("+", string(), string(), string(), StrConcat),
            ("==", string(), string(), boolean(), StrEq),
            ("!=", string(), string(), boolean(), StrNe),
        ];
        for (symbol, lhs, rhs, ret, op) in binary {
            self.builtin_operators
                .entry(symbol.to_string())
                .or_default()
                .push(OperatorSig {
                    symbol: symbol.to_string(),
                    params: vec![lhs, rhs],
                    ret,
                    kind: OperatorKind::Builtin(op),
                });
        }

        let unary: [(&str, Type, Type, BuiltinOp); 2] = [
            ("-", int(), int(), IntNeg),
            ("!", boolean(), boolean(), BoolNot),
        ];
        for (symbol, operand, ret, op) in unary {
            self.builtin_operators
                .entry(symbol.to_string())
                .or_default()
                .push(OperatorSig {
                    symbol: symbol.to_string(),
                    params: vec![operand],
                    ret,
                    kind: OperatorKind::Builtin(op),
                });
        }
    }
}

fn builtin_method(name: &str, params: Vec<Type>, ret: Type, builtin: BuiltinMethod) -> MethodSig {
    MethodSig {
        name: name.to_string(),
        params,
        ret,
        is_static: false,
        visibility: Visibility::Public,
        kind: MethodKind::Builtin(builtin),
    }
}

/// Report one diagnostic with its source line attached.
pub(crate) fn report(
    errors: &mut CompileErrors,
    source: &SourceFile,
    code: ErrorCode,
    message: impl Into<String>,
    span: Span,
) {
    let source_line = source.line(span.start_line).unwrap_or("").to_string();
    errors.push_error(ShardError::new(
        source.name.clone(),
        code,
        message,
        span,
        source_line,
    ));
}
