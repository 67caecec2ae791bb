//! Integration tests for the Shard parser.

use shard_lexer::Lexer;
use shard_parser::Parser;
use shard_types::ast::*;
use shard_types::{ErrorCode, SourceFile};

/// Parse source into a Program (panics on lex or parse errors).
fn parse(source: &str) -> Program {
    let sf = SourceFile::new("test.shard", source);
    let lex = Lexer::new(&sf).lex();
    assert!(
        !lex.errors.has_errors(),
        "lex errors:\n{}",
        lex.errors
            .errors
            .iter()
            .map(|e| format!("  [{}] {}", e.code, e.message))
            .collect::<Vec<_>>()
            .join("\n")
    );
    let result = Parser::new(lex.tokens, &sf).parse();
    if result.errors.has_errors() {
        panic!(
            "parse errors:\n{}",
            result
                .errors
                .errors
                .iter()
                .map(|e| format!("  [{}] {}", e.code, e.message))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }
    result.program.expect("no program after successful parse")
}

/// Parse source expecting at least one error; returns the first code.
fn parse_err(source: &str) -> ErrorCode {
    let sf = SourceFile::new("test.shard", source);
    let lex = Lexer::new(&sf).lex();
    let result = Parser::new(lex.tokens, &sf).parse();
    assert!(result.errors.has_errors(), "expected parse errors");
    result.errors.errors[0].code
}

// ══════════════════════════════════════════════════════════════════════════════
// Declarations
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn empty_namespace() {
    let prog = parse("namespace Empty { }");
    assert_eq!(prog.namespaces.len(), 1);
    assert_eq!(prog.namespaces[0].name.name, "Empty");
    assert!(prog.namespaces[0].classes.is_empty());
}

#[test]
fn multiple_namespaces() {
    let prog = parse(
        r#"
namespace First { public class Class { } }
namespace Second { public class Class { } }
"#,
    );
    assert_eq!(prog.namespaces.len(), 2);
    assert_eq!(prog.namespaces[0].name.name, "First");
    assert_eq!(prog.namespaces[1].name.name, "Second");
}

#[test]
fn class_with_fields_and_methods() {
    let prog = parse(
        r#"
namespace T
{
    public class Fraction
    {
        private int numerator;
        public int A;

        public int GetNumerator()
        {
            return numerator;
        }
    }
}
"#,
    );
    let class = &prog.namespaces[0].classes[0];
    assert_eq!(class.name.name, "Fraction");
    assert_eq!(class.fields.len(), 2);
    assert_eq!(class.fields[0].visibility, Visibility::Private);
    assert_eq!(class.fields[1].visibility, Visibility::Public);
    assert_eq!(class.methods.len(), 1);
    assert_eq!(class.methods[0].name.name, "GetNumerator");
    assert!(!class.methods[0].is_static);
}

#[test]
fn static_main_method() {
    let prog = parse(
        r#"
namespace T
{
    public class M
    {
        public static void Main() { }
    }
}
"#,
    );
    let method = &prog.namespaces[0].classes[0].methods[0];
    assert!(method.is_static);
    assert_eq!(method.return_type.kind, TypeKind::Void);
    assert!(method.params.is_empty());
}

#[test]
fn field_with_initializer() {
    let prog = parse(
        r#"
namespace T
{
    public class M
    {
        public System.Console Console = new System.Console;
    }
}
"#,
    );
    let field = &prog.namespaces[0].classes[0].fields[0];
    assert_eq!(field.name.name, "Console");
    assert_eq!(field.ty.display_name(), "System.Console");
    assert!(matches!(
        field.init.as_ref().unwrap().kind,
        ExprKind::New { .. }
    ));
}

#[test]
fn operator_declaration() {
    let prog = parse(
        r#"
namespace T
{
    public class Foo
    {
        public static Foo operator+(Foo lhs, int rhs)
        {
            return lhs;
        }
    }
}
"#,
    );
    let op = &prog.namespaces[0].classes[0].operators[0];
    assert_eq!(op.symbol, OperatorSym::Add);
    assert_eq!(op.params.len(), 2);
    assert_eq!(op.params[0].ty.display_name(), "Foo");
    assert_eq!(op.params[1].ty.display_name(), "int");
    assert_eq!(op.return_type.display_name(), "Foo");
}

#[test]
fn comparison_operator_declarations() {
    let prog = parse(
        r#"
namespace T
{
    public class Foo
    {
        public static bool operator<=(Foo lhs, Foo rhs) { return false; }
        public static bool operator==(Foo lhs, Foo rhs) { return false; }
        public static bool operator!=(Foo lhs, Foo rhs) { return true; }
    }
}
"#,
    );
    let ops = &prog.namespaces[0].classes[0].operators;
    let syms: Vec<_> = ops.iter().map(|o| o.symbol).collect();
    assert_eq!(
        syms,
        vec![OperatorSym::Le, OperatorSym::Eq, OperatorSym::Ne]
    );
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

/// Helper: parse a single method body out of a wrapper program.
fn parse_body(body: &str) -> Vec<Stmt> {
    let source = format!(
        "namespace T {{ public class M {{ public static void Main() {{ {body} }} }} }}"
    );
    let prog = parse(&source);
    prog.namespaces[0].classes[0].methods[0].body.clone()
}

#[test]
fn var_decl_with_type_keyword() {
    let body = parse_body("int a1 = 0;");
    let Stmt::VarDecl(decl) = &body[0] else {
        panic!("expected var decl, got {:?}", body[0]);
    };
    assert_eq!(decl.ty.kind, TypeKind::Int);
    assert_eq!(decl.name.name, "a1");
}

#[test]
fn var_decl_with_array_type() {
    let body = parse_body("int[] a3 = new int[2];");
    let Stmt::VarDecl(decl) = &body[0] else {
        panic!("expected var decl");
    };
    assert_eq!(decl.ty.display_name(), "int[]");
    assert!(matches!(
        decl.init.as_ref().unwrap().kind,
        ExprKind::NewArray { .. }
    ));
}

#[test]
fn var_decl_with_inference() {
    let body = parse_body("var m = new M;");
    let Stmt::VarDecl(decl) = &body[0] else {
        panic!("expected var decl");
    };
    assert_eq!(decl.ty.kind, TypeKind::Var);
}

#[test]
fn var_decl_with_class_type_vs_expression_stmt() {
    // `Foo f = ...` is a declaration; `foo.Bar();` is an expression.
    let body = parse_body("First.Class c = new First.Class; c.Print();");
    assert!(matches!(&body[0], Stmt::VarDecl(_)));
    let Stmt::Expr(stmt) = &body[1] else {
        panic!("expected expression statement");
    };
    assert!(matches!(stmt.expr.kind, ExprKind::Call { .. }));
}

#[test]
fn if_without_braces() {
    let body = parse_body("if (n == 0) return 0;");
    let Stmt::If(if_stmt) = &body[0] else {
        panic!("expected if");
    };
    assert!(matches!(if_stmt.then_branch, Stmt::Return(_)));
    assert!(if_stmt.else_branch.is_none());
}

#[test]
fn if_else_chain() {
    let body = parse_body("if (a) { } else if (b) { } else { }");
    let Stmt::If(outer) = &body[0] else {
        panic!("expected if");
    };
    let Some(Stmt::If(inner)) = &outer.else_branch else {
        panic!("expected else-if");
    };
    assert!(inner.else_branch.is_some());
}

#[test]
fn for_loop_with_prefix_increment() {
    let body = parse_body("for (int i = 0; i < 10; ++i) { }");
    let Stmt::For(for_stmt) = &body[0] else {
        panic!("expected for");
    };
    assert!(matches!(for_stmt.init, Some(ForInit::VarDecl(_))));
    assert!(for_stmt.condition.is_some());
    // ++i desugars to i = i + 1
    let step = for_stmt.step.as_ref().unwrap();
    let ExprKind::Assign { target, value } = &step.kind else {
        panic!("expected desugared assignment, got {:?}", step.kind);
    };
    assert!(matches!(target.kind, ExprKind::Ident(_)));
    assert!(matches!(
        value.kind,
        ExprKind::Binary {
            op: BinaryOp::Add,
            ..
        }
    ));
}

#[test]
fn postfix_decrement_desugars() {
    let body = parse_body("int i = 3; i--;");
    let Stmt::Expr(stmt) = &body[1] else {
        panic!("expected expression statement");
    };
    assert!(matches!(
        stmt.expr.kind,
        ExprKind::Assign { .. }
    ));
}

#[test]
fn do_while_statement() {
    let body = parse_body("do { } while (true);");
    assert!(matches!(&body[0], Stmt::DoWhile(_)));
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

/// Helper: parse one expression out of an expression statement.
fn parse_expr(expr: &str) -> Expr {
    let body = parse_body(&format!("var probe = {expr};"));
    let Stmt::VarDecl(decl) = &body[0] else {
        panic!("expected var decl");
    };
    decl.init.clone().expect("initializer")
}

#[test]
fn precedence_mul_over_add() {
    let expr = parse_expr("1 + 2 * 3");
    let ExprKind::Binary { op, rhs, .. } = &expr.kind else {
        panic!("expected binary");
    };
    assert_eq!(*op, BinaryOp::Add);
    assert!(matches!(
        rhs.kind,
        ExprKind::Binary {
            op: BinaryOp::Mul,
            ..
        }
    ));
}

#[test]
fn precedence_comparison_over_logic() {
    let expr = parse_expr("a < b && c == d");
    let ExprKind::Binary { op, lhs, rhs } = &expr.kind else {
        panic!("expected binary");
    };
    assert_eq!(*op, BinaryOp::And);
    assert!(matches!(
        lhs.kind,
        ExprKind::Binary {
            op: BinaryOp::Lt,
            ..
        }
    ));
    assert!(matches!(
        rhs.kind,
        ExprKind::Binary {
            op: BinaryOp::Eq,
            ..
        }
    ));
}

#[test]
fn method_chain_on_parenthesized_new() {
    let expr = parse_expr("(new Fraction).SetNumerator(1).SetDenominator(2)");
    let ExprKind::Call { recv, name, .. } = &expr.kind else {
        panic!("expected call");
    };
    assert_eq!(name.name, "SetDenominator");
    let ExprKind::Call { recv: inner, .. } = &recv.as_ref().unwrap().kind else {
        panic!("expected inner call");
    };
    assert!(matches!(
        inner.as_ref().unwrap().kind,
        ExprKind::Paren(_)
    ));
}

#[test]
fn implicit_this_call() {
    let expr = parse_expr("Fib(n - 1) + Fib(n - 2)");
    let ExprKind::Binary { lhs, .. } = &expr.kind else {
        panic!("expected binary");
    };
    let ExprKind::Call { recv, name, args } = &lhs.kind else {
        panic!("expected call");
    };
    assert!(recv.is_none());
    assert_eq!(name.name, "Fib");
    assert_eq!(args.len(), 1);
}

#[test]
fn array_index_chain() {
    let expr = parse_expr("array[inner + 1]");
    assert!(matches!(expr.kind, ExprKind::Index { .. }));
}

#[test]
fn field_access_and_length() {
    let expr = parse_expr("array.Length");
    let ExprKind::Field { name, .. } = &expr.kind else {
        panic!("expected field access");
    };
    assert_eq!(name.name, "Length");
}

#[test]
fn unary_minus_on_field() {
    let expr = parse_expr("-rhs.numerator");
    let ExprKind::Unary { op, operand } = &expr.kind else {
        panic!("expected unary");
    };
    assert_eq!(*op, UnaryOp::Neg);
    assert!(matches!(operand.kind, ExprKind::Field { .. }));
}

#[test]
fn assignment_is_right_associative() {
    let expr = parse_expr("a = b = 1");
    let ExprKind::Assign { value, .. } = &expr.kind else {
        panic!("expected assignment");
    };
    assert!(matches!(value.kind, ExprKind::Assign { .. }));
}

#[test]
fn node_ids_are_unique() {
    let prog = parse(
        r#"
namespace T
{
    public class M
    {
        public static void Main()
        {
            int i = 0;
            for (int j = 0; j < 3; ++j) i = i + j;
        }
    }
}
"#,
    );
    let mut ids = Vec::new();
    collect_ids_program(&prog, &mut ids);
    let mut deduped = ids.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(ids.len(), deduped.len(), "duplicate NodeIds found");
}

fn collect_ids_program(prog: &Program, out: &mut Vec<NodeId>) {
    for ns in &prog.namespaces {
        for class in &ns.classes {
            for field in &class.fields {
                if let Some(init) = &field.init {
                    collect_ids_expr(init, out);
                }
            }
            for method in &class.methods {
                for stmt in &method.body {
                    collect_ids_stmt(stmt, out);
                }
            }
            for op in &class.operators {
                for stmt in &op.body {
                    collect_ids_stmt(stmt, out);
                }
            }
        }
    }
}

fn collect_ids_stmt(stmt: &Stmt, out: &mut Vec<NodeId>) {
    match stmt {
        Stmt::VarDecl(d) => {
            if let Some(init) = &d.init {
                collect_ids_expr(init, out);
            }
        }
        Stmt::Expr(s) => collect_ids_expr(&s.expr, out),
        Stmt::If(s) => {
            collect_ids_expr(&s.condition, out);
            collect_ids_stmt(&s.then_branch, out);
            if let Some(e) = &s.else_branch {
                collect_ids_stmt(e, out);
            }
        }
        Stmt::While(s) => {
            collect_ids_expr(&s.condition, out);
            collect_ids_stmt(&s.body, out);
        }
        Stmt::DoWhile(s) => {
            collect_ids_stmt(&s.body, out);
            collect_ids_expr(&s.condition, out);
        }
        Stmt::For(s) => {
            match &s.init {
                Some(ForInit::VarDecl(d)) => {
                    if let Some(init) = &d.init {
                        collect_ids_expr(init, out);
                    }
                }
                Some(ForInit::Expr(e)) => collect_ids_expr(e, out),
                None => {}
            }
            if let Some(c) = &s.condition {
                collect_ids_expr(c, out);
            }
            if let Some(st) = &s.step {
                collect_ids_expr(st, out);
            }
            collect_ids_stmt(&s.body, out);
        }
        Stmt::Return(s) => {
            if let Some(v) = &s.value {
                collect_ids_expr(v, out);
            }
        }
        Stmt::Block(s) => {
            for stmt in &s.stmts {
                collect_ids_stmt(stmt, out);
            }
        }
        Stmt::Empty(_) => {}
    }
}

fn collect_ids_expr(expr: &Expr, out: &mut Vec<NodeId>) {
    out.push(expr.id);
    match &expr.kind {
        ExprKind::Field { recv, .. } => collect_ids_expr(recv, out),
        ExprKind::Index { recv, index } => {
            collect_ids_expr(recv, out);
            collect_ids_expr(index, out);
        }
        ExprKind::Call { recv, args, .. } => {
            if let Some(r) = recv {
                collect_ids_expr(r, out);
            }
            for a in args {
                collect_ids_expr(a, out);
            }
        }
        ExprKind::NewArray { len, .. } => collect_ids_expr(len, out),
        ExprKind::Unary { operand, .. } => collect_ids_expr(operand, out),
        ExprKind::Binary { lhs, rhs, .. } => {
            collect_ids_expr(lhs, out);
            collect_ids_expr(rhs, out);
        }
        ExprKind::Assign { target, value } => {
            collect_ids_expr(target, out);
            collect_ids_expr(value, out);
        }
        ExprKind::Paren(inner) => collect_ids_expr(inner, out),
        _ => {}
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Errors
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn missing_semicolon_is_reported() {
    let code = parse_err(
        "namespace T { public class M { public static void Main() { int x = 1 } } }",
    );
    assert_eq!(code, ErrorCode::UNEXPECTED_TOKEN);
}

#[test]
fn top_level_junk_is_reported() {
    let code = parse_err("class Floating { }");
    assert_eq!(code, ErrorCode::UNEXPECTED_TOKEN);
}

#[test]
fn non_static_operator_is_reported() {
    let code = parse_err(
        r#"
namespace T
{
    public class Foo
    {
        public Foo operator+(Foo lhs, Foo rhs) { return lhs; }
    }
}
"#,
    );
    assert_eq!(code, ErrorCode::UNEXPECTED_TOKEN);
}

#[test]
fn parsing_is_deterministic() {
    let source = r#"
namespace Sort
{
    public class M
    {
        public void SortArray(int[] array)
        {
            for (int outer = 0; outer < array.Length; ++outer)
            {
                for (int inner = 0; inner < array.Length - 1; ++inner)
                {
                    if (array[inner] < array[inner + 1])
                    {
                        int temp = array[inner];
                        array[inner] = array[inner + 1];
                        array[inner + 1] = temp;
                    }
                }
            }
        }
    }
}
"#;
    let first = parse(source);
    for _ in 0..20 {
        assert_eq!(first, parse(source));
    }
}
