//! Integration tests for the binding pass: declaration table build,
//! overload resolution at real call sites, and the diagnostics the
//! resolver produces.

use shard_lexer::Lexer;
use shard_parser::Parser;
use shard_sema::{analyze, Analysis};
use shard_types::{CompileErrors, ErrorCode, SourceFile};

fn parse(source: &str) -> (shard_types::ast::Program, SourceFile) {
    let sf = SourceFile::new("test.shard", source);
    let lex = Lexer::new(&sf).lex();
    assert!(!lex.errors.has_errors(), "lex errors: {:?}", lex.errors.errors);
    let result = Parser::new(lex.tokens, &sf).parse();
    assert!(
        !result.errors.has_errors(),
        "parse errors: {:?}",
        result.errors.errors
    );
    (result.program.expect("program"), sf)
}

fn analyze_ok(source: &str) -> Analysis {
    let (program, sf) = parse(source);
    match analyze(&program, &sf) {
        Ok(analysis) => analysis,
        Err(errors) => panic!(
            "unexpected analysis errors:\n{}",
            errors
                .errors
                .iter()
                .map(|e| format!("  [{}] {}", e.code, e.message))
                .collect::<Vec<_>>()
                .join("\n")
        ),
    }
}

fn analyze_err(source: &str) -> CompileErrors {
    let (program, sf) = parse(source);
    match analyze(&program, &sf) {
        Ok(_) => panic!("expected analysis errors"),
        Err(errors) => errors,
    }
}

fn codes(errors: &CompileErrors) -> Vec<ErrorCode> {
    errors.errors.iter().map(|e| e.code).collect()
}

// ══════════════════════════════════════════════════════════════════════════════
// Wellformed programs
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn minimal_program_analyzes() {
    let analysis = analyze_ok(
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
    assert!(analysis.table.class("T.M").is_some());
}

#[test]
fn method_overloads_bind_by_argument_type() {
    // The function-overload sample: three overloads, three call sites,
    // each bound to a different declaration.
    let analysis = analyze_ok(
        r#"
namespace FunctionOverload
{
    public class M
    {
        public void Method(int a) { }
        public void Method(int[] a) { }
        public void Method(M a) { }
        public static void Main()
        {
            var m = new M;
            m.Method(0);
            m.Method(new int[1]);
            m.Method(new M);
        }
    }
}
"#,
    );
    // Three distinct Method bindings must exist.
    let method_bindings: Vec<_> = analysis
        .bindings
        .values()
        .filter_map(|b| match b {
            shard_sema::Binding::Method(sig) if sig.name == "Method" => Some(sig.params.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(method_bindings.len(), 3);
    let mut unique = method_bindings.clone();
    unique.sort_by_key(|p| format!("{p:?}"));
    unique.dedup();
    assert_eq!(unique.len(), 3, "each call site bound a different overload");
}

#[test]
fn operator_overloads_resolve_per_operand_tuple() {
    let analysis = analyze_ok(
        r#"
namespace OperatorOverload
{
    public class Foo
    {
        public static Foo operator+(Foo lhs, Foo rhs) { return lhs; }
        public static Foo operator+(Foo lhs, int rhs) { return lhs; }
        public static Foo operator+(int lhs, Foo rhs) { return rhs; }
    }
    public class M
    {
        public static void Main()
        {
            var a = new Foo;
            var b = new Foo;
            var c = a + b;
            var d = a + 1;
            var e = 1 + b;
        }
    }
}
"#,
    );
    let operator_bindings: Vec<_> = analysis
        .bindings
        .values()
        .filter_map(|b| match b {
            shard_sema::Binding::Operator(sig) if sig.symbol == "+" => Some(sig.params.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(operator_bindings.len(), 3);
}

#[test]
fn console_and_string_builtins_bind() {
    analyze_ok(
        r#"
namespace T
{
    public class M
    {
        public static void Main()
        {
            var console = new System.Console;
            string str = "Test string";
            console.Write("Length: ");
            console.WriteLine(str.Length);
            console.WriteLine(str.IndexOf('g'));
            console.WriteLine(str.IndexOf("str"));
            console.WriteLine(str.Substring(5));
            console.WriteLine(str.CharAt(5));
            console.WriteLine(str.Equals("Test string"));
            console.WriteLine(str == str);
            console.WriteLine(str + str);
            console.WriteLine();
        }
    }
}
"#,
    );
}

#[test]
fn default_class_equality_always_resolves() {
    // No user `==` declared; the table pre-registers identity equality.
    analyze_ok(
        r#"
namespace T
{
    public class Foo { }
    public class M
    {
        public static void Main()
        {
            var a = new Foo;
            var b = new Foo;
            bool same = a == b;
            bool diff = a != b;
            bool n = a == null;
        }
    }
}
"#,
    );
}

// ══════════════════════════════════════════════════════════════════════════════
// Resolution failures
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn symmetric_operator_independence() {
    // operator+(Foo, int) declared alone: `x + 1` resolves, `1 + x` fails.
    let errors = analyze_err(
        r#"
namespace T
{
    public class Foo
    {
        public static Foo operator+(Foo lhs, int rhs) { return lhs; }
    }
    public class M
    {
        public static void Main()
        {
            var x = new Foo;
            var ok = x + 1;
            var bad = 1 + x;
        }
    }
}
"#,
    );
    assert_eq!(codes(&errors), vec![ErrorCode::NO_APPLICABLE_OVERLOAD]);
    assert!(errors.errors[0].message.contains('+'));
}

#[test]
fn no_applicable_overload_reports_argument_types() {
    let errors = analyze_err(
        r#"
namespace T
{
    public class M
    {
        public void Method(int a) { }
        public static void Main()
        {
            var m = new M;
            m.Method(true);
        }
    }
}
"#,
    );
    assert_eq!(codes(&errors), vec![ErrorCode::NO_APPLICABLE_OVERLOAD]);
    assert!(errors.errors[0].message.contains("(bool)"));
}

#[test]
fn null_between_two_reference_overloads_is_ambiguous() {
    let errors = analyze_err(
        r#"
namespace T
{
    public class Foo { }
    public class M
    {
        public void Method(Foo a) { }
        public void Method(int[] a) { }
        public static void Main()
        {
            var m = new M;
            m.Method(null);
        }
    }
}
"#,
    );
    assert_eq!(codes(&errors), vec![ErrorCode::AMBIGUOUS_OVERLOAD]);
}

#[test]
fn resolution_failures_are_local_to_their_call_site() {
    // The bad call must not stop the later good call from being reported
    // bound; only one diagnostic comes out.
    let errors = analyze_err(
        r#"
namespace T
{
    public class M
    {
        public void Method(int a) { }
        public static void Main()
        {
            var m = new M;
            m.Method(true);
            m.Method(1);
        }
    }
}
"#,
    );
    assert_eq!(codes(&errors), vec![ErrorCode::NO_APPLICABLE_OVERLOAD]);
}

#[test]
fn comparing_class_and_int_fails() {
    let errors = analyze_err(
        r#"
namespace T
{
    public class Foo { }
    public class M
    {
        public static void Main()
        {
            var a = new Foo;
            bool bad = a == 1;
        }
    }
}
"#,
    );
    assert_eq!(codes(&errors), vec![ErrorCode::NO_APPLICABLE_OVERLOAD]);
}

// ══════════════════════════════════════════════════════════════════════════════
// Declaration errors
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn duplicate_method_tuple_is_rejected() {
    let errors = analyze_err(
        r#"
namespace T
{
    public class M
    {
        public void Method(int a) { }
        public int Method(int b) { return b; }
        public static void Main() { }
    }
}
"#,
    );
    assert!(codes(&errors).contains(&ErrorCode::DUPLICATE_OVERLOAD));
}

#[test]
fn duplicate_operator_tuple_is_rejected() {
    let errors = analyze_err(
        r#"
namespace T
{
    public class Foo
    {
        public static Foo operator+(Foo lhs, Foo rhs) { return lhs; }
        public static Foo operator+(Foo a, Foo b) { return b; }
    }
    public class M
    {
        public static void Main() { }
    }
}
"#,
    );
    assert!(codes(&errors).contains(&ErrorCode::DUPLICATE_OVERLOAD));
}

#[test]
fn redefining_a_builtin_operator_is_rejected() {
    let errors = analyze_err(
        r#"
namespace T
{
    public class Foo
    {
        public static int operator+(int lhs, int rhs) { return 0; }
    }
    public class M
    {
        public static void Main() { }
    }
}
"#,
    );
    assert!(codes(&errors).contains(&ErrorCode::DUPLICATE_OVERLOAD));
}

#[test]
fn duplicate_field_is_rejected() {
    let errors = analyze_err(
        r#"
namespace T
{
    public class Foo
    {
        public int A;
        private int A;
    }
    public class M
    {
        public static void Main() { }
    }
}
"#,
    );
    assert!(codes(&errors).contains(&ErrorCode::DUPLICATE_FIELD));
}

#[test]
fn missing_entry_point_is_rejected() {
    let errors = analyze_err(
        r#"
namespace T
{
    public class M
    {
        public void NotMain() { }
    }
}
"#,
    );
    assert!(codes(&errors).contains(&ErrorCode::NO_ENTRY_POINT));
}

#[test]
fn two_entry_points_are_rejected() {
    let errors = analyze_err(
        r#"
namespace T
{
    public class A
    {
        public static void Main() { }
    }
    public class B
    {
        public static void Main() { }
    }
}
"#,
    );
    assert!(codes(&errors).contains(&ErrorCode::MULTIPLE_ENTRY_POINTS));
}

// ══════════════════════════════════════════════════════════════════════════════
// Type & access errors
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn assigning_string_length_is_a_bind_time_error() {
    let errors = analyze_err(
        r#"
namespace T
{
    public class M
    {
        public static void Main()
        {
            string str = "Test string";
            str.Length = 10;
        }
    }
}
"#,
    );
    assert_eq!(codes(&errors), vec![ErrorCode::READONLY_PROPERTY]);
}

#[test]
fn assigning_array_length_is_a_bind_time_error() {
    let errors = analyze_err(
        r#"
namespace T
{
    public class M
    {
        public static void Main()
        {
            int[] a = new int[3];
            a.Length = 10;
        }
    }
}
"#,
    );
    assert_eq!(codes(&errors), vec![ErrorCode::READONLY_PROPERTY]);
}

#[test]
fn reading_length_is_fine() {
    analyze_ok(
        r#"
namespace T
{
    public class M
    {
        public static void Main()
        {
            int[] a = new int[3];
            int n = a.Length;
        }
    }
}
"#,
    );
}

#[test]
fn private_field_access_from_another_class_is_rejected() {
    let errors = analyze_err(
        r#"
namespace T
{
    public class Fraction
    {
        private int numerator;
    }
    public class M
    {
        public static void Main()
        {
            var f = new Fraction;
            int n = f.numerator;
        }
    }
}
"#,
    );
    assert_eq!(codes(&errors), vec![ErrorCode::PRIVATE_MEMBER_ACCESS]);
}

#[test]
fn private_field_access_within_the_class_is_fine() {
    // Operators may read private fields of their own class through any
    // instance, as the fraction sample does.
    analyze_ok(
        r#"
namespace T
{
    public class Fraction
    {
        private int numerator;
        public Fraction SetNumerator(int value)
        {
            Fraction fraction = new Fraction;
            fraction.numerator = value;
            return fraction;
        }
        public static Fraction operator+(Fraction lhs, Fraction rhs)
        {
            return lhs.SetNumerator(lhs.numerator + rhs.numerator);
        }
    }
    public class M
    {
        public static void Main() { }
    }
}
"#,
    );
}

#[test]
fn instance_field_in_static_method_is_rejected() {
    let errors = analyze_err(
        r#"
namespace T
{
    public class M
    {
        public int counter;
        public static void Main()
        {
            counter = 1;
        }
    }
}
"#,
    );
    assert_eq!(codes(&errors), vec![ErrorCode::INSTANCE_MEMBER_IN_STATIC]);
}

#[test]
fn condition_must_be_bool() {
    let errors = analyze_err(
        r#"
namespace T
{
    public class M
    {
        public static void Main()
        {
            if (1) { }
        }
    }
}
"#,
    );
    assert_eq!(codes(&errors), vec![ErrorCode::TYPE_MISMATCH]);
}

#[test]
fn var_requires_an_inferable_initializer() {
    let errors = analyze_err(
        r#"
namespace T
{
    public class M
    {
        public static void Main()
        {
            var x = null;
        }
    }
}
"#,
    );
    assert_eq!(codes(&errors), vec![ErrorCode::CANNOT_INFER_VAR]);
}

#[test]
fn undefined_name_is_reported() {
    let errors = analyze_err(
        r#"
namespace T
{
    public class M
    {
        public static void Main()
        {
            int x = missing + 1;
        }
    }
}
"#,
    );
    assert_eq!(codes(&errors), vec![ErrorCode::UNDEFINED_VARIABLE]);
}

#[test]
fn unknown_class_in_new_is_reported() {
    let errors = analyze_err(
        r#"
namespace T
{
    public class M
    {
        public static void Main()
        {
            var x = new Missing;
        }
    }
}
"#,
    );
    assert!(codes(&errors).contains(&ErrorCode::UNKNOWN_TYPE));
}

#[test]
fn cross_namespace_class_reference_resolves() {
    analyze_ok(
        r#"
namespace Namespaces
{
    public class M
    {
        public static void Main()
        {
            var first = new First.Class;
            first.Print();
        }
    }
}
namespace First
{
    public class Class
    {
        public void Print() { }
    }
}
"#,
    );
}

// ══════════════════════════════════════════════════════════════════════════════
// Determinism
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn binding_is_deterministic() {
    let source = r#"
namespace T
{
    public class M
    {
        public void Method(int a) { }
        public void Method(int[] a) { }
        public static void Main()
        {
            var m = new M;
            m.Method(0);
            m.Method(new int[1]);
        }
    }
}
"#;
    let first = analyze_ok(source);
    for _ in 0..20 {
        let next = analyze_ok(source);
        assert_eq!(first.bindings, next.bindings);
        assert_eq!(first.entry, next.entry);
    }
}
