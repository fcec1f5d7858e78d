//! Unit tests for evaluation: object construction, dispatch, control flow
//! and the built-in methods.

use std::sync::Arc;

use crate::{
    errors::errors::{Error, ErrorImpl},
    lexer::lexer::tokenize,
    parser::parser::parse,
    registry::inheritance::build_registry,
    runtime::value::Value,
    type_checker::type_checker::type_check,
    ReturnValue, RunOptions,
};

use super::interpreter::Interpreter;

fn run_with(source: &str, input: &str, options: &RunOptions) -> (Result<Value, Error>, String) {
    let tokens = tokenize(source.to_string(), Some("test.cl".to_string())).unwrap();
    let program = parse(tokens, Arc::new("test.cl".to_string())).unwrap();

    let (registry, errors) = build_registry(&program);
    assert!(errors.is_empty(), "{:?}", errors);
    let diagnostics = type_check(&registry);
    assert!(!diagnostics.iter().any(Error::is_fatal), "{:?}", diagnostics);

    let mut input = input.as_bytes();
    let mut interpreter = Interpreter::new(&registry, options, &mut input).unwrap();
    let result = interpreter.run();
    (result, interpreter.into_output())
}

fn run(source: &str) -> Result<Value, Error> {
    run_with(source, "", &RunOptions::default()).0
}

/// Runs `body` as `main` of a Main inheriting IO, next to `classes`.
fn main_value(classes: &str, return_type: &str, body: &str) -> Result<Value, Error> {
    run(&format!(
        "{} class Main inherits IO {{ main(): {} {{ {} }}; }};",
        classes, return_type, body
    ))
}

fn value(result: Result<Value, Error>) -> ReturnValue {
    match result {
        Ok(value) => ReturnValue::from(&value),
        Err(error) => panic!("run failed: {}", error),
    }
}

fn error_name(result: Result<Value, Error>) -> String {
    match result {
        Ok(value) => panic!("expected an error, got {}", value),
        Err(error) => error.get_error_name().to_string(),
    }
}

fn string(value: &str) -> ReturnValue {
    ReturnValue::Str(value.to_string())
}

const ANIMALS: &str = "
    class Animal { speak(): String { \"...\" }; kind(): String { speak() }; };
    class Dog inherits Animal { speak(): String { \"woof\" }; };
    class Puppy inherits Dog { speak(): String { \"yip\" }; };
";

#[test]
fn test_arithmetic() {
    assert_eq!(value(main_value("", "Int", "1 + 2 * 3 - 4")), ReturnValue::Int(3));
    assert_eq!(value(main_value("", "Int", "~7 / 2")), ReturnValue::Int(-3));
    assert_eq!(value(main_value("", "Int", "(1 + 2) * 3")), ReturnValue::Int(9));
}

#[test]
fn test_arithmetic_wraps_on_overflow() {
    assert_eq!(
        value(main_value("", "Int", "9223372036854775807 + 1")),
        ReturnValue::Int(i64::MIN)
    );
}

#[test]
fn test_division_by_zero() {
    assert_eq!(error_name(main_value("", "Int", "10 / 0")), "DivisionByZero");
}

#[test]
fn test_comparisons_and_equality() {
    assert_eq!(value(main_value("", "Bool", "1 < 2")), ReturnValue::Bool(true));
    assert_eq!(value(main_value("", "Bool", "2 <= 2")), ReturnValue::Bool(true));
    assert_eq!(value(main_value("", "Bool", "not 2 = 2")), ReturnValue::Bool(false));
    assert_eq!(value(main_value("", "Bool", "\"a\" = \"a\"")), ReturnValue::Bool(true));
    assert_eq!(
        value(main_value("class A {};", "Bool", "new A = new A")),
        ReturnValue::Bool(false)
    );
    assert_eq!(
        value(main_value("class A {};", "Bool", "let a: A <- new A in a = a")),
        ReturnValue::Bool(true)
    );
    assert_eq!(
        value(main_value("class A {};", "Bool", "let a: A, b: A in a = b")),
        ReturnValue::Bool(true)
    );
}

#[test]
fn test_object_and_io_are_shared_instances() {
    assert_eq!(value(main_value("", "Bool", "new IO = new IO")), ReturnValue::Bool(true));
    assert_eq!(
        value(main_value("", "Bool", "new Object = new Object")),
        ReturnValue::Bool(true)
    );
}

#[test]
fn test_new_primitives_are_defaults() {
    assert_eq!(value(main_value("", "Int", "new Int")), ReturnValue::Int(0));
    assert_eq!(value(main_value("", "String", "new String")), string(""));
    assert_eq!(value(main_value("", "Bool", "new Bool")), ReturnValue::Bool(false));
}

#[test]
fn test_attributes_default_before_initializers_run() {
    assert_eq!(
        value(run("class Main { a: Int <- b + 1; b: Int <- 5; main(): Int { a }; };")),
        ReturnValue::Int(1)
    );
    assert_eq!(
        value(run("class Main { x: Int <- x + 1; main(): Int { x }; };")),
        ReturnValue::Int(1)
    );
}

#[test]
fn test_initializers_run_root_to_leaf() {
    let source = "
        class Base { p: Int <- 1; };
        class Main inherits Base { q: Int <- p + 1; main(): Int { p * 10 + q }; };
    ";
    assert_eq!(value(run(source)), ReturnValue::Int(12));
}

#[test]
fn test_dynamic_dispatch_uses_runtime_class() {
    assert_eq!(
        value(main_value(ANIMALS, "String", "let a: Animal <- new Puppy in a.kind()")),
        string("yip")
    );
}

#[test]
fn test_static_dispatch_uses_named_class() {
    assert_eq!(
        value(main_value(ANIMALS, "String", "(new Puppy)@Dog.speak()")),
        string("woof")
    );
    assert_eq!(
        value(main_value(ANIMALS, "String", "(new Puppy)@Animal.speak()")),
        string("...")
    );
}

#[test]
fn test_self_type_follows_receiver() {
    let classes = "
        class A { make(): SELF_TYPE { new SELF_TYPE }; me(): SELF_TYPE { self }; };
        class B inherits A {};
    ";
    assert_eq!(value(main_value(classes, "String", "(new B).make().type_name()")), string("B"));
    assert_eq!(value(main_value(classes, "String", "(new B)@A.me().type_name()")), string("B"));
}

#[test]
fn test_dispatch_on_void() {
    let result = main_value("class A {};", "String", "let a: A in a.type_name()");
    assert_eq!(
        result.unwrap_err().get_kind(),
        &ErrorImpl::DispatchOnVoid {
            method: "type_name".to_string()
        }
    );
}

#[test]
fn test_bare_name_calls_method_on_self() {
    assert_eq!(
        value(run("class Main { one(): Int { 1 }; main(): Int { one + one }; };")),
        ReturnValue::Int(2)
    );
}

#[test]
fn test_let_and_loop_update_locals() {
    let body = "let i: Int <- 0, total: Int in { while i < 5 loop { i <- i + 1; total <- total + i; } pool; total; }";
    assert_eq!(value(main_value("", "Int", body)), ReturnValue::Int(15));
}

#[test]
fn test_let_initializer_sees_earlier_bindings() {
    assert_eq!(
        value(main_value("", "Int", "let a: Int <- 2, b: Int <- a * 3 in b")),
        ReturnValue::Int(6)
    );
    assert_eq!(
        value(main_value("", "Int", "let a: Int <- 2 in let a: Int <- a + 1 in a")),
        ReturnValue::Int(3)
    );
}

#[test]
fn test_formals_can_be_assigned() {
    let source = "class Main { bump(n: Int): Int { { n <- n + 1; n; } }; main(): Int { bump(4) }; };";
    assert_eq!(value(run(source)), ReturnValue::Int(5));
}

#[test]
fn test_while_evaluates_to_void() {
    assert_eq!(value(main_value("", "Object", "while false loop 1 pool")), ReturnValue::Void);
}

#[test]
fn test_case_picks_most_specific_branch() {
    let classes = "class A {}; class B inherits A {}; class D inherits B {};";
    let body = "case new D of a: A => \"A\"; o: Object => \"O\"; b: B => \"B\"; esac";
    assert_eq!(value(main_value(classes, "String", body)), string("B"));

    assert_eq!(
        value(main_value("", "Int", "case 3 of s: String => 0; i: Int => i; esac")),
        ReturnValue::Int(3)
    );
}

#[test]
fn test_case_without_matching_branch() {
    let classes = "class A {}; class B inherits A {};";
    let result = main_value(classes, "Int", "case new A of b: B => 1; esac");
    assert_eq!(
        result.unwrap_err().get_kind(),
        &ErrorImpl::NoMatchingBranch {
            class: "A".to_string()
        }
    );
}

#[test]
fn test_case_on_void() {
    let result = main_value("class A {};", "Int", "let a: A in case a of x: A => 1; esac");
    assert_eq!(error_name(result), "CaseOnVoid");
}

#[test]
fn test_isvoid() {
    assert_eq!(
        value(main_value("class A {};", "Bool", "let a: A in isvoid a")),
        ReturnValue::Bool(true)
    );
    assert_eq!(value(main_value("", "Bool", "isvoid 0")), ReturnValue::Bool(false));
}

#[test]
fn test_copy_is_shallow() {
    let classes = "class P { x: Int <- 1; set(v: Int): SELF_TYPE { { x <- v; self; } }; get(): Int { x }; };";
    let body = "let a: P <- new P, b: P <- a.copy() in { a.set(5); b.get() * 10 + a.get(); }";
    assert_eq!(value(main_value(classes, "Int", body)), ReturnValue::Int(15));
}

#[test]
fn test_output_is_captured() {
    let (result, output) = run_with(
        "class Main inherits IO { main(): Object { out_string(\"a\").out_int(42).out_string(\"\\n\") }; };",
        "",
        &RunOptions::default(),
    );
    assert_eq!(value(result), ReturnValue::Object { class: "Main".to_string() });
    assert_eq!(output, "a42\n");
}

#[test]
fn test_input_builtins() {
    let source = "class Main inherits IO { main(): Object { {
        out_string(in_string());
        out_int(in_int());
        out_int(in_int());
        out_string(in_string());
        out_string(\"|\");
    } }; };";
    let (result, output) = run_with(source, "hello\n42\nabc\n", &RunOptions::default());

    assert!(result.is_ok());
    assert_eq!(output, "hello420|");
}

#[test]
fn test_string_builtins() {
    assert_eq!(value(main_value("", "Int", "\"hello\".length()")), ReturnValue::Int(5));
    assert_eq!(
        value(main_value("", "String", "\"foo\".concat(\"bar\")")),
        string("foobar")
    );
    assert_eq!(value(main_value("", "String", "\"hello\".substr(1, 3)")), string("ell"));
    assert_eq!(value(main_value("", "String", "\"hello\".substr(5, 0)")), string(""));
    assert_eq!(value(main_value("", "String", "3.type_name()")), string("Int"));
}

#[test]
fn test_substr_out_of_range() {
    let result = main_value("", "String", "\"hello\".substr(0, 10)");
    assert_eq!(
        result.unwrap_err().get_kind(),
        &ErrorImpl::SubstringOutOfRange {
            start: 0,
            length: 10,
            size: 5
        }
    );
    assert_eq!(
        error_name(main_value("", "String", "\"hello\".substr(~1, 2)")),
        "SubstringOutOfRange"
    );
}

#[test]
fn test_abort_keeps_earlier_output() {
    let (result, output) = run_with(
        "class Main inherits IO { main(): Object { { out_string(\"before\"); abort(); out_string(\"after\"); } }; };",
        "",
        &RunOptions::default(),
    );

    assert_eq!(
        result.unwrap_err().get_kind(),
        &ErrorImpl::Abort {
            class: "Main".to_string()
        }
    );
    assert_eq!(output, "before");
}

#[test]
fn test_circular_initialization_is_rejected() {
    let classes = "class A { b: B <- new B; }; class B { a: A <- new A; };";
    let result = main_value(classes, "Object", "new A");
    assert_eq!(
        result.unwrap_err().get_kind(),
        &ErrorImpl::CircularInitialization {
            class: "A".to_string()
        }
    );
}

#[test]
fn test_construction_depth_is_bounded() {
    let source = "
        class A0 { next: A1 <- new A1; };
        class A1 { next: A2 <- new A2; };
        class A2 { n: Int <- 0; };
        class Main { main(): Object { new A0 }; };
    ";
    let options = RunOptions {
        max_construction_depth: 2,
        ..RunOptions::default()
    };

    let (result, _) = run_with(source, "", &options);
    assert_eq!(
        result.unwrap_err().get_kind(),
        &ErrorImpl::ConstructionDepthExceeded { limit: 2 }
    );
}

#[test]
fn test_call_depth_is_bounded() {
    let source = "class Main { f(n: Int): Int { f(n + 1) }; main(): Int { f(0) }; };";
    let options = RunOptions {
        max_call_depth: 50,
        ..RunOptions::default()
    };

    let (result, _) = run_with(source, "", &options);
    assert_eq!(
        result.unwrap_err().get_kind(),
        &ErrorImpl::CallDepthExceeded { limit: 50 }
    );
}

#[test]
fn test_runtime_error_carries_position() {
    let result = run("class Main {\n  main(): Int {\n    1 / 0\n  };\n};");
    let error = result.unwrap_err();

    assert_eq!(error.get_position().line, 3);
    assert_eq!(error.get_position().column, 5);
}
