//! Unit tests for the parser module.
//!
//! This module contains tests for class and feature declarations, operator
//! precedence, dispatch forms, control flow and syntax errors.

use std::sync::Arc;

use crate::{
    ast::{
        ast::{Feature, Program},
        expressions::{BinaryOp, Expr, ExprKind, UnaryOp},
    },
    errors::errors::Error,
    lexer::lexer::tokenize,
};

use super::parser::parse;

fn parse_source(source: &str) -> Result<Program, Error> {
    let tokens = tokenize(source.to_string(), Some("test.cl".to_string()))?;
    parse(tokens, Arc::new("test.cl".to_string()))
}

/// Parses `expr` as the body of a single method and returns it.
fn parse_body(expr: &str) -> Expr {
    let source = format!("class Main {{ main(): Object {{ {} }}; }};", expr);
    let program = parse_source(&source).unwrap();
    match &program.classes[0].features[0] {
        Feature::Method(method) => method.body.clone(),
        Feature::Attribute(_) => panic!("expected a method"),
    }
}

#[test]
fn test_parse_class_with_features() {
    let program = parse_source(
        "class A inherits IO { x : Int <- 1; y : String; f(a : Int, b : Bool) : SELF_TYPE { self }; };",
    )
    .unwrap();

    assert_eq!(program.classes.len(), 1);
    let class = &program.classes[0];
    assert_eq!(class.name, "A");
    assert_eq!(class.parent.as_deref(), Some("IO"));
    assert_eq!(class.attributes().count(), 2);

    let method = class.methods().next().unwrap();
    assert_eq!(method.name, "f");
    assert_eq!(method.return_type, "SELF_TYPE");
    assert_eq!(method.formals.len(), 2);
    assert_eq!(method.formals[1].type_name, "Bool");
    assert!(matches!(method.body.kind, ExprKind::SelfRef));
}

#[test]
fn test_parse_multiple_classes() {
    let program = parse_source("class A {}; class B inherits A {};").unwrap();

    assert_eq!(program.classes.len(), 2);
    assert_eq!(program.classes[0].parent, None);
    assert_eq!(program.classes[1].parent.as_deref(), Some("A"));
}

#[test]
fn test_multiplication_binds_tighter_than_addition() {
    let body = parse_body("1 + 2 * 3");

    match body.kind {
        ExprKind::Binary {
            operator: BinaryOp::Plus,
            right,
            ..
        } => assert!(matches!(
            right.kind,
            ExprKind::Binary {
                operator: BinaryOp::Times,
                ..
            }
        )),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_subtraction_is_left_associative() {
    let body = parse_body("10 - 4 - 3");

    match body.kind {
        ExprKind::Binary {
            operator: BinaryOp::Minus,
            left,
            right,
        } => {
            assert!(matches!(left.kind, ExprKind::Binary { .. }));
            assert!(matches!(right.kind, ExprKind::Int(3)));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_not_binds_looser_than_comparison() {
    let body = parse_body("not 1 < 2");

    match body.kind {
        ExprKind::Unary {
            operator: UnaryOp::Not,
            operand,
        } => assert!(matches!(
            operand.kind,
            ExprKind::Binary {
                operator: BinaryOp::Less,
                ..
            }
        )),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_negate_binds_tighter_than_addition() {
    let body = parse_body("~1 + 2");

    assert!(matches!(
        body.kind,
        ExprKind::Binary {
            operator: BinaryOp::Plus,
            ..
        }
    ));
}

#[test]
fn test_isvoid_applies_to_dispatch_result() {
    let body = parse_body("isvoid x.next()");

    match body.kind {
        ExprKind::IsVoid(inner) => assert!(matches!(inner.kind, ExprKind::Dispatch { .. })),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_comparisons_do_not_chain() {
    let source = "class Main { main(): Object { 1 < 2 < 3 }; };";
    let error = parse_source(source).unwrap_err();
    assert_eq!(error.get_error_name(), "UnexpectedTokenDetailed");
}

#[test]
fn test_assignment_is_right_associative() {
    let body = parse_body("a <- b <- 3");

    match body.kind {
        ExprKind::Assign { name, value } => {
            assert_eq!(name, "a");
            assert!(matches!(value.kind, ExprKind::Assign { .. }));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_dispatch_forms() {
    let body = parse_body("{ f(1, 2); x.g(); self@A.h(3); (new B).k().m(); }");

    let ExprKind::Block(exprs) = body.kind else {
        panic!("expected block");
    };
    assert_eq!(exprs.len(), 4);

    match &exprs[0].kind {
        ExprKind::Dispatch {
            receiver: None,
            method,
            arguments,
            ..
        } => {
            assert_eq!(method, "f");
            assert_eq!(arguments.len(), 2);
        }
        other => panic!("unexpected {:?}", other),
    }

    match &exprs[2].kind {
        ExprKind::Dispatch {
            receiver: Some(receiver),
            static_type: Some(static_type),
            method,
            ..
        } => {
            assert!(matches!(receiver.kind, ExprKind::SelfRef));
            assert_eq!(static_type, "A");
            assert_eq!(method, "h");
        }
        other => panic!("unexpected {:?}", other),
    }

    match &exprs[3].kind {
        ExprKind::Dispatch {
            receiver: Some(receiver),
            method,
            ..
        } => {
            assert_eq!(method, "m");
            assert!(matches!(receiver.kind, ExprKind::Dispatch { .. }));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_parse_let_with_several_bindings() {
    let body = parse_body("let a : Int <- 1, b : Int, c : String <- \"s\" in a + b");

    match body.kind {
        ExprKind::Let { bindings, body } => {
            assert_eq!(bindings.len(), 3);
            assert!(bindings[0].init.is_some());
            assert!(bindings[1].init.is_none());
            assert_eq!(bindings[2].type_name, "String");
            assert!(matches!(body.kind, ExprKind::Binary { .. }));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_parse_case() {
    let body = parse_body("case x of i : Int => 1; s : String => 2; o : Object => 3; esac");

    match body.kind {
        ExprKind::Case { branches, .. } => {
            assert_eq!(branches.len(), 3);
            assert_eq!(branches[1].name, "s");
            assert_eq!(branches[2].type_name, "Object");
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_parse_if_and_while() {
    let body = parse_body("while i < 10 loop if i = 5 then i <- i + 2 else i <- i + 1 fi pool");

    match body.kind {
        ExprKind::While { body, .. } => assert!(matches!(body.kind, ExprKind::If { .. })),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_missing_semicolon_after_class() {
    let error = parse_source("class A {}").unwrap_err();

    assert_eq!(error.get_error_name(), "UnexpectedTokenDetailed");
}

#[test]
fn test_missing_fi_reports_position() {
    let error = parse_source("class Main {\n main(): Int { if true then 1 else 2 }; };").unwrap_err();

    assert_eq!(error.get_position().line, 2);
}

#[test]
fn test_unexpected_token_in_expression() {
    let source = "class Main { main(): Int { + 1 }; };";
    let error = parse_source(source).unwrap_err();

    assert_eq!(error.get_error_name(), "UnexpectedToken");
}
