//! Unit tests for the class registry and inheritance validation.

use std::sync::Arc;

use crate::{
    ast::ast::Program,
    errors::errors::{Error, ErrorImpl},
    lexer::lexer::tokenize,
    parser::parser::parse,
};

use super::{
    builtins::{BUILTIN_CLASSES, OBJECT},
    inheritance::build_registry,
    registry::{ClassDescriptor, ClassRegistry},
};

const MAIN: &str = "class Main { main(): Int { 0 }; };";

fn program(source: &str) -> Program {
    let tokens = tokenize(source.to_string(), Some("test.cl".to_string())).unwrap();
    parse(tokens, Arc::new("test.cl".to_string())).unwrap()
}

fn validate(source: &str) -> Vec<Error> {
    build_registry(&program(source)).1
}

fn names(errors: &[Error]) -> Vec<&str> {
    errors.iter().map(|error| error.get_error_name()).collect()
}

#[test]
fn test_registry_is_seeded_with_builtins() {
    let registry = ClassRegistry::new();

    for name in BUILTIN_CLASSES {
        assert!(registry.contains(name), "{} missing", name);
    }

    let object = registry.lookup(OBJECT).unwrap();
    assert_eq!(object.parent, None);
    assert!(object.methods.contains_key("abort"));
    assert!(object.methods.contains_key("type_name"));
    assert!(object.methods.contains_key("copy"));

    let io = registry.lookup("IO").unwrap();
    assert_eq!(io.parent.as_deref(), Some(OBJECT));
    assert_eq!(io.methods.len(), 4);

    let string = registry.lookup("String").unwrap();
    assert_eq!(string.methods["substr"].arity(), 2);
    assert!(registry.lookup("Int").unwrap().methods.is_empty());
}

#[test]
fn test_register_rejects_duplicates_and_builtins() {
    let program = program("class A {}; class IO {};");
    let mut registry = ClassRegistry::new();

    let (a, _) = ClassDescriptor::from_decl(&program.classes[0]);
    assert!(registry.register(a.clone()).is_ok());

    let error = registry.register(a).unwrap_err();
    assert_eq!(error.get_error_name(), "DuplicateClass");

    let (io, _) = ClassDescriptor::from_decl(&program.classes[1]);
    let error = registry.register(io).unwrap_err();
    assert_eq!(error.get_error_name(), "BuiltinRedefinition");
}

#[test]
fn test_missing_parent_defaults_to_object() {
    let program = program("class A {};");
    let (a, errors) = ClassDescriptor::from_decl(&program.classes[0]);

    assert!(errors.is_empty());
    assert_eq!(a.parent.as_deref(), Some(OBJECT));
}

#[test]
fn test_valid_program_has_no_errors() {
    let errors = validate(&format!("class A inherits IO {{}}; class B inherits A {{}}; {}", MAIN));
    assert!(errors.is_empty(), "{:?}", errors);
}

#[test]
fn test_ancestors_walk_to_object() {
    let (registry, _) = build_registry(&program(&format!(
        "class A {{}}; class B inherits A {{}}; class C inherits B {{}}; {}",
        MAIN
    )));

    let chain: Vec<String> = registry
        .ancestors("C")
        .iter()
        .map(|class| class.name.clone())
        .collect();
    assert_eq!(chain, vec!["C", "B", "A", "Object"]);
}

#[test]
fn test_find_method_reports_defining_class() {
    let (registry, _) = build_registry(&program(&format!(
        "class A {{ f(): Int {{ 1 }}; }}; class B inherits A {{}}; {}",
        MAIN
    )));

    let (owner, method) = registry.find_method("B", "f").unwrap();
    assert_eq!(owner, "A");
    assert_eq!(method.name, "f");

    let (owner, _) = registry.find_method("B", "type_name").unwrap();
    assert_eq!(owner, OBJECT);

    assert!(registry.find_method("B", "nope").is_none());
}

#[test]
fn test_redefining_builtin_is_rejected() {
    let errors = validate(&format!("class String {{}}; {}", MAIN));
    assert_eq!(names(&errors), vec!["BuiltinRedefinition"]);
}

#[test]
fn test_duplicate_class_is_rejected() {
    let errors = validate(&format!("class A {{}}; class A {{}}; {}", MAIN));
    assert_eq!(names(&errors), vec!["DuplicateClass"]);
}

#[test]
fn test_inheriting_from_int_is_rejected() {
    let errors = validate(&format!("class A inherits Int {{}}; {}", MAIN));

    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].get_kind(),
        &ErrorImpl::IllegalInheritance {
            class: "A".to_string(),
            parent: "Int".to_string()
        }
    );
}

#[test]
fn test_inheriting_from_string_bool_and_self_type_is_rejected() {
    let errors = validate(&format!(
        "class A inherits String {{}}; class B inherits Bool {{}}; class C inherits SELF_TYPE {{}}; {}",
        MAIN
    ));
    assert_eq!(
        names(&errors),
        vec!["IllegalInheritance", "IllegalInheritance", "IllegalInheritance"]
    );
}

#[test]
fn test_undefined_parent_is_rejected() {
    let errors = validate(&format!("class A inherits Missing {{}}; {}", MAIN));
    assert_eq!(names(&errors), vec!["UndefinedParent"]);
}

#[test]
fn test_self_inheritance_is_a_cycle() {
    let errors = validate(&format!("class A inherits A {{}}; {}", MAIN));

    assert_eq!(
        errors[0].get_kind(),
        &ErrorImpl::InheritanceCycle {
            class: "A".to_string()
        }
    );
    assert_eq!(errors.len(), 1);
}

#[test]
fn test_three_class_ring_reports_every_member() {
    let errors = validate(&format!(
        "class A inherits C {{}}; class B inherits A {{}}; class C inherits B {{}}; class D inherits A {{}}; {}",
        MAIN
    ));

    let mut cycle_members: Vec<String> = errors
        .iter()
        .filter_map(|error| match error.get_kind() {
            ErrorImpl::InheritanceCycle { class } => Some(class.clone()),
            _ => None,
        })
        .collect();
    cycle_members.sort();

    assert_eq!(cycle_members, vec!["A", "B", "C"]);
    assert_eq!(errors.len(), 3);
}

#[test]
fn test_missing_main_is_rejected() {
    let errors = validate("class A {};");
    assert_eq!(names(&errors), vec!["MissingMainClass"]);
}

#[test]
fn test_main_without_main_method_is_rejected() {
    let errors = validate("class Main { f(): Int { 0 }; };");
    assert_eq!(names(&errors), vec!["MissingMainMethod"]);
}

#[test]
fn test_main_method_with_arguments_is_rejected() {
    let errors = validate("class Main { main(x: Int): Int { x }; };");
    assert_eq!(names(&errors), vec!["MainMethodHasArguments"]);
}

#[test]
fn test_inherited_main_method_is_accepted() {
    let errors = validate("class Base { main(): Int { 1 }; }; class Main inherits Base {};");
    assert!(errors.is_empty(), "{:?}", errors);
}

#[test]
fn test_errors_accumulate() {
    let errors = validate("class A inherits Int {}; class B inherits Nope {}; class IO {};");
    assert_eq!(
        names(&errors),
        vec![
            "BuiltinRedefinition",
            "IllegalInheritance",
            "UndefinedParent",
            "MissingMainClass"
        ]
    );
}

#[test]
fn test_duplicate_features_are_reported() {
    let errors = validate(
        "class Main { x: Int; x: String; main(): Int { 0 }; main(): Int { 1 }; f(a: Int, a: Int): Int { a }; };",
    );
    assert_eq!(
        names(&errors),
        vec!["DuplicateAttribute", "DuplicateMethod", "DuplicateFormal"]
    );
}
