//! Registration of user classes and validation of the inheritance graph.

use std::collections::HashMap;

use tracing::debug;

use crate::{
    ast::ast::Program,
    errors::errors::{Error, ErrorImpl},
    Position,
};

use super::{
    builtins::{FINAL_CLASSES, MAIN_CLASS, MAIN_METHOD, OBJECT, SELF_TYPE},
    registry::{ClassDescriptor, ClassRegistry},
};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Registers every class of `program` and validates the resulting graph.
///
/// All violations are collected; the registry is only safe to type check
/// when the returned list is empty.
pub fn build_registry(program: &Program) -> (ClassRegistry, Vec<Error>) {
    let mut registry = ClassRegistry::new();
    let mut errors = vec![];

    // Registration
    for decl in &program.classes {
        let (descriptor, class_errors) = ClassDescriptor::from_decl(decl);
        errors.extend(class_errors);

        if let Err(error) = registry.register(descriptor) {
            errors.push(error);
        }
    }

    errors.extend(validate_graph(&registry));

    for class in detect_cycles(&registry) {
        let position = registry
            .lookup(&class)
            .map(|descriptor| descriptor.span.start.clone())
            .unwrap_or_else(Position::null);
        errors.push(Error::new(ErrorImpl::InheritanceCycle { class }, position));
    }

    match registry.lookup(MAIN_CLASS) {
        None => errors.push(Error::new(ErrorImpl::MissingMainClass, Position::null())),
        // An inherited `main` can only be found once Main's chain reaches Object
        Some(main) if reaches_object(&registry, MAIN_CLASS) => match registry.find_method(MAIN_CLASS, MAIN_METHOD) {
            None => errors.push(Error::new(ErrorImpl::MissingMainMethod, main.span.start.clone())),
            Some((_, method)) if method.arity() > 0 => errors.push(Error::new(
                ErrorImpl::MainMethodHasArguments {
                    count: method.arity(),
                },
                method.span.start.clone(),
            )),
            Some(_) => {}
        },
        Some(_) => {}
    }

    debug!(
        classes = registry.user_classes().count(),
        errors = errors.len(),
        "inheritance graph validated"
    );

    (registry, errors)
}

fn reaches_object(registry: &ClassRegistry, class: &str) -> bool {
    registry
        .ancestors(class)
        .last()
        .is_some_and(|root| root.name == OBJECT)
}

/// Every declared parent must exist and must not be a final class.
fn validate_graph(registry: &ClassRegistry) -> Vec<Error> {
    let mut errors = vec![];

    for class in registry.user_classes() {
        let Some(parent) = &class.parent else {
            continue;
        };

        if FINAL_CLASSES.contains(&parent.as_str()) || parent == SELF_TYPE {
            errors.push(Error::new(
                ErrorImpl::IllegalInheritance {
                    class: class.name.clone(),
                    parent: parent.clone(),
                },
                class.span.start.clone(),
            ));
        } else if !registry.contains(parent) {
            errors.push(Error::new(
                ErrorImpl::UndefinedParent {
                    class: class.name.clone(),
                    parent: parent.clone(),
                },
                class.span.start.clone(),
            ));
        }
    }

    errors
}

/// Depth-first walk up the parent links. Reaching a class that is still in
/// progress closes a cycle; every class on that loop is returned once, in
/// registration order of discovery.
pub fn detect_cycles(registry: &ClassRegistry) -> Vec<String> {
    let mut marks: HashMap<&str, Mark> = HashMap::new();
    let mut in_cycle = vec![];

    for class in registry.classes() {
        let mut path: Vec<&str> = vec![];
        let mut current = Some(class.name.as_str());

        while let Some(name) = current {
            match marks.get(name) {
                Some(Mark::Done) => break,
                Some(Mark::InProgress) => {
                    if let Some(start) = path.iter().position(|member| *member == name) {
                        in_cycle.extend(path[start..].iter().map(|member| member.to_string()));
                    }
                    break;
                }
                None => {
                    marks.insert(name, Mark::InProgress);
                    path.push(name);
                    current = registry
                        .parent_of(name)
                        .filter(|parent| registry.contains(parent));
                }
            }
        }

        for member in path {
            marks.insert(member, Mark::Done);
        }
    }

    in_cycle
}
