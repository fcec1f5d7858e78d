use std::collections::HashMap;

use tracing::debug;

use crate::{
    errors::errors::{Error, ErrorImpl},
    registry::{
        builtins::{OBJECT, SELF_TYPE},
        registry::{ClassDescriptor, ClassRegistry, MethodDescriptor},
    },
    Position,
};

use super::conformance::conforms;

/// Lexical scopes of local names (formals, let and case bindings) to their
/// declared types. The innermost scope is last.
#[derive(Debug, Default)]
pub struct Scope {
    frames: Vec<HashMap<String, String>>,
}

impl Scope {
    pub fn push(&mut self) {
        self.frames.push(HashMap::new());
    }

    pub fn pop(&mut self) {
        self.frames.pop();
    }

    pub fn declare_variable(&mut self, name: String, type_name: String) {
        if self.frames.is_empty() {
            self.push();
        }
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name, type_name);
        }
    }

    pub fn get_variable(&self, name: &str) -> Option<&String> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }
}

pub struct TypeChecker<'a> {
    pub(super) registry: &'a ClassRegistry,
    /// Class whose features are being checked; what `SELF_TYPE` means here.
    pub(super) current_class: String,
    pub(super) scope: Scope,
    pub(super) errors: Vec<Error>,
}

impl<'a> TypeChecker<'a> {
    pub fn new(registry: &'a ClassRegistry) -> Self {
        TypeChecker {
            registry,
            current_class: String::from(OBJECT),
            scope: Scope::default(),
            errors: vec![],
        }
    }

    pub(super) fn error(&mut self, error: ErrorImpl, position: &Position) {
        self.errors.push(Error::new(error, position.clone()));
    }

    /// `SELF_TYPE` stands for the class being checked.
    pub(super) fn resolve(&self, type_name: &str) -> String {
        if type_name == SELF_TYPE {
            self.current_class.clone()
        } else {
            type_name.to_string()
        }
    }

    pub(super) fn is_known(&self, type_name: &str) -> bool {
        type_name == SELF_TYPE || self.registry.contains(type_name)
    }

    /// Resolves a declared type, reporting unknown ones and substituting
    /// `Object` so checking can continue.
    pub(super) fn declared_type(&mut self, type_name: &str, position: &Position) -> String {
        if self.is_known(type_name) {
            self.resolve(type_name)
        } else {
            self.error(
                ErrorImpl::UnknownType {
                    type_: type_name.to_string(),
                },
                position,
            );
            String::from(OBJECT)
        }
    }

    pub(super) fn conforms(&self, sub: &str, sup: &str) -> bool {
        conforms(self.registry, sub, sup)
    }

    /// Reports `TypeMatchError` unless `received <: expected`.
    pub(super) fn require_conforms(&mut self, received: &str, expected: &str, context: &str, position: &Position) {
        if !self.conforms(received, expected) {
            self.error(
                ErrorImpl::TypeMatchError {
                    context: context.to_string(),
                    expected: expected.to_string(),
                    received: received.to_string(),
                },
                position,
            );
        }
    }

    pub(super) fn check_binding_name(&mut self, name: &str, usage: &str, position: &Position) {
        if name == "self" {
            self.error(
                ErrorImpl::IllegalSelfBinding {
                    usage: usage.to_string(),
                },
                position,
            );
        }
    }

    fn check_class(&mut self, class: &ClassDescriptor) {
        self.current_class = class.name.clone();
        let ancestors = self.registry.ancestors(&class.name);

        for attribute in &class.attributes {
            let position = &attribute.span.start;
            self.check_binding_name(&attribute.name, "the name of an attribute", position);
            let declared = self.declared_type(&attribute.type_name, position);

            let inherited = ancestors.iter().skip(1).find(|ancestor| {
                ancestor
                    .attributes
                    .iter()
                    .any(|candidate| candidate.name == attribute.name)
            });
            if let Some(ancestor) = inherited {
                self.error(
                    ErrorImpl::InheritedAttributeRedefined {
                        class: class.name.clone(),
                        attribute: attribute.name.clone(),
                        ancestor: ancestor.name.clone(),
                    },
                    position,
                );
            }

            if let Some(init) = &attribute.init {
                let received = self.check_expr(init);
                self.require_conforms(
                    &received,
                    &declared,
                    &format!("initializer of attribute {}", attribute.name),
                    &init.span.start,
                );
            }
        }

        for method in class.methods_in_order() {
            self.check_method(class, method);
        }
    }

    fn check_method(&mut self, class: &ClassDescriptor, method: &MethodDescriptor) {
        let position = &method.span.start;

        self.scope.push();
        for formal in &method.formals {
            self.check_binding_name(&formal.name, "the name of a formal parameter", position);
            let formal_type = if formal.type_name == SELF_TYPE {
                self.error(
                    ErrorImpl::SelfTypeNotAllowed {
                        context: format!("formal parameter {}", formal.name),
                    },
                    position,
                );
                String::from(OBJECT)
            } else {
                self.declared_type(&formal.type_name, position)
            };
            self.scope.declare_variable(formal.name.clone(), formal_type);
        }

        let return_type = self.declared_type(&method.return_type, position);
        self.check_override(class, method);

        let body_type = self.check_expr(&method.body);
        self.scope.pop();

        self.require_conforms(
            &body_type,
            &return_type,
            &format!("body of method {}", method.name),
            &method.body.span.start,
        );
    }

    /// Overrides keep the arity and parameter types of the nearest
    /// overridden method. A changed return type is only a warning.
    fn check_override(&mut self, class: &ClassDescriptor, method: &MethodDescriptor) {
        let Some(parent) = &class.parent else {
            return;
        };
        let Some((ancestor, overridden)) = self.registry.find_method(parent, &method.name) else {
            return;
        };
        let position = &method.span.start;

        if overridden.arity() != method.arity() {
            self.error(
                ErrorImpl::OverrideArityMismatch {
                    method: method.name.clone(),
                    ancestor,
                    expected: overridden.arity(),
                    received: method.arity(),
                },
                position,
            );
            return;
        }

        for (index, (expected, received)) in overridden.formals.iter().zip(&method.formals).enumerate() {
            if expected.type_name != received.type_name {
                self.error(
                    ErrorImpl::OverrideParameterMismatch {
                        method: method.name.clone(),
                        ancestor: ancestor.clone(),
                        index: index + 1,
                        expected: expected.type_name.clone(),
                        received: received.type_name.clone(),
                    },
                    position,
                );
            }
        }

        if overridden.return_type != method.return_type {
            self.error(
                ErrorImpl::OverrideReturnTypeChanged {
                    method: method.name.clone(),
                    ancestor,
                    expected: overridden.return_type.clone(),
                    received: method.return_type.clone(),
                },
                position,
            );
        }
    }
}

/// Type checks every user class in `registry`.
///
/// The registry must already have passed inheritance validation. Every
/// violation is returned, including warnings; checking never stops early.
pub fn type_check(registry: &ClassRegistry) -> Vec<Error> {
    let mut type_checker = TypeChecker::new(registry);

    for class in registry.user_classes() {
        type_checker.check_class(class);
    }

    debug!(errors = type_checker.errors.len(), "type check finished");

    type_checker.errors
}
