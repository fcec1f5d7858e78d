use std::collections::HashSet;

use crate::{
    ast::expressions::{BinaryOp, CaseBranch, Expr, ExprKind, LetBinding, UnaryOp},
    errors::errors::ErrorImpl,
    registry::builtins::{BOOL, INT, OBJECT, SELF_TYPE, STRING},
    Position,
};

use super::{conformance::join, type_checker::TypeChecker};

impl TypeChecker<'_> {
    /// Infers the static type of `expr`. Errors are recorded and `Object`
    /// is substituted so checking can continue.
    pub fn check_expr(&mut self, expr: &Expr) -> String {
        let position = &expr.span.start;

        match &expr.kind {
            ExprKind::Int(_) => String::from(INT),
            ExprKind::Str(_) => String::from(STRING),
            ExprKind::Bool(_) => String::from(BOOL),
            ExprKind::SelfRef => self.current_class.clone(),
            ExprKind::Identifier(name) => self.check_identifier(name, position),
            ExprKind::Assign { name, value } => self.check_assign(name, value, position),
            ExprKind::Dispatch {
                receiver,
                static_type,
                method,
                arguments,
            } => self.check_dispatch(receiver.as_deref(), static_type.as_deref(), method, arguments, position),
            ExprKind::New(type_name) => {
                if type_name == SELF_TYPE {
                    self.current_class.clone()
                } else {
                    self.declared_type(type_name, position)
                }
            }
            ExprKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.check_condition(condition, "if condition");
                let then_type = self.check_expr(then_branch);
                let else_type = self.check_expr(else_branch);
                join(self.registry, &then_type, &else_type)
            }
            ExprKind::While { condition, body } => {
                self.check_condition(condition, "loop condition");
                self.check_expr(body);
                String::from(OBJECT)
            }
            ExprKind::Block(body) => body
                .iter()
                .map(|expr| self.check_expr(expr))
                .last()
                .unwrap_or_else(|| String::from(OBJECT)),
            ExprKind::Let { bindings, body } => self.check_let(bindings, body),
            ExprKind::Case { scrutinee, branches } => self.check_case(scrutinee, branches),
            ExprKind::IsVoid(inner) => {
                self.check_expr(inner);
                String::from(BOOL)
            }
            ExprKind::Unary { operator, operand } => {
                let received = self.check_expr(operand);
                let (expected, context) = match operator {
                    UnaryOp::Negate => (INT, "operand of ~"),
                    UnaryOp::Not => (BOOL, "operand of not"),
                };
                self.require_exact(&received, expected, context, &operand.span.start);
                expected.to_string()
            }
            ExprKind::Binary { operator, left, right } => self.check_binary(*operator, left, right),
            // Built-in bodies belong to the built-in classes, which are never checked
            ExprKind::Builtin(_) => String::from(OBJECT),
        }
    }

    fn require_exact(&mut self, received: &str, expected: &str, context: &str, position: &Position) {
        if received != expected {
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

    fn check_condition(&mut self, condition: &Expr, context: &str) {
        let received = self.check_expr(condition);
        self.require_exact(&received, BOOL, context, &condition.span.start);
    }

    /// Declared type of a local or an attribute visible in the current class.
    fn variable_type(&self, name: &str) -> Option<String> {
        if let Some(local) = self.scope.get_variable(name) {
            return Some(local.clone());
        }

        self.registry
            .find_attribute(&self.current_class, name)
            .map(|(_, attribute)| self.resolve(&attribute.type_name))
    }

    fn check_identifier(&mut self, name: &str, position: &Position) -> String {
        if let Some(type_name) = self.variable_type(name) {
            return type_name;
        }

        // A bare name may also call a zero-argument method on self
        if let Some((_, method)) = self.registry.find_method(&self.current_class, name) {
            if method.arity() == 0 {
                return self.resolve(&method.return_type);
            }
        }

        self.error(
            ErrorImpl::VariableNotDeclared {
                variable: name.to_string(),
            },
            position,
        );
        String::from(OBJECT)
    }

    fn check_assign(&mut self, name: &str, value: &Expr, position: &Position) -> String {
        self.check_binding_name(name, "assigned", position);
        let received = self.check_expr(value);

        match self.variable_type(name) {
            Some(expected) => self.require_conforms(
                &received,
                &expected,
                &format!("assignment to {}", name),
                &value.span.start,
            ),
            None if name != "self" => self.error(
                ErrorImpl::VariableNotDeclared {
                    variable: name.to_string(),
                },
                position,
            ),
            None => {}
        }

        received
    }

    fn check_dispatch(
        &mut self,
        receiver: Option<&Expr>,
        static_type: Option<&str>,
        method_name: &str,
        arguments: &[Expr],
        position: &Position,
    ) -> String {
        let receiver_type = match receiver {
            Some(receiver) => self.check_expr(receiver),
            None => self.current_class.clone(),
        };

        let lookup_type = match static_type {
            Some(static_type) if static_type == SELF_TYPE => {
                self.error(
                    ErrorImpl::SelfTypeNotAllowed {
                        context: String::from("a static dispatch"),
                    },
                    position,
                );
                None
            }
            Some(static_type) if !self.registry.contains(static_type) => {
                self.error(
                    ErrorImpl::UnknownType {
                        type_: static_type.to_string(),
                    },
                    position,
                );
                None
            }
            Some(static_type) => {
                self.require_conforms(&receiver_type, static_type, "static dispatch receiver", position);
                Some(static_type.to_string())
            }
            None => Some(receiver_type.clone()),
        };

        let argument_types: Vec<String> = arguments.iter().map(|argument| self.check_expr(argument)).collect();

        let Some(lookup_type) = lookup_type else {
            return String::from(OBJECT);
        };

        let Some((_, method)) = self.registry.find_method(&lookup_type, method_name) else {
            self.error(
                ErrorImpl::UndefinedMethod {
                    class: lookup_type,
                    method: method_name.to_string(),
                },
                position,
            );
            return String::from(OBJECT);
        };

        if method.arity() != argument_types.len() {
            self.error(
                ErrorImpl::UnexpectedArguments {
                    method: method_name.to_string(),
                    expected: method.arity(),
                    received: argument_types.len(),
                },
                position,
            );
        } else {
            for (index, ((formal, received), argument)) in
                method.formals.iter().zip(&argument_types).zip(arguments).enumerate()
            {
                if !self.conforms(received, &formal.type_name) {
                    self.error(
                        ErrorImpl::ArgumentTypeMatchError {
                            method: method_name.to_string(),
                            index: index + 1,
                            expected: formal.type_name.clone(),
                            received: received.clone(),
                        },
                        &argument.span.start,
                    );
                }
            }
        }

        // SELF_TYPE follows the receiver, even under static dispatch
        if method.return_type == SELF_TYPE {
            receiver_type
        } else {
            method.return_type.clone()
        }
    }

    fn check_let(&mut self, bindings: &[LetBinding], body: &Expr) -> String {
        self.scope.push();

        for binding in bindings {
            let position = &binding.span.start;
            self.check_binding_name(&binding.name, "bound in a let", position);
            let declared = self.declared_type(&binding.type_name, position);

            if let Some(init) = &binding.init {
                let received = self.check_expr(init);
                self.require_conforms(
                    &received,
                    &declared,
                    &format!("initializer of {}", binding.name),
                    &init.span.start,
                );
            }

            self.scope.declare_variable(binding.name.clone(), declared);
        }

        let body_type = self.check_expr(body);
        self.scope.pop();
        body_type
    }

    fn check_case(&mut self, scrutinee: &Expr, branches: &[CaseBranch]) -> String {
        self.check_expr(scrutinee);

        let mut seen = HashSet::new();
        let mut result: Option<String> = None;

        for branch in branches {
            let position = &branch.span.start;
            self.check_binding_name(&branch.name, "bound in a case branch", position);

            let branch_type = if branch.type_name == SELF_TYPE {
                self.error(
                    ErrorImpl::SelfTypeNotAllowed {
                        context: format!("case branch {}", branch.name),
                    },
                    position,
                );
                String::from(OBJECT)
            } else {
                self.declared_type(&branch.type_name, position)
            };

            if !seen.insert(branch.type_name.clone()) {
                self.error(
                    ErrorImpl::DuplicateCaseBranch {
                        type_: branch.type_name.clone(),
                    },
                    position,
                );
            }

            self.scope.push();
            self.scope.declare_variable(branch.name.clone(), branch_type);
            let body_type = self.check_expr(&branch.body);
            self.scope.pop();

            result = Some(match result {
                Some(previous) => join(self.registry, &previous, &body_type),
                None => body_type,
            });
        }

        result.unwrap_or_else(|| String::from(OBJECT))
    }

    fn check_binary(&mut self, operator: BinaryOp, left: &Expr, right: &Expr) -> String {
        let left_type = self.check_expr(left);
        let right_type = self.check_expr(right);

        if operator == BinaryOp::Equals {
            return String::from(BOOL);
        }

        let context = format!("operand of {}", operator);
        self.require_exact(&left_type, INT, &context, &left.span.start);
        self.require_exact(&right_type, INT, &context, &right.span.start);

        if operator.is_arithmetic() {
            String::from(INT)
        } else {
            String::from(BOOL)
        }
    }
}
