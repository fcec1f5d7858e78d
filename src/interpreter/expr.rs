use crate::{
    ast::expressions::{BinaryOp, CaseBranch, Expr, ExprKind, LetBinding, UnaryOp},
    errors::errors::{Error, ErrorImpl},
    registry::builtins::SELF_TYPE,
    runtime::{environment::Environment, value::Value},
    Position,
};

use super::interpreter::{internal, Interpreter};

impl Interpreter<'_> {
    pub fn eval(&mut self, expr: &Expr, env: &Environment) -> Result<Value, Error> {
        let position = &expr.span.start;

        match &expr.kind {
            ExprKind::Int(value) => Ok(Value::Int(*value)),
            ExprKind::Str(value) => Ok(Value::Str(value.clone())),
            ExprKind::Bool(value) => Ok(Value::Bool(*value)),
            ExprKind::SelfRef => Ok(env.self_value().clone()),
            ExprKind::Identifier(name) => self.eval_identifier(name, env, position),
            ExprKind::Assign { name, value } => {
                let value = self.eval(value, env)?;
                self.assign(name, value.clone(), env, position)?;
                Ok(value)
            }
            ExprKind::Dispatch {
                receiver,
                static_type,
                method,
                arguments,
            } => {
                let receiver = match receiver {
                    Some(receiver) => self.eval(receiver, env)?,
                    None => env.self_value().clone(),
                };
                let arguments = arguments
                    .iter()
                    .map(|argument| self.eval(argument, env))
                    .collect::<Result<Vec<_>, _>>()?;

                self.dispatch(receiver, static_type.as_deref(), method, arguments, position)
            }
            ExprKind::New(type_name) => {
                let class_name = if type_name == SELF_TYPE {
                    env.self_value()
                        .class_name()
                        .ok_or_else(|| internal(String::from("self is void"), position))?
                } else {
                    type_name.clone()
                };
                self.instantiate(&class_name, position)
            }
            ExprKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.eval_bool(condition, env)? {
                    self.eval(then_branch, env)
                } else {
                    self.eval(else_branch, env)
                }
            }
            ExprKind::While { condition, body } => {
                while self.eval_bool(condition, env)? {
                    self.eval(body, env)?;
                }
                Ok(Value::Void)
            }
            ExprKind::Block(body) => {
                let mut last = Value::Void;
                for expr in body {
                    last = self.eval(expr, env)?;
                }
                Ok(last)
            }
            ExprKind::Let { bindings, body } => self.eval_let(bindings, body, env),
            ExprKind::Case { scrutinee, branches } => self.eval_case(scrutinee, branches, env, position),
            ExprKind::IsVoid(inner) => Ok(Value::Bool(self.eval(inner, env)?.is_void())),
            ExprKind::Unary { operator, operand } => match operator {
                UnaryOp::Negate => Ok(Value::Int(self.eval_int(operand, env)?.wrapping_neg())),
                UnaryOp::Not => Ok(Value::Bool(!self.eval_bool(operand, env)?)),
            },
            ExprKind::Binary { operator, left, right } => self.eval_binary(*operator, left, right, env, position),
            ExprKind::Builtin(builtin) => Err(internal(
                format!("built-in {:?} evaluated outside a dispatch", builtin),
                position,
            )),
        }
    }

    fn eval_bool(&mut self, expr: &Expr, env: &Environment) -> Result<bool, Error> {
        match self.eval(expr, env)? {
            Value::Bool(value) => Ok(value),
            other => Err(internal(format!("expected a Bool, found {}", other), &expr.span.start)),
        }
    }

    fn eval_int(&mut self, expr: &Expr, env: &Environment) -> Result<i64, Error> {
        match self.eval(expr, env)? {
            Value::Int(value) => Ok(value),
            other => Err(internal(format!("expected an Int, found {}", other), &expr.span.start)),
        }
    }

    /// Locals, then attributes of `self`, then a zero-argument method on
    /// `self`.
    fn eval_identifier(&mut self, name: &str, env: &Environment, position: &Position) -> Result<Value, Error> {
        if let Some(value) = env.get(name) {
            return Ok(value);
        }

        if let Value::Instance(instance) = env.self_value() {
            if let Some(value) = instance.borrow().get(name) {
                return Ok(value);
            }
        }

        self.dispatch(env.self_value().clone(), None, name, vec![], position)
    }

    fn assign(&mut self, name: &str, value: Value, env: &Environment, position: &Position) -> Result<(), Error> {
        if env.assign(name, value.clone()) {
            return Ok(());
        }

        if let Value::Instance(instance) = env.self_value() {
            let mut instance = instance.borrow_mut();
            if instance.class.has_attribute(name) {
                instance.set(name.to_string(), value);
                return Ok(());
            }
        }

        Err(internal(format!("assignment to unknown name {}", name), position))
    }

    /// Bindings are added one at a time; each initializer sees the ones
    /// before it.
    fn eval_let(&mut self, bindings: &[LetBinding], body: &Expr, env: &Environment) -> Result<Value, Error> {
        let mut scope = env.clone();

        for binding in bindings {
            let value = match &binding.init {
                Some(init) => self.eval(init, &scope)?,
                None => Value::default_for(&binding.type_name),
            };
            scope = scope.extend(binding.name.clone(), value);
        }

        self.eval(body, &scope)
    }

    /// Runs the branch whose type is the closest ancestor of the
    /// scrutinee's dynamic class.
    fn eval_case(
        &mut self,
        scrutinee: &Expr,
        branches: &[CaseBranch],
        env: &Environment,
        position: &Position,
    ) -> Result<Value, Error> {
        let value = self.eval(scrutinee, env)?;
        let Some(class_name) = value.class_name() else {
            return Err(Error::new(ErrorImpl::CaseOnVoid, position.clone()));
        };
        let class = self.class(&class_name, position)?;

        let branch = branches
            .iter()
            .filter_map(|branch| class.distance_to(&branch.type_name).map(|distance| (distance, branch)))
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, branch)| branch);

        let Some(branch) = branch else {
            return Err(Error::new(ErrorImpl::NoMatchingBranch { class: class_name }, position.clone()));
        };

        let scope = env.extend(branch.name.clone(), value);
        self.eval(&branch.body, &scope)
    }

    fn eval_binary(
        &mut self,
        operator: BinaryOp,
        left: &Expr,
        right: &Expr,
        env: &Environment,
        position: &Position,
    ) -> Result<Value, Error> {
        if operator == BinaryOp::Equals {
            let left = self.eval(left, env)?;
            let right = self.eval(right, env)?;
            return Ok(Value::Bool(left.equals(&right)));
        }

        let left = self.eval_int(left, env)?;
        let right = self.eval_int(right, env)?;

        let value = match operator {
            BinaryOp::Plus => Value::Int(left.wrapping_add(right)),
            BinaryOp::Minus => Value::Int(left.wrapping_sub(right)),
            BinaryOp::Times => Value::Int(left.wrapping_mul(right)),
            BinaryOp::Divide => {
                if right == 0 {
                    return Err(Error::new(ErrorImpl::DivisionByZero, position.clone()));
                }
                Value::Int(left.wrapping_div(right))
            }
            BinaryOp::Less => Value::Bool(left < right),
            BinaryOp::LessEquals => Value::Bool(left <= right),
            BinaryOp::Equals => Value::Bool(left == right),
        };

        Ok(value)
    }
}
