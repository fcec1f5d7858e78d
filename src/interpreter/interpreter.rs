use std::{cell::RefCell, io::BufRead, rc::Rc};

use tracing::trace;

use crate::{
    ast::expressions::ExprKind,
    errors::errors::{Error, ErrorImpl},
    registry::{
        builtins::{BOOL, INT, IO, MAIN_CLASS, MAIN_METHOD, OBJECT, STRING},
        registry::ClassRegistry,
    },
    runtime::{
        class::{ClassTable, RuntimeClass},
        environment::Environment,
        value::{Instance, Value},
    },
    Position, RunOptions,
};

use super::builtins::call_builtin;

/// Executes a type-checked program.
///
/// Holds everything evaluation needs: the resolved classes, the shared
/// `Object` and `IO` instances, captured output, the input source and the
/// recursion guards.
pub struct Interpreter<'a> {
    classes: ClassTable,
    object_instance: Value,
    io_instance: Value,
    pub(super) output: String,
    pub(super) input: &'a mut dyn BufRead,
    /// Classes whose attribute initializers are currently running.
    constructing: Vec<String>,
    call_depth: usize,
    max_call_depth: usize,
    max_construction_depth: usize,
}

impl<'a> Interpreter<'a> {
    pub fn new(registry: &ClassRegistry, options: &RunOptions, input: &'a mut dyn BufRead) -> Result<Self, Error> {
        let classes = ClassTable::from_registry(registry);
        let object_instance = Self::shared_instance(&classes, OBJECT)?;
        let io_instance = Self::shared_instance(&classes, IO)?;

        Ok(Interpreter {
            classes,
            object_instance,
            io_instance,
            output: String::new(),
            input,
            constructing: vec![],
            call_depth: 0,
            max_call_depth: options.max_call_depth,
            max_construction_depth: options.max_construction_depth,
        })
    }

    fn shared_instance(classes: &ClassTable, name: &str) -> Result<Value, Error> {
        let class = classes
            .get(name)
            .ok_or_else(|| internal(format!("built-in class {} is missing", name), &Position::null()))?;
        Ok(Value::Instance(Rc::new(RefCell::new(Instance::new(class)))))
    }

    /// Output written so far by `out_string` and `out_int`.
    pub fn into_output(self) -> String {
        self.output
    }

    /// Builds a `Main` and calls its `main` method.
    pub fn run(&mut self) -> Result<Value, Error> {
        let position = Position::null();
        let main = self.instantiate(MAIN_CLASS, &position)?;
        self.dispatch(main, None, MAIN_METHOD, vec![], &position)
    }

    pub(super) fn class(&self, name: &str, position: &Position) -> Result<Rc<RuntimeClass>, Error> {
        self.classes
            .get(name)
            .ok_or_else(|| internal(format!("unknown class {}", name), position))
    }

    /// Evaluates `new T` for a concrete class name.
    pub(super) fn instantiate(&mut self, class_name: &str, position: &Position) -> Result<Value, Error> {
        match class_name {
            INT | STRING | BOOL => Ok(Value::default_for(class_name)),
            OBJECT => Ok(self.object_instance.clone()),
            IO => Ok(self.io_instance.clone()),
            _ => self.construct(class_name, position),
        }
    }

    /// Defaults every attribute, then runs the initializers root-to-leaf
    /// with `self` bound to the new object.
    fn construct(&mut self, class_name: &str, position: &Position) -> Result<Value, Error> {
        if self.constructing.iter().any(|name| name == class_name) {
            return Err(Error::new(
                ErrorImpl::CircularInitialization {
                    class: class_name.to_string(),
                },
                position.clone(),
            ));
        }
        if self.constructing.len() >= self.max_construction_depth {
            return Err(Error::new(
                ErrorImpl::ConstructionDepthExceeded {
                    limit: self.max_construction_depth,
                },
                position.clone(),
            ));
        }

        let class = self.class(class_name, position)?;
        let instance = Rc::new(RefCell::new(Instance::new(Rc::clone(&class))));
        let object = Value::Instance(Rc::clone(&instance));

        self.constructing.push(class_name.to_string());
        let result = self.initialize(&class, &instance, &object);
        self.constructing.pop();
        result?;

        Ok(object)
    }

    fn initialize(&mut self, class: &RuntimeClass, instance: &RefCell<Instance>, object: &Value) -> Result<(), Error> {
        let env = Environment::new(object.clone());

        for slot in &class.layout {
            if let Some(init) = &slot.init {
                let value = self.eval(init, &env)?;
                instance.borrow_mut().set(slot.name.clone(), value);
            }
        }

        Ok(())
    }

    /// Calls `method_name` on `receiver`. Lookup starts at `static_type`
    /// when given, otherwise at the receiver's dynamic class.
    pub(super) fn dispatch(
        &mut self,
        receiver: Value,
        static_type: Option<&str>,
        method_name: &str,
        arguments: Vec<Value>,
        position: &Position,
    ) -> Result<Value, Error> {
        let Some(dynamic_class) = receiver.class_name() else {
            return Err(Error::new(
                ErrorImpl::DispatchOnVoid {
                    method: method_name.to_string(),
                },
                position.clone(),
            ));
        };

        let lookup_class = self.class(static_type.unwrap_or(dynamic_class.as_str()), position)?;
        let Some(method) = lookup_class.find_method(method_name, arguments.len()) else {
            return Err(Error::new(
                ErrorImpl::UndefinedMethod {
                    class: lookup_class.name.clone(),
                    method: method_name.to_string(),
                },
                position.clone(),
            ));
        };

        trace!(class = %dynamic_class, method = method_name, depth = self.call_depth, "dispatch");

        if let ExprKind::Builtin(builtin) = &method.body.kind {
            return call_builtin(self, *builtin, receiver, arguments, position);
        }

        if self.call_depth >= self.max_call_depth {
            return Err(Error::new(
                ErrorImpl::CallDepthExceeded {
                    limit: self.max_call_depth,
                },
                position.clone(),
            ));
        }

        let mut env = Environment::new(receiver);
        for (formal, argument) in method.formals.iter().zip(arguments) {
            env.define(formal.name.clone(), argument);
        }

        self.call_depth += 1;
        let result = self.eval(&method.body, &env);
        self.call_depth -= 1;

        result
    }
}

/// An interpreter invariant broken by a program that passed checking.
pub(super) fn internal(message: String, position: &Position) -> Error {
    Error::new(ErrorImpl::Internal { message }, position.clone())
}
