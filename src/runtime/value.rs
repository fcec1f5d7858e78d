//! Runtime values.

use std::{cell::RefCell, collections::HashMap, fmt, rc::Rc};

use crate::registry::builtins::{BOOL, INT, STRING};

use super::class::RuntimeClass;

#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Str(String),
    Bool(bool),
    Void,
    /// A user object, or one of the shared `Object`/`IO` instances
    Instance(Rc<RefCell<Instance>>),
}

impl Value {
    /// The value an attribute or let binding of `type_name` starts with.
    pub fn default_for(type_name: &str) -> Value {
        match type_name {
            INT => Value::Int(0),
            STRING => Value::Str(String::new()),
            BOOL => Value::Bool(false),
            _ => Value::Void,
        }
    }

    /// Dynamic class name. `None` for void.
    pub fn class_name(&self) -> Option<String> {
        match self {
            Value::Int(_) => Some(INT.to_string()),
            Value::Str(_) => Some(STRING.to_string()),
            Value::Bool(_) => Some(BOOL.to_string()),
            Value::Void => None,
            Value::Instance(instance) => Some(instance.borrow().class.name.clone()),
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Value::Void)
    }

    /// COOL `=`: primitives by value, objects by identity.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Void, Value::Void) => true,
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Shallow copy. Primitives are immutable and copy to themselves.
    pub fn shallow_copy(&self) -> Value {
        match self {
            Value::Instance(instance) => {
                let copy = instance.borrow().clone();
                Value::Instance(Rc::new(RefCell::new(copy)))
            }
            other => other.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{}", value),
            Value::Str(value) => write!(f, "{}", value),
            Value::Bool(value) => write!(f, "{}", value),
            Value::Void => write!(f, "void"),
            Value::Instance(instance) => write!(f, "<{}>", instance.borrow().class.name),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Instance {
    pub class: Rc<RuntimeClass>,
    pub fields: HashMap<String, Value>,
}

impl Instance {
    /// An instance with every attribute of `class` at its default value.
    pub fn new(class: Rc<RuntimeClass>) -> Self {
        let fields = class
            .layout
            .iter()
            .map(|slot| (slot.name.clone(), Value::default_for(&slot.type_name)))
            .collect();

        Self { class, fields }
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.fields.get(name).cloned()
    }

    pub fn set(&mut self, name: String, value: Value) {
        self.fields.insert(name, value);
    }
}
