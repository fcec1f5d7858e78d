//! Evaluation scope: the receiver plus local bindings.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use super::value::Value;

/// One activation frame. Extending returns a new frame and leaves `self`
/// untouched; bindings are shared cells so assignment through either frame
/// is visible to both.
#[derive(Debug, Clone)]
pub struct Environment {
    self_value: Value,
    values: HashMap<String, Rc<RefCell<Value>>>,
}

impl Environment {
    pub fn new(self_value: Value) -> Self {
        Self {
            self_value,
            values: HashMap::new(),
        }
    }

    pub fn self_value(&self) -> &Value {
        &self.self_value
    }

    /// A copy of this frame with `name` bound to `value`, shadowing any
    /// outer binding of the same name.
    pub fn extend(&self, name: String, value: Value) -> Environment {
        let mut extended = self.clone();
        extended.define(name, value);
        extended
    }

    pub fn define(&mut self, name: String, value: Value) {
        self.values.insert(name, Rc::new(RefCell::new(value)));
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.values.get(name).map(|cell| cell.borrow().clone())
    }

    /// Assign to an existing local. Returns false if `name` is not bound here.
    pub fn assign(&self, name: &str, value: Value) -> bool {
        match self.values.get(name) {
            Some(cell) => {
                *cell.borrow_mut() = value;
                true
            }
            None => false,
        }
    }
}
