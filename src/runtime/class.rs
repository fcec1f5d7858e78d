use std::{collections::HashMap, rc::Rc};

use crate::registry::registry::{AttributeDescriptor, ClassDescriptor, ClassRegistry, MethodDescriptor};

/// A registered class resolved for execution: its ancestor chain and the
/// full attribute layout of its instances.
#[derive(Debug)]
pub struct RuntimeClass {
    pub name: String,
    /// The class itself first, `Object` last.
    pub ancestors: Vec<Rc<ClassDescriptor>>,
    /// Inherited attributes root-to-leaf, then the class's own, each in
    /// source order.
    pub layout: Vec<AttributeDescriptor>,
}

impl RuntimeClass {
    fn resolve(registry: &ClassRegistry, name: &str) -> Self {
        let ancestors = registry.ancestors(name);

        let mut layout: Vec<AttributeDescriptor> = vec![];
        for class in ancestors.iter().rev() {
            for attribute in &class.attributes {
                if !layout.iter().any(|slot| slot.name == attribute.name) {
                    layout.push(attribute.clone());
                }
            }
        }

        RuntimeClass {
            name: name.to_string(),
            ancestors,
            layout,
        }
    }

    /// Distance from this class up to `ancestor`, if it is one.
    pub fn distance_to(&self, ancestor: &str) -> Option<usize> {
        self.ancestors.iter().position(|class| class.name == ancestor)
    }

    /// The nearest method named `name` taking `arity` arguments.
    pub fn find_method(&self, name: &str, arity: usize) -> Option<Rc<MethodDescriptor>> {
        self.ancestors.iter().find_map(|class| {
            class
                .methods
                .get(name)
                .filter(|method| method.arity() == arity)
                .cloned()
        })
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.layout.iter().any(|slot| slot.name == name)
    }
}

/// Every class of a registry, resolved once at interpreter setup.
#[derive(Debug, Default)]
pub struct ClassTable {
    classes: HashMap<String, Rc<RuntimeClass>>,
}

impl ClassTable {
    pub fn from_registry(registry: &ClassRegistry) -> Self {
        let classes = registry
            .classes()
            .map(|class| {
                (
                    class.name.clone(),
                    Rc::new(RuntimeClass::resolve(registry, &class.name)),
                )
            })
            .collect();

        ClassTable { classes }
    }

    pub fn get(&self, name: &str) -> Option<Rc<RuntimeClass>> {
        self.classes.get(name).cloned()
    }
}
