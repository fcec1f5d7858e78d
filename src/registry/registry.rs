use std::{
    collections::{HashMap, HashSet},
    rc::Rc,
};

use crate::{
    ast::{ast::ClassDecl, expressions::Expr},
    errors::errors::{Error, ErrorImpl},
    Span,
};

use super::builtins::{builtin_classes, is_builtin_name, OBJECT};

#[derive(Debug, Clone)]
pub struct FormalDescriptor {
    pub name: String,
    pub type_name: String,
}

#[derive(Debug, Clone)]
pub struct MethodDescriptor {
    pub name: String,
    /// May be the literal `SELF_TYPE`.
    pub return_type: String,
    pub formals: Vec<FormalDescriptor>,
    /// User body, or an `ExprKind::Builtin` marker for the built-in classes.
    pub body: Rc<Expr>,
    pub span: Span,
}

impl MethodDescriptor {
    pub fn arity(&self) -> usize {
        self.formals.len()
    }
}

#[derive(Debug, Clone)]
pub struct AttributeDescriptor {
    pub name: String,
    pub type_name: String,
    pub init: Option<Rc<Expr>>,
    /// Position among the class's own attributes, in source order.
    pub index: usize,
    pub span: Span,
}

/// A registered class. Immutable once it is in the registry.
#[derive(Debug, Clone)]
pub struct ClassDescriptor {
    pub name: String,
    /// `None` only for `Object`.
    pub parent: Option<String>,
    pub attributes: Vec<AttributeDescriptor>,
    pub methods: HashMap<String, Rc<MethodDescriptor>>,
    pub span: Span,
}

impl ClassDescriptor {
    /// Builds a descriptor from a parsed class. Duplicate attribute, method
    /// and formal names are reported and only the first declaration is kept.
    pub fn from_decl(decl: &ClassDecl) -> (ClassDescriptor, Vec<Error>) {
        let mut errors = vec![];
        let mut attributes: Vec<AttributeDescriptor> = vec![];
        let mut methods: HashMap<String, Rc<MethodDescriptor>> = HashMap::new();

        for attribute in decl.attributes() {
            if attributes.iter().any(|existing| existing.name == attribute.name) {
                errors.push(Error::new(
                    ErrorImpl::DuplicateAttribute {
                        class: decl.name.clone(),
                        attribute: attribute.name.clone(),
                    },
                    attribute.span.start.clone(),
                ));
                continue;
            }

            attributes.push(AttributeDescriptor {
                name: attribute.name.clone(),
                type_name: attribute.type_name.clone(),
                init: attribute.init.clone().map(Rc::new),
                index: attributes.len(),
                span: attribute.span.clone(),
            });
        }

        for method in decl.methods() {
            if methods.contains_key(&method.name) {
                errors.push(Error::new(
                    ErrorImpl::DuplicateMethod {
                        class: decl.name.clone(),
                        method: method.name.clone(),
                    },
                    method.span.start.clone(),
                ));
                continue;
            }

            let mut formals: Vec<FormalDescriptor> = vec![];
            for formal in &method.formals {
                if formals.iter().any(|existing| existing.name == formal.name) {
                    errors.push(Error::new(
                        ErrorImpl::DuplicateFormal {
                            method: method.name.clone(),
                            formal: formal.name.clone(),
                        },
                        formal.span.start.clone(),
                    ));
                    continue;
                }
                formals.push(FormalDescriptor {
                    name: formal.name.clone(),
                    type_name: formal.type_name.clone(),
                });
            }

            methods.insert(
                method.name.clone(),
                Rc::new(MethodDescriptor {
                    name: method.name.clone(),
                    return_type: method.return_type.clone(),
                    formals,
                    body: Rc::new(method.body.clone()),
                    span: method.span.clone(),
                }),
            );
        }

        let descriptor = ClassDescriptor {
            name: decl.name.clone(),
            parent: Some(decl.parent.clone().unwrap_or_else(|| String::from(OBJECT))),
            attributes,
            methods,
            span: decl.span.clone(),
        };

        (descriptor, errors)
    }

    /// Methods in declaration order.
    pub fn methods_in_order(&self) -> Vec<&Rc<MethodDescriptor>> {
        let mut methods: Vec<_> = self.methods.values().collect();
        methods.sort_by_key(|method| (method.span.start.line, method.span.start.column, method.name.clone()));
        methods
    }
}

/// Every known class, keyed by name. Parents are stored by name and
/// resolved through the registry.
#[derive(Debug)]
pub struct ClassRegistry {
    classes: HashMap<String, Rc<ClassDescriptor>>,
    /// Registration order, built-ins first.
    order: Vec<String>,
}

impl ClassRegistry {
    /// A registry holding only the built-in classes.
    pub fn new() -> Self {
        let mut registry = ClassRegistry {
            classes: HashMap::new(),
            order: vec![],
        };

        for class in builtin_classes() {
            registry.order.push(class.name.clone());
            registry.classes.insert(class.name.clone(), Rc::new(class));
        }

        registry
    }

    pub fn register(&mut self, class: ClassDescriptor) -> Result<(), Error> {
        if is_builtin_name(&class.name) {
            return Err(Error::new(
                ErrorImpl::BuiltinRedefinition { class: class.name },
                class.span.start,
            ));
        }

        if self.classes.contains_key(&class.name) {
            return Err(Error::new(
                ErrorImpl::DuplicateClass { class: class.name },
                class.span.start,
            ));
        }

        self.order.push(class.name.clone());
        self.classes.insert(class.name.clone(), Rc::new(class));
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<Rc<ClassDescriptor>> {
        self.classes.get(name).cloned()
    }

    pub fn parent_of(&self, name: &str) -> Option<&str> {
        self.classes.get(name).and_then(|class| class.parent.as_deref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// All classes in registration order.
    pub fn classes(&self) -> impl Iterator<Item = &Rc<ClassDescriptor>> {
        self.order.iter().filter_map(|name| self.classes.get(name))
    }

    /// User-defined classes in source order.
    pub fn user_classes(&self) -> impl Iterator<Item = &Rc<ClassDescriptor>> {
        self.classes().filter(|class| !is_builtin_name(&class.name))
    }

    /// `name` followed by its ancestors, ending at `Object`. The walk stops
    /// early at an unregistered parent or when a class repeats.
    pub fn ancestors(&self, name: &str) -> Vec<Rc<ClassDescriptor>> {
        let mut chain = vec![];
        let mut seen = HashSet::new();
        let mut current = self.classes.get(name);

        while let Some(class) = current {
            if !seen.insert(class.name.as_str()) {
                break;
            }
            chain.push(Rc::clone(class));
            current = class.parent.as_ref().and_then(|parent| self.classes.get(parent));
        }

        chain
    }

    /// Finds `method` on `class` or the nearest ancestor defining it, along
    /// with the name of the defining class.
    pub fn find_method(&self, class: &str, method: &str) -> Option<(String, Rc<MethodDescriptor>)> {
        self.ancestors(class).into_iter().find_map(|ancestor| {
            ancestor
                .methods
                .get(method)
                .map(|found| (ancestor.name.clone(), Rc::clone(found)))
        })
    }

    /// Finds an attribute visible in `class`, along with the defining class.
    pub fn find_attribute(&self, class: &str, attribute: &str) -> Option<(String, AttributeDescriptor)> {
        self.ancestors(class).into_iter().find_map(|ancestor| {
            ancestor
                .attributes
                .iter()
                .find(|candidate| candidate.name == attribute)
                .map(|found| (ancestor.name.clone(), found.clone()))
        })
    }
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}
