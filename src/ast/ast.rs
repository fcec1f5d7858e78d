use crate::Span;

use super::expressions::Expr;

/// A whole program: every class declared in one source file.
#[derive(Debug, Clone)]
pub struct Program {
    pub classes: Vec<ClassDecl>,
}

/// Class Declaration
/// `class Name [inherits Parent] { features }`
#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub name: String,
    pub parent: Option<String>,
    pub features: Vec<Feature>,
    pub span: Span,
}

impl ClassDecl {
    pub fn attributes(&self) -> impl Iterator<Item = &AttributeDecl> {
        self.features.iter().filter_map(|feature| match feature {
            Feature::Attribute(attribute) => Some(attribute),
            Feature::Method(_) => None,
        })
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.features.iter().filter_map(|feature| match feature {
            Feature::Method(method) => Some(method),
            Feature::Attribute(_) => None,
        })
    }
}

#[derive(Debug, Clone)]
pub enum Feature {
    Attribute(AttributeDecl),
    Method(MethodDecl),
}

/// Attribute Declaration
/// `name : Type [<- init]`
#[derive(Debug, Clone)]
pub struct AttributeDecl {
    pub name: String,
    pub type_name: String,
    pub init: Option<Expr>,
    pub span: Span,
}

/// Method Declaration
/// `name(formals) : ReturnType { body }`
#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub name: String,
    pub formals: Vec<Formal>,
    pub return_type: String,
    pub body: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Formal {
    pub name: String,
    pub type_name: String,
    pub span: Span,
}
