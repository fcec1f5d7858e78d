use std::{collections::HashMap, rc::Rc};

use crate::{
    ast::expressions::{Builtin, Expr, ExprKind},
    Span,
};

use super::registry::{ClassDescriptor, FormalDescriptor, MethodDescriptor};

pub const OBJECT: &str = "Object";
pub const IO: &str = "IO";
pub const INT: &str = "Int";
pub const STRING: &str = "String";
pub const BOOL: &str = "Bool";
pub const SELF_TYPE: &str = "SELF_TYPE";
pub const MAIN_CLASS: &str = "Main";
pub const MAIN_METHOD: &str = "main";

pub const BUILTIN_CLASSES: [&str; 5] = [OBJECT, IO, INT, STRING, BOOL];

/// Built-in classes that cannot be inherited from.
pub const FINAL_CLASSES: [&str; 3] = [INT, STRING, BOOL];

/// Names no user class may take.
pub fn is_builtin_name(name: &str) -> bool {
    BUILTIN_CLASSES.contains(&name) || name == SELF_TYPE
}

fn method(name: &str, formals: &[(&str, &str)], return_type: &str, builtin: Builtin) -> (String, Rc<MethodDescriptor>) {
    let descriptor = MethodDescriptor {
        name: name.to_string(),
        return_type: return_type.to_string(),
        formals: formals
            .iter()
            .map(|(name, type_name)| FormalDescriptor {
                name: name.to_string(),
                type_name: type_name.to_string(),
            })
            .collect(),
        body: Rc::new(Expr::new(ExprKind::Builtin(builtin), Span::null())),
        span: Span::null(),
    };

    (name.to_string(), Rc::new(descriptor))
}

fn class(name: &str, parent: Option<&str>, methods: Vec<(String, Rc<MethodDescriptor>)>) -> ClassDescriptor {
    ClassDescriptor {
        name: name.to_string(),
        parent: parent.map(String::from),
        attributes: vec![],
        methods: methods.into_iter().collect::<HashMap<_, _>>(),
        span: Span::null(),
    }
}

/// The five classes every registry starts with.
pub fn builtin_classes() -> Vec<ClassDescriptor> {
    vec![
        class(
            OBJECT,
            None,
            vec![
                method("abort", &[], OBJECT, Builtin::Abort),
                method("type_name", &[], STRING, Builtin::TypeName),
                method("copy", &[], SELF_TYPE, Builtin::Copy),
            ],
        ),
        class(
            IO,
            Some(OBJECT),
            vec![
                method("out_string", &[("x", STRING)], SELF_TYPE, Builtin::OutString),
                method("out_int", &[("x", INT)], SELF_TYPE, Builtin::OutInt),
                method("in_string", &[], STRING, Builtin::InString),
                method("in_int", &[], INT, Builtin::InInt),
            ],
        ),
        class(INT, Some(OBJECT), vec![]),
        class(
            STRING,
            Some(OBJECT),
            vec![
                method("length", &[], INT, Builtin::Length),
                method("concat", &[("s", STRING)], STRING, Builtin::Concat),
                method("substr", &[("i", INT), ("l", INT)], STRING, Builtin::Substr),
            ],
        ),
        class(BOOL, Some(OBJECT), vec![]),
    ]
}
