use std::fmt::Display;

use crate::Span;

/// An expression node together with the source range it was parsed from.
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }

    pub fn get_span(&self) -> &Span {
        &self.span
    }
}

/// Expression Kinds
///
/// The closed set of expressions in the language. Both the type checker
/// and the evaluator match on this exhaustively.
#[derive(Debug, Clone)]
pub enum ExprKind {
    Int(i64),
    Str(String),
    Bool(bool),
    SelfRef,
    Identifier(String),
    /// `name <- value`
    Assign {
        name: String,
        value: Box<Expr>,
    },
    /// `receiver[@StaticType].method(args)`, or `method(args)` when the
    /// receiver is implicitly `self`.
    Dispatch {
        receiver: Option<Box<Expr>>,
        static_type: Option<String>,
        method: String,
        arguments: Vec<Expr>,
    },
    New(String),
    If {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    While {
        condition: Box<Expr>,
        body: Box<Expr>,
    },
    Block(Vec<Expr>),
    Let {
        bindings: Vec<LetBinding>,
        body: Box<Expr>,
    },
    Case {
        scrutinee: Box<Expr>,
        branches: Vec<CaseBranch>,
    },
    IsVoid(Box<Expr>),
    Unary {
        operator: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        operator: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Body of a built-in method. Never produced by the parser.
    Builtin(Builtin),
}

#[derive(Debug, Clone)]
pub struct LetBinding {
    pub name: String,
    pub type_name: String,
    pub init: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CaseBranch {
    pub name: String,
    pub type_name: String,
    pub body: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `~e`
    Negate,
    /// `not e`
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Plus,
    Minus,
    Times,
    Divide,
    Less,
    LessEquals,
    Equals,
}

impl BinaryOp {
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOp::Plus | BinaryOp::Minus | BinaryOp::Times | BinaryOp::Divide
        )
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::Times => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Less => "<",
            BinaryOp::LessEquals => "<=",
            BinaryOp::Equals => "=",
        };
        write!(f, "{}", symbol)
    }
}

/// Native primitives backing the methods of the built-in classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Abort,
    TypeName,
    Copy,
    OutString,
    OutInt,
    InString,
    InInt,
    Length,
    Concat,
    Substr,
}
