use std::fmt::Display;

use thiserror::Error;

use crate::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Internal,
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
            Severity::Internal => write!(f, "internal"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
    severity: Severity,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        let severity = match error_impl {
            ErrorImpl::OverrideReturnTypeChanged { .. } => Severity::Warning,
            ErrorImpl::Internal { .. } => Severity::Internal,
            _ => Severity::Error,
        };

        Error {
            internal_error: error_impl,
            position,
            severity,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_severity(&self) -> Severity {
        self.severity
    }

    pub fn get_kind(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self.severity, Severity::Error | Severity::Internal)
    }

    pub fn message(&self) -> String {
        self.internal_error.to_string()
    }

    /// Stable diagnostic code, one per error variant.
    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnterminatedString => "UnterminatedString",
            ErrorImpl::InvalidStringCharacter { .. } => "InvalidStringCharacter",
            ErrorImpl::UnterminatedComment => "UnterminatedComment",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::DuplicateClass { .. } => "DuplicateClass",
            ErrorImpl::BuiltinRedefinition { .. } => "BuiltinRedefinition",
            ErrorImpl::UndefinedParent { .. } => "UndefinedParent",
            ErrorImpl::IllegalInheritance { .. } => "IllegalInheritance",
            ErrorImpl::InheritanceCycle { .. } => "InheritanceCycle",
            ErrorImpl::MissingMainClass => "MissingMainClass",
            ErrorImpl::MissingMainMethod => "MissingMainMethod",
            ErrorImpl::MainMethodHasArguments { .. } => "MainMethodHasArguments",
            ErrorImpl::DuplicateMethod { .. } => "DuplicateMethod",
            ErrorImpl::DuplicateAttribute { .. } => "DuplicateAttribute",
            ErrorImpl::DuplicateFormal { .. } => "DuplicateFormal",
            ErrorImpl::UnknownType { .. } => "UnknownType",
            ErrorImpl::SelfTypeNotAllowed { .. } => "SelfTypeNotAllowed",
            ErrorImpl::InheritedAttributeRedefined { .. } => "InheritedAttributeRedefined",
            ErrorImpl::OverrideArityMismatch { .. } => "OverrideArityMismatch",
            ErrorImpl::OverrideParameterMismatch { .. } => "OverrideParameterMismatch",
            ErrorImpl::OverrideReturnTypeChanged { .. } => "OverrideReturnTypeChanged",
            ErrorImpl::IllegalSelfBinding { .. } => "IllegalSelfBinding",
            ErrorImpl::VariableNotDeclared { .. } => "VariableNotDeclared",
            ErrorImpl::TypeMatchError { .. } => "TypeMatchError",
            ErrorImpl::ArgumentTypeMatchError { .. } => "ArgumentTypeMatchError",
            ErrorImpl::UnexpectedArguments { .. } => "UnexpectedArguments",
            ErrorImpl::UndefinedMethod { .. } => "UndefinedMethod",
            ErrorImpl::DuplicateCaseBranch { .. } => "DuplicateCaseBranch",
            ErrorImpl::Abort { .. } => "Abort",
            ErrorImpl::DivisionByZero => "DivisionByZero",
            ErrorImpl::DispatchOnVoid { .. } => "DispatchOnVoid",
            ErrorImpl::CaseOnVoid => "CaseOnVoid",
            ErrorImpl::NoMatchingBranch { .. } => "NoMatchingBranch",
            ErrorImpl::SubstringOutOfRange { .. } => "SubstringOutOfRange",
            ErrorImpl::CircularInitialization { .. } => "CircularInitialization",
            ErrorImpl::ConstructionDepthExceeded { .. } => "ConstructionDepthExceeded",
            ErrorImpl::CallDepthExceeded { .. } => "CallDepthExceeded",
            ErrorImpl::Internal { .. } => "Internal",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, did you miss a semicolon?",
                token
            )),
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::BuiltinRedefinition { class } => ErrorTip::Suggestion(format!(
                "`{}` is a built-in class, pick another name",
                class
            )),
            ErrorImpl::IllegalInheritance { parent, .. } => ErrorTip::Suggestion(format!(
                "`{}` is final, inherit from `Object` or another class instead",
                parent
            )),
            ErrorImpl::MissingMainClass => {
                ErrorTip::Suggestion(String::from("Declare `class Main { main(): Object { ... }; };`"))
            }
            ErrorImpl::InheritedAttributeRedefined { attribute, .. } => {
                ErrorTip::Suggestion(format!("Attribute `{}` cannot be shadowed, rename it", attribute))
            }
            ErrorImpl::VariableNotDeclared { variable } => {
                ErrorTip::Suggestion(format!("Variable `{}` not declared", variable))
            }
            ErrorImpl::UnexpectedArguments { expected, received, .. } => ErrorTip::Suggestion(
                format!("Expected {} arguments, received {}", expected, received),
            ),
            ErrorImpl::DispatchOnVoid { method } => ErrorTip::Suggestion(format!(
                "Guard the call to `{}` with `isvoid`",
                method
            )),
            ErrorImpl::CircularInitialization { class } => ErrorTip::Suggestion(format!(
                "An attribute initializer of `{}` creates another `{}`",
                class, class
            )),
            _ => ErrorTip::None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}[{}]: {}",
            self.position,
            self.severity,
            self.get_error_name(),
            self.internal_error
        )
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    // Lexing and parsing
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("string literal contains an invalid character: {character}")]
    InvalidStringCharacter { character: String },
    #[error("unterminated comment")]
    UnterminatedComment,
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },

    // Class registration and inheritance graph
    #[error("class {class} is defined more than once")]
    DuplicateClass { class: String },
    #[error("built-in class {class} cannot be redefined")]
    BuiltinRedefinition { class: String },
    #[error("class {class} inherits from undefined class {parent}")]
    UndefinedParent { class: String, parent: String },
    #[error("class {class} cannot inherit from {parent}")]
    IllegalInheritance { class: String, parent: String },
    #[error("class {class}, or one of its ancestors, is part of an inheritance cycle")]
    InheritanceCycle { class: String },
    #[error("program has no class Main")]
    MissingMainClass,
    #[error("class Main has no method main")]
    MissingMainMethod,
    #[error("method Main.main must take no arguments, found {count}")]
    MainMethodHasArguments { count: usize },
    #[error("method {method} is defined more than once in class {class}")]
    DuplicateMethod { class: String, method: String },
    #[error("attribute {attribute} is defined more than once in class {class}")]
    DuplicateAttribute { class: String, attribute: String },
    #[error("formal parameter {formal} is declared more than once in method {method}")]
    DuplicateFormal { method: String, formal: String },

    // Type checking
    #[error("unknown type {type_}")]
    UnknownType { type_: String },
    #[error("SELF_TYPE is not allowed as the type of {context}")]
    SelfTypeNotAllowed { context: String },
    #[error("attribute {attribute} of class {class} is already defined by ancestor {ancestor}")]
    InheritedAttributeRedefined {
        class: String,
        attribute: String,
        ancestor: String,
    },
    #[error("method {method} overrides {ancestor}.{method} with {received} parameters instead of {expected}")]
    OverrideArityMismatch {
        method: String,
        ancestor: String,
        expected: usize,
        received: usize,
    },
    #[error("parameter {index} of method {method} has type {received}, but {ancestor}.{method} declares {expected}")]
    OverrideParameterMismatch {
        method: String,
        ancestor: String,
        index: usize,
        expected: String,
        received: String,
    },
    #[error("method {method} returns {received}, but overridden {ancestor}.{method} returns {expected}")]
    OverrideReturnTypeChanged {
        method: String,
        ancestor: String,
        expected: String,
        received: String,
    },
    #[error("'self' cannot be {usage}")]
    IllegalSelfBinding { usage: String },
    #[error("undefined variable {variable}")]
    VariableNotDeclared { variable: String },
    #[error("{context}: expected type {expected}, received {received}")]
    TypeMatchError {
        context: String,
        expected: String,
        received: String,
    },
    #[error("argument {index} of {method}: expected type {expected}, received {received}")]
    ArgumentTypeMatchError {
        method: String,
        index: usize,
        expected: String,
        received: String,
    },
    #[error("method {method} expects {expected} arguments, received {received}")]
    UnexpectedArguments {
        method: String,
        expected: usize,
        received: usize,
    },
    #[error("undefined method {method} in type {class}")]
    UndefinedMethod { class: String, method: String },
    #[error("type {type_} appears in more than one case branch")]
    DuplicateCaseBranch { type_: String },

    // Evaluation
    #[error("abort called from class {class}")]
    Abort { class: String },
    #[error("division by zero")]
    DivisionByZero,
    #[error("dispatch of {method} on void")]
    DispatchOnVoid { method: String },
    #[error("case on void")]
    CaseOnVoid,
    #[error("no case branch matches runtime type {class}")]
    NoMatchingBranch { class: String },
    #[error("substr({start}, {length}) is out of range for a string of length {size}")]
    SubstringOutOfRange { start: i64, length: i64, size: usize },
    #[error("circular initialization: class {class} is already under construction")]
    CircularInitialization { class: String },
    #[error("object construction nested deeper than {limit}")]
    ConstructionDepthExceeded { limit: usize },
    #[error("method call depth exceeded {limit}")]
    CallDepthExceeded { limit: usize },
    #[error("internal error: {message}")]
    Internal { message: String },
}
