//! Tree-walking evaluation of type-checked programs.
//!
//! The [`Interpreter`](interpreter::Interpreter) owns the evaluation context;
//! expression evaluation lives in `expr`, native method bodies in `builtins`.
//! The first runtime error ends the run.

pub mod builtins;
pub mod expr;
pub mod interpreter;

#[cfg(test)]
mod tests;
