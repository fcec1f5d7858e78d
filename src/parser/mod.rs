//! Parser module for building the Abstract Syntax Tree (AST).
//!
//! This module contains the parser that transforms a stream of tokens
//! into a `Program`. Class and feature declarations are parsed by
//! recursive descent; expressions use a Pratt parser with COOL operator
//! precedence and handle:
//!
//! - Dispatch (`e.m()`, `e@T.m()`, `m()`), assignment and `new`
//! - Control flow (`if`, `while`, `case`, blocks and `let`)
//! - Arithmetic, comparison and unary operators
//!
//! The parser uses NUD (null denotation) and LED (left denotation) functions
//! for expression parsing with binding power for precedence handling.

pub mod class;
pub mod expr;
pub mod lookups;
pub mod parser;

#[cfg(test)]
mod tests;
