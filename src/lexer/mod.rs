//! Lexical analysis module.
//!
//! This module contains the lexer (tokenizer) that converts COOL source
//! code into a stream of tokens for parsing. It handles:
//!
//! - Tokenization of source code using an ordered table of regex patterns
//! - Case-insensitive keywords, type and object identifiers, literals and operators
//! - Line and column tracking for error reporting
//! - Line comments and nested block comments

pub mod lexer;
pub mod tokens;
