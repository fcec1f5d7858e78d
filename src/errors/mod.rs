//! Error types and error handling for the interpreter.
//!
//! This module defines the error type shared by every phase:
//!
//! - Error structures with source position and severity
//! - Specific error variants for lexing, parsing, semantic analysis and evaluation
//! - Stable diagnostic codes and optional suggestions

pub mod errors;
