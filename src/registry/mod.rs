//! Class registry and inheritance graph validation.
//!
//! The registry stores one immutable descriptor per class, keyed by name,
//! and is pre-seeded with `Object`, `IO`, `Int`, `String` and `Bool`.
//! `inheritance::build_registry` registers user classes and checks the
//! graph: duplicates, redefined built-ins, unknown or final parents,
//! cycles and the `Main.main` entry point.

pub mod builtins;
pub mod inheritance;
pub mod registry;

#[cfg(test)]
mod tests;
