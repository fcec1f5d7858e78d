//! Static type checking of COOL programs.
//!
//! Runs over a validated [`ClassRegistry`](crate::registry::registry::ClassRegistry):
//!
//! - Attribute and method declarations use known types
//! - Overrides keep the overridden signature
//! - Every expression has a type conforming to where it is used
//!
//! `SELF_TYPE` is resolved to the class being checked, and a dispatch
//! returning `SELF_TYPE` takes the receiver's static type.

pub mod conformance;
pub mod expr;
pub mod type_checker;
