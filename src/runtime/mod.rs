//! Runtime value model.
//!
//! Values are a closed enum. User objects share a mutable attribute store;
//! primitives are immutable. [`class::ClassTable`] resolves every registered
//! class once so dispatch and `case` never go back to the registry.

pub mod class;
pub mod environment;
pub mod value;
