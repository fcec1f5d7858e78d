//! Subtyping over the class hierarchy.

use std::collections::HashSet;

use crate::registry::{builtins::OBJECT, registry::ClassRegistry};

/// `sub <: sup`: equal types, `sup` is `Object`, or `sup` is on `sub`'s
/// ancestor chain.
pub fn conforms(registry: &ClassRegistry, sub: &str, sup: &str) -> bool {
    if sub == sup || sup == OBJECT {
        return true;
    }

    registry
        .ancestors(sub)
        .iter()
        .any(|ancestor| ancestor.name == sup)
}

/// Least common ancestor of `a` and `b`.
pub fn join(registry: &ClassRegistry, a: &str, b: &str) -> String {
    if a == b {
        return a.to_string();
    }

    let chain: HashSet<String> = registry
        .ancestors(a)
        .iter()
        .map(|ancestor| ancestor.name.clone())
        .collect();

    registry
        .ancestors(b)
        .iter()
        .find(|ancestor| chain.contains(&ancestor.name))
        .map(|ancestor| ancestor.name.clone())
        .unwrap_or_else(|| OBJECT.to_string())
}
