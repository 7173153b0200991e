//! Lexical namespaces.
//!
//! Each scope body, test body and function call evaluates in a child of the
//! namespace it was entered from; lookups walk the parent chain.

use std::{cell::RefCell, collections::HashMap, fmt, rc::Rc};

use crate::runtime::Value;

#[derive(Default)]
struct Namespace {
    bindings: HashMap<String, Value>,
    parent: Option<Env>,
}

/// A shared handle to a namespace.
#[derive(Clone, Default)]
pub struct Env(Rc<RefCell<Namespace>>);

impl Env {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(&self) -> Self {
        Env(Rc::new(RefCell::new(Namespace {
            bindings: HashMap::new(),
            parent: Some(self.clone()),
        })))
    }

    /// Binds `name` in this namespace. Returns true if it replaced an existing
    /// binding of the same namespace.
    pub fn define(&self, name: impl Into<String>, value: Value) -> bool {
        self.0
            .borrow_mut()
            .bindings
            .insert(name.into(), value)
            .is_some()
    }

    pub fn lookup(&self, name: &str) -> Option<Value> {
        let namespace = self.0.borrow();
        match namespace.bindings.get(name) {
            Some(value) => Some(value.clone()),
            None => namespace.parent.as_ref()?.lookup(name),
        }
    }

    /// Updates the nearest existing binding. Returns false if `name` is unbound.
    pub fn assign(&self, name: &str, value: Value) -> bool {
        let mut namespace = self.0.borrow_mut();
        if let Some(slot) = namespace.bindings.get_mut(name) {
            *slot = value;
            return true;
        }
        match &namespace.parent {
            Some(parent) => parent.assign(name, value),
            None => false,
        }
    }

    pub fn is_bound(&self, name: &str) -> bool {
        let namespace = self.0.borrow();
        namespace.bindings.contains_key(name)
            || namespace
                .parent
                .as_ref()
                .is_some_and(|parent| parent.is_bound(name))
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let namespace = self.0.borrow();
        f.debug_struct("Env")
            .field("bindings", &namespace.bindings.len())
            .field("has_parent", &namespace.parent.is_some())
            .finish()
    }
}
