//! # isotest builtins
//!
//! Atoms are the native operations scripts call by name.
//!
//! ## Module Structure
//!
//! - **`helpers`**: argument extraction and arity checks shared by all atoms
//! - **`math`**: arithmetic (`+`, `-`, `*`, `/`, `mod`)
//! - **`logic`**: comparison and negation (`=`, `<`, `not`, ...)
//! - **`string`**: `str`, `inspect`, `upcase`, `downcase`, `includes?`
//! - **`collections`**: `list`, `len`, `first`, `rest`, `nth`, `append`, `empty?`
//! - **`execution`**: `raise`, `load`, `print`, `warn`, `env`
//! - **`assertions`**: `assert`, `assert-equal`, `assert-raise`, `flunk`, `success`
//! - **`harness`**: `scope`, `test`, `prepare`, `setup`
//! - **`fixtures`**: `db-reset`, `db-connect`
//!
//! ## Calling conventions
//!
//! `Pure` and `Stateful` atoms receive evaluated arguments. `SpecialForm` atoms
//! receive the unevaluated argument nodes and decide what to evaluate and when.

use im::HashMap;

use crate::errors::{EvalResult, Raise};
use crate::runtime::{Env, Interpreter, Value};
use crate::syntax::{AstNode, Span};

// ============================================================================
// CORE TYPES
// ============================================================================

/// Pure atoms: operate only on values.
pub type PureAtomFn = fn(args: &[Value]) -> Result<Value, Raise>;

/// Stateful atoms: need the interpreter (call stack, reporter, context).
pub type StatefulAtomFn = fn(args: &[Value], interp: &mut Interpreter) -> EvalResult;

/// Special forms: receive unevaluated arguments and the calling namespace.
pub type SpecialFormFn =
    fn(args: &[AstNode], env: &Env, interp: &mut Interpreter, span: Span) -> EvalResult;

#[derive(Clone, Copy)]
pub enum Atom {
    Pure(PureAtomFn),
    Stateful(StatefulAtomFn),
    SpecialForm(SpecialFormFn),
}

/// Registry of every builtin, keyed by the name scripts call it by.
#[derive(Default, Clone)]
pub struct AtomRegistry {
    atoms: HashMap<String, Atom>,
}

impl AtomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every standard builtin.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        register_all_atoms(&mut registry);
        registry
    }

    pub fn get(&self, name: &str) -> Option<Atom> {
        self.atoms.get(name).copied()
    }

    pub fn register(&mut self, name: &str, atom: Atom) {
        self.atoms.insert(name.to_string(), atom);
    }

    pub fn has(&self, name: &str) -> bool {
        self.atoms.contains_key(name)
    }
}

// ============================================================================
// MODULAR ATOM IMPLEMENTATIONS
// ============================================================================

pub mod helpers;

pub mod assertions;
pub mod collections;
pub mod execution;
pub mod fixtures;
pub mod harness;
pub mod logic;
pub mod math;
pub mod string;

/// Registers all standard atoms from all modules with the given registry.
pub fn register_all_atoms(registry: &mut AtomRegistry) {
    math::register_math_atoms(registry);
    logic::register_logic_atoms(registry);
    string::register_string_atoms(registry);
    collections::register_collection_atoms(registry);
    execution::register_execution_atoms(registry);
    assertions::register_assertion_atoms(registry);
    harness::register_harness_atoms(registry);
    fixtures::register_fixture_atoms(registry);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_has_core_builtins() {
        let registry = AtomRegistry::standard();
        for name in [
            "+", "=", "str", "list", "raise", "assert", "assert-equal", "assert-raise", "flunk",
            "success", "scope", "test", "prepare", "setup", "db-reset",
        ] {
            assert!(registry.has(name), "missing builtin {name}");
        }
        assert!(matches!(registry.get("test"), Some(Atom::SpecialForm(_))));
        assert!(matches!(registry.get("+"), Some(Atom::Pure(_))));
    }
}
