//! # Comparison and Logic
//!
//! ## Atoms Provided
//!
//! - **Equality**: `=`, `!=`
//! - **Ordering**: `<`, `>`, `<=`, `>=` (numbers or strings, chained)
//! - **Negation**: `not`

use std::cmp::Ordering;

use crate::atoms::helpers::{check_arity, check_min_arity, type_mismatch};
use crate::atoms::{Atom, AtomRegistry, PureAtomFn};
use crate::errors::Raise;
use crate::runtime::Value;

/// True if every argument equals the first.
///
/// Usage: (= <a> <b> ...)
pub const ATOM_EQ: PureAtomFn = |args| {
    check_min_arity("=", args, 2)?;
    Ok(Value::Bool(args.windows(2).all(|w| w[0] == w[1])))
};

/// Usage: (!= <a> <b>)
pub const ATOM_NEQ: PureAtomFn = |args| {
    check_arity("!=", args, 2)?;
    Ok(Value::Bool(args[0] != args[1]))
};

/// Usage: (not <value>)
pub const ATOM_NOT: PureAtomFn = |args| {
    check_arity("not", args, 1)?;
    Ok(Value::Bool(!args[0].is_truthy()))
};

fn compare(name: &str, a: &Value, b: &Value) -> Result<Ordering, Raise> {
    let ordering = match (a, b) {
        (Value::Int(x), Value::Int(y)) => Some(x.cmp(y)),
        (Value::Int(x), Value::Float(y)) => (*x as f64).partial_cmp(y),
        (Value::Float(x), Value::Int(y)) => x.partial_cmp(&(*y as f64)),
        (Value::Float(x), Value::Float(y)) => x.partial_cmp(y),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Int(_) | Value::Float(_) | Value::String(_), other) => {
            return Err(type_mismatch(name, a.type_name(), other))
        }
        (other, _) => return Err(type_mismatch(name, "number or string", other)),
    };
    ordering.ok_or_else(|| Raise::type_error(format!("`{name}` cannot order NaN")))
}

fn chain(name: &str, args: &[Value], accept: fn(Ordering) -> bool) -> Result<Value, Raise> {
    check_min_arity(name, args, 2)?;
    for pair in args.windows(2) {
        if !accept(compare(name, &pair[0], &pair[1])?) {
            return Ok(Value::Bool(false));
        }
    }
    Ok(Value::Bool(true))
}

/// Usage: (< <a> <b> ...)
pub const ATOM_LT: PureAtomFn = |args| chain("<", args, Ordering::is_lt);

/// Usage: (> <a> <b> ...)
pub const ATOM_GT: PureAtomFn = |args| chain(">", args, Ordering::is_gt);

/// Usage: (<= <a> <b> ...)
pub const ATOM_LTE: PureAtomFn = |args| chain("<=", args, Ordering::is_le);

/// Usage: (>= <a> <b> ...)
pub const ATOM_GTE: PureAtomFn = |args| chain(">=", args, Ordering::is_ge);

pub fn register_logic_atoms(registry: &mut AtomRegistry) {
    registry.register("=", Atom::Pure(ATOM_EQ));
    registry.register("!=", Atom::Pure(ATOM_NEQ));
    registry.register("not", Atom::Pure(ATOM_NOT));
    registry.register("<", Atom::Pure(ATOM_LT));
    registry.register(">", Atom::Pure(ATOM_GT));
    registry.register("<=", Atom::Pure(ATOM_LTE));
    registry.register(">=", Atom::Pure(ATOM_GTE));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn test_equality_is_structural() {
        let a = Value::List(vec![Value::Int(1), Value::from("x")]);
        let b = Value::List(vec![Value::Float(1.0), Value::from("x")]);
        assert_eq!(ATOM_EQ(&[a, b]).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_chained_ordering() {
        let args = [Value::Int(1), Value::Float(2.5), Value::Int(3)];
        assert_eq!(ATOM_LT(&args).unwrap(), Value::Bool(true));
        assert_eq!(ATOM_GTE(&args).unwrap(), Value::Bool(false));
        assert_eq!(
            ATOM_LT(&[Value::from("a"), Value::from("b")]).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn test_ordering_mixed_types_is_type_error() {
        let err = ATOM_LT(&[Value::Int(1), Value::from("b")]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeError);
    }
}
