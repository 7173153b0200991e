//! # Collection Operations
//!
//! Lists are immutable values; every operation returns a new list.
//!
//! ## Atoms Provided
//!
//! - `list`, `len`, `first`, `rest`, `nth`, `append`, `empty?`

use crate::atoms::helpers::{check_arity, check_min_arity, expect_int, expect_list, type_mismatch};
use crate::atoms::{Atom, AtomRegistry, PureAtomFn};
use crate::runtime::Value;

/// Usage: (list <a> <b> ...)
pub const ATOM_LIST: PureAtomFn = |args| Ok(Value::List(args.to_vec()));

/// Length of a list or string (in characters).
///
/// Usage: (len <list-or-string>)
pub const ATOM_LEN: PureAtomFn = |args| {
    check_arity("len", args, 1)?;
    let len = match &args[0] {
        Value::List(items) => items.len(),
        Value::String(s) => s.chars().count(),
        other => return Err(type_mismatch("len", "list or string", other)),
    };
    Ok(Value::Int(len as i64))
};

/// First element, or nil for an empty list.
///
/// Usage: (first <list>)
pub const ATOM_FIRST: PureAtomFn = |args| {
    check_arity("first", args, 1)?;
    Ok(expect_list("first", &args[0])?.first().cloned().unwrap_or_default())
};

/// Every element but the first.
///
/// Usage: (rest <list>)
pub const ATOM_REST: PureAtomFn = |args| {
    check_arity("rest", args, 1)?;
    let items = expect_list("rest", &args[0])?;
    Ok(Value::List(items.iter().skip(1).cloned().collect()))
};

/// Element at a zero-based index, or nil when out of range.
///
/// Usage: (nth <list> <index>)
pub const ATOM_NTH: PureAtomFn = |args| {
    check_arity("nth", args, 2)?;
    let items = expect_list("nth", &args[0])?;
    let index = expect_int("nth", &args[1])?;
    Ok(usize::try_from(index)
        .ok()
        .and_then(|i| items.get(i))
        .cloned()
        .unwrap_or_default())
};

/// A new list with the remaining arguments appended.
///
/// Usage: (append <list> <item> ...)
pub const ATOM_APPEND: PureAtomFn = |args| {
    check_min_arity("append", args, 1)?;
    let mut items = expect_list("append", &args[0])?.to_vec();
    items.extend_from_slice(&args[1..]);
    Ok(Value::List(items))
};

/// Usage: (empty? <list-or-string>)
pub const ATOM_EMPTY: PureAtomFn = |args| {
    check_arity("empty?", args, 1)?;
    match &args[0] {
        Value::List(items) => Ok(Value::Bool(items.is_empty())),
        Value::String(s) => Ok(Value::Bool(s.is_empty())),
        Value::Nil => Ok(Value::Bool(true)),
        other => Err(type_mismatch("empty?", "list or string", other)),
    }
};

pub fn register_collection_atoms(registry: &mut AtomRegistry) {
    registry.register("list", Atom::Pure(ATOM_LIST));
    registry.register("len", Atom::Pure(ATOM_LEN));
    registry.register("first", Atom::Pure(ATOM_FIRST));
    registry.register("rest", Atom::Pure(ATOM_REST));
    registry.register("nth", Atom::Pure(ATOM_NTH));
    registry.register("append", Atom::Pure(ATOM_APPEND));
    registry.register("empty?", Atom::Pure(ATOM_EMPTY));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Value {
        Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
    }

    #[test]
    fn test_accessors() {
        assert_eq!(ATOM_FIRST(&[sample()]).unwrap(), Value::Int(1));
        assert_eq!(ATOM_NTH(&[sample(), Value::Int(2)]).unwrap(), Value::Int(3));
        assert_eq!(ATOM_NTH(&[sample(), Value::Int(9)]).unwrap(), Value::Nil);
        assert_eq!(ATOM_NTH(&[sample(), Value::Int(-1)]).unwrap(), Value::Nil);
        assert_eq!(ATOM_FIRST(&[Value::List(vec![])]).unwrap(), Value::Nil);
    }

    #[test]
    fn test_append_returns_new_list() {
        let original = sample();
        let appended = ATOM_APPEND(&[original.clone(), Value::Int(4)]).unwrap();
        assert_eq!(ATOM_LEN(&[appended]).unwrap(), Value::Int(4));
        assert_eq!(ATOM_LEN(&[original]).unwrap(), Value::Int(3));
    }

    #[test]
    fn test_rest_and_empty() {
        let rest = ATOM_REST(&[sample()]).unwrap();
        assert_eq!(rest, Value::List(vec![Value::Int(2), Value::Int(3)]));
        assert_eq!(ATOM_EMPTY(&[Value::List(vec![])]).unwrap(), Value::Bool(true));
        assert_eq!(ATOM_EMPTY(&[Value::from("x")]).unwrap(), Value::Bool(false));
    }
}
