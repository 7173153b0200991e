//! # String Operations
//!
//! `str`, `inspect`, `upcase`, `downcase`, `includes?`

use crate::atoms::helpers::{check_arity, expect_string, type_mismatch};
use crate::atoms::{Atom, AtomRegistry, PureAtomFn};
use crate::runtime::Value;

/// Concatenates the display form of every argument.
///
/// Usage: (str <a> <b> ...)
///
/// Example:
///   (str "n=" 3) ; => "n=3"
pub const ATOM_STR: PureAtomFn = |args| {
    Ok(Value::String(args.iter().map(ToString::to_string).collect()))
};

/// Developer-facing rendering of a value; strings come back quoted.
///
/// Usage: (inspect <value>)
pub const ATOM_INSPECT: PureAtomFn = |args| {
    check_arity("inspect", args, 1)?;
    Ok(Value::String(args[0].inspect()))
};

pub const ATOM_UPCASE: PureAtomFn = |args| {
    check_arity("upcase", args, 1)?;
    Ok(Value::String(expect_string("upcase", &args[0])?.to_uppercase()))
};

pub const ATOM_DOWNCASE: PureAtomFn = |args| {
    check_arity("downcase", args, 1)?;
    Ok(Value::String(expect_string("downcase", &args[0])?.to_lowercase()))
};

/// Substring test for strings, membership test for lists.
///
/// Usage: (includes? <string-or-list> <item>)
pub const ATOM_INCLUDES: PureAtomFn = |args| {
    check_arity("includes?", args, 2)?;
    match &args[0] {
        Value::String(haystack) => {
            let needle = expect_string("includes?", &args[1])?;
            Ok(Value::Bool(haystack.contains(needle)))
        }
        Value::List(items) => Ok(Value::Bool(items.contains(&args[1]))),
        other => Err(type_mismatch("includes?", "string or list", other)),
    }
};

pub fn register_string_atoms(registry: &mut AtomRegistry) {
    registry.register("str", Atom::Pure(ATOM_STR));
    registry.register("inspect", Atom::Pure(ATOM_INSPECT));
    registry.register("upcase", Atom::Pure(ATOM_UPCASE));
    registry.register("downcase", Atom::Pure(ATOM_DOWNCASE));
    registry.register("includes?", Atom::Pure(ATOM_INCLUDES));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_str_uses_display_form() {
        let args = [Value::from("n="), Value::Int(3), Value::Nil];
        assert_eq!(ATOM_STR(&args).unwrap(), Value::from("n=3nil"));
    }

    #[test]
    fn test_includes() {
        let list = Value::List(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(ATOM_INCLUDES(&[list, Value::Float(2.0)]).unwrap(), Value::Bool(true));
        assert_eq!(
            ATOM_INCLUDES(&[Value::from("haystack"), Value::from("st")]).unwrap(),
            Value::Bool(true)
        );
    }
}
