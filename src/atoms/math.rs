//! # Arithmetic
//!
//! Pure atoms over integers and floats. Integer operands stay integral; mixing in
//! a float promotes the result.
//!
//! ## Atoms Provided
//!
//! - `+`, `-`, `*`, `/`, `mod`

use crate::atoms::helpers::{check_arity, check_min_arity, expect_number, Number};
use crate::atoms::{Atom, AtomRegistry, PureAtomFn};
use crate::errors::{ErrorKind, Raise};
use crate::runtime::Value;

// ============================================================================
// ARITHMETIC OPERATIONS
// ============================================================================

fn overflow(name: &str) -> Raise {
    Raise::new(ErrorKind::ArithmeticError, format!("integer overflow in `{name}`"))
}

fn divided_by_zero() -> Raise {
    Raise::new(ErrorKind::ZeroDivisionError, "divided by 0")
}

fn fold_numbers(
    name: &str,
    args: &[Value],
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, Raise> {
    let mut acc = expect_number(name, &args[0])?;
    for arg in &args[1..] {
        let rhs = expect_number(name, arg)?;
        acc = match (acc, rhs) {
            (Number::Int(a), Number::Int(b)) => Number::Int(int_op(a, b).ok_or_else(|| overflow(name))?),
            (a, b) => Number::Float(float_op(a.as_f64(), b.as_f64())),
        };
    }
    Ok(acc.into())
}

/// Adds numbers.
///
/// Usage: (+ <a> <b> ...)
///
/// Example:
///   (+ 1 2 3) ; => 6
pub const ATOM_ADD: PureAtomFn = |args| {
    if args.is_empty() {
        return Ok(Value::Int(0));
    }
    fold_numbers("+", args, i64::checked_add, |a, b| a + b)
};

/// Subtracts numbers left to right; with one argument, negates it.
///
/// Usage: (- <a> <b> ...)
pub const ATOM_SUB: PureAtomFn = |args| {
    check_min_arity("-", args, 1)?;
    if let [only] = args {
        return match expect_number("-", only)? {
            Number::Int(n) => n.checked_neg().map(Value::Int).ok_or_else(|| overflow("-")),
            Number::Float(n) => Ok(Value::Float(-n)),
        };
    }
    fold_numbers("-", args, i64::checked_sub, |a, b| a - b)
};

/// Multiplies numbers.
///
/// Usage: (* <a> <b> ...)
pub const ATOM_MUL: PureAtomFn = |args| {
    if args.is_empty() {
        return Ok(Value::Int(1));
    }
    fold_numbers("*", args, i64::checked_mul, |a, b| a * b)
};

/// Divides numbers left to right. Integer division truncates.
///
/// Usage: (/ <a> <b> ...)
pub const ATOM_DIV: PureAtomFn = |args| {
    check_min_arity("/", args, 2)?;
    for divisor in &args[1..] {
        if expect_number("/", divisor)?.is_zero() {
            return Err(divided_by_zero());
        }
    }
    fold_numbers("/", args, i64::checked_div, |a, b| a / b)
};

/// Remainder of integer or float division.
///
/// Usage: (mod <a> <b>)
pub const ATOM_MOD: PureAtomFn = |args| {
    check_arity("mod", args, 2)?;
    let a = expect_number("mod", &args[0])?;
    let b = expect_number("mod", &args[1])?;
    if b.is_zero() {
        return Err(divided_by_zero());
    }
    match (a, b) {
        (Number::Int(a), Number::Int(b)) => a.checked_rem(b).map(Value::Int).ok_or_else(|| overflow("mod")),
        (a, b) => Ok(Value::Float(a.as_f64() % b.as_f64())),
    }
};

// ============================================================================
// REGISTRATION FUNCTION
// ============================================================================

pub fn register_math_atoms(registry: &mut AtomRegistry) {
    registry.register("+", Atom::Pure(ATOM_ADD));
    registry.register("-", Atom::Pure(ATOM_SUB));
    registry.register("*", Atom::Pure(ATOM_MUL));
    registry.register("/", Atom::Pure(ATOM_DIV));
    registry.register("mod", Atom::Pure(ATOM_MOD));
}
