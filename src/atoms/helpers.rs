//! Argument extraction and arity checks shared by the builtins.

use crate::errors::{ErrorKind, Raise};
use crate::runtime::Value;

/// A numeric argument, kept integral when possible.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Float(n) => n,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Number::Int(n) => n == 0,
            Number::Float(n) => n == 0.0,
        }
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        match n {
            Number::Int(i) => Value::Int(i),
            Number::Float(f) => Value::Float(f),
        }
    }
}

pub fn check_arity(name: &str, args: &[Value], expected: usize) -> Result<(), Raise> {
    if args.len() != expected {
        return Err(Raise::arity(name, args.len(), &expected.to_string()));
    }
    Ok(())
}

pub fn check_min_arity(name: &str, args: &[Value], min: usize) -> Result<(), Raise> {
    if args.len() < min {
        return Err(Raise::arity(name, args.len(), &format!("{min}+")));
    }
    Ok(())
}

pub fn expect_number(name: &str, value: &Value) -> Result<Number, Raise> {
    match value {
        Value::Int(n) => Ok(Number::Int(*n)),
        Value::Float(n) => Ok(Number::Float(*n)),
        other => Err(type_mismatch(name, "number", other)),
    }
}

pub fn expect_int(name: &str, value: &Value) -> Result<i64, Raise> {
    match value {
        Value::Int(n) => Ok(*n),
        other => Err(type_mismatch(name, "integer", other)),
    }
}

pub fn expect_string<'a>(name: &str, value: &'a Value) -> Result<&'a str, Raise> {
    value.as_str().ok_or_else(|| type_mismatch(name, "string", value))
}

pub fn expect_list<'a>(name: &str, value: &'a Value) -> Result<&'a [Value], Raise> {
    match value {
        Value::List(items) => Ok(items),
        other => Err(type_mismatch(name, "list", other)),
    }
}

pub fn type_mismatch(name: &str, expected: &str, found: &Value) -> Raise {
    Raise::new(
        ErrorKind::TypeError,
        format!(
            "`{name}` expected {expected}, got {} ({})",
            found.inspect(),
            found.type_name()
        ),
    )
}
