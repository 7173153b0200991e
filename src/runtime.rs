//! Runtime module for isotest scripts
//!
//! This module provides the core runtime value types. Evaluation of a test file
//! produces and manipulates these values; test bodies, prepare/setup actions and
//! custom assertions are all [`Lambda`]s.

use std::{fmt, path::PathBuf, rc::Rc};

use crate::errors::ErrorKind;
use crate::syntax::AstNode;

pub mod env;
pub mod eval;
pub mod stack;

pub use env::Env;
pub use eval::Interpreter;
pub use stack::{CallStack, Frame, FrameKind};

/// Canonical runtime value for script evaluation.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absence of a value.
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// A quoted symbol.
    Symbol(String),
    List(Vec<Value>),
    /// User-defined function (closure).
    Lambda(Rc<Lambda>),
    /// Reference to a registered builtin, by name.
    Native(String),
    /// An error kind, usable with `raise` and `assert-raise`.
    Kind(ErrorKind),
}

/// A user-defined function: parameters, body and the namespace and file it was
/// defined in.
#[derive(Debug)]
pub struct Lambda {
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: Vec<AstNode>,
    pub env: Env,
    pub file: PathBuf,
}

impl Lambda {
    /// Label used for call-stack frames.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("fn")
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Lambda(a), Value::Lambda(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => a == b,
            (Value::Kind(a), Value::Kind(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    /// Returns the type name of the value (for diagnostics).
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "Nil",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::Symbol(_) => "Symbol",
            Value::List(_) => "List",
            Value::Lambda(_) => "Function",
            Value::Native(_) => "Builtin",
            Value::Kind(_) => "Kind",
        }
    }

    /// Only `nil` and `false` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Developer-facing rendering: strings are quoted, everything else as displayed.
    pub fn inspect(&self) -> String {
        match self {
            Value::String(s) => format!("{s:?}"),
            Value::Symbol(s) => format!(":{s}"),
            Value::List(items) => {
                let inner = items.iter().map(Value::inspect).collect::<Vec<_>>();
                format!("({})", inner.join(" "))
            }
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n:?}"),
            Value::String(s) | Value::Symbol(s) => write!(f, "{s}"),
            Value::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            Value::Lambda(lambda) => write!(f, "#<fn {}>", lambda.label()),
            Value::Native(name) => write!(f, "#<builtin {name}>"),
            Value::Kind(kind) => write!(f, "{kind}"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Int(0).is_truthy());
        assert!(Value::from("").is_truthy());
        assert!(Value::List(vec![]).is_truthy());
    }

    #[test]
    fn test_numeric_equality_crosses_int_and_float() {
        assert_eq!(Value::Int(2), Value::Float(2.0));
        assert_ne!(Value::Int(2), Value::Float(2.5));
        assert_ne!(Value::Int(1), Value::from("1"));
    }

    #[test]
    fn test_inspect_quotes_strings() {
        let list = Value::List(vec![Value::Int(1), Value::from("a"), Value::Nil]);
        assert_eq!(list.inspect(), r#"(1 "a" nil)"#);
        assert_eq!(list.to_string(), "(1 a nil)");
        assert_eq!(Value::Float(2.0).to_string(), "2.0");
    }
}
