//! Syntax module for isotest scripts
//!
//! This module provides the Abstract Syntax Tree types for test scripts, with
//! source location tracking precise enough to point a failure trace at a line.

use std::fmt;
use std::sync::Arc;

pub mod parser;

pub use parser::{parse, ParseError};

/// Represents a span in the source code.
///
/// `line` is 1-based and refers to the line on which the span starts; it is what
/// call-stack frames record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
}

/// Wrapper for carrying source span information with any value
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Span,
}

/// Canonical AST node type with shared ownership, so closures can keep their body
/// without copying it.
pub type AstNode = Spanned<Arc<Expr>>;

/// The core AST node for script expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    List(Vec<AstNode>),
    /// A bracketed parameter vector: `[a b]`.
    Params(Vec<String>),
    Symbol(String),
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Nil,
}

impl Expr {
    /// Returns the symbol name if this expression is a bare symbol.
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Expr::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the string literal if this expression is one.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Expr::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the parameter names if this expression is a parameter vector.
    pub fn as_params(&self) -> Option<&[String]> {
        match self {
            Expr::Params(p) => Some(p),
            _ => None,
        }
    }

    /// Returns the type name of this AST node (for diagnostics).
    pub fn type_name(&self) -> &'static str {
        match self {
            Expr::List(_) => "List",
            Expr::Params(_) => "Params",
            Expr::Symbol(_) => "Symbol",
            Expr::String(_) => "String",
            Expr::Int(_) => "Int",
            Expr::Float(_) => "Float",
            Expr::Bool(_) => "Bool",
            Expr::Nil => "Nil",
        }
    }

    /// Pretty-prints the expression as a string.
    pub fn pretty(&self) -> String {
        match self {
            Expr::List(items) => {
                let inner = items
                    .iter()
                    .map(|e| e.value.pretty())
                    .collect::<Vec<_>>()
                    .join(" ");
                format!("({inner})")
            }
            Expr::Params(names) => format!("[{}]", names.join(" ")),
            Expr::Symbol(s) => s.clone(),
            Expr::String(s) => format!("{s:?}"),
            Expr::Int(n) => n.to_string(),
            Expr::Float(n) => format!("{n:?}"),
            Expr::Bool(b) => b.to_string(),
            Expr::Nil => "nil".to_string(),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pretty())
    }
}
