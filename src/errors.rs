//! isotest error types
//!
//! Two families live here:
//! - [`Failure`]: an error raised *inside* a script (assertion failures, runtime
//!   errors, load failures). It carries a kind, a message and the call stack captured
//!   at the raise point, and is propagated as `Err` until the per-file boundary.
//! - [`HarnessError`]: the harness's own operational errors (configuration, env
//!   files, spawning children), rendered through miette by the binary.

use std::{fmt, io, path::PathBuf};

use miette::Diagnostic;
use thiserror::Error;

use crate::runtime::stack::Frame;

// ============================================================================
// ERROR KINDS
// ============================================================================

/// The kind hierarchy of script-level errors.
///
/// `Error` is the root. `ZeroDivisionError` derives from `ArithmeticError`; every
/// other kind derives directly from `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Error,
    RuntimeError,
    ArgumentError,
    TypeError,
    NameError,
    IOError,
    ArithmeticError,
    ZeroDivisionError,
    AssertionFailed,
    LoadError,
    SyntaxError,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 11] = [
        ErrorKind::Error,
        ErrorKind::RuntimeError,
        ErrorKind::ArgumentError,
        ErrorKind::TypeError,
        ErrorKind::NameError,
        ErrorKind::IOError,
        ErrorKind::ArithmeticError,
        ErrorKind::ZeroDivisionError,
        ErrorKind::AssertionFailed,
        ErrorKind::LoadError,
        ErrorKind::SyntaxError,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Error => "Error",
            ErrorKind::RuntimeError => "RuntimeError",
            ErrorKind::ArgumentError => "ArgumentError",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::NameError => "NameError",
            ErrorKind::IOError => "IOError",
            ErrorKind::ArithmeticError => "ArithmeticError",
            ErrorKind::ZeroDivisionError => "ZeroDivisionError",
            ErrorKind::AssertionFailed => "AssertionFailed",
            ErrorKind::LoadError => "LoadError",
            ErrorKind::SyntaxError => "SyntaxError",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn parent(self) -> Option<ErrorKind> {
        match self {
            ErrorKind::Error => None,
            ErrorKind::ZeroDivisionError => Some(ErrorKind::ArithmeticError),
            _ => Some(ErrorKind::Error),
        }
    }

    /// True if `self` is `ancestor` or derives from it.
    pub fn is_a(self, ancestor: ErrorKind) -> bool {
        let mut current = Some(self);
        while let Some(kind) = current {
            if kind == ancestor {
                return true;
            }
            current = kind.parent();
        }
        false
    }

    /// Load failures are reported without a trace.
    pub fn is_load_failure(self) -> bool {
        matches!(self, ErrorKind::LoadError | ErrorKind::SyntaxError)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// FAILURE
// ============================================================================

/// A raised script error together with the stack captured where it was raised.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}: {message}")]
pub struct Failure {
    pub kind: ErrorKind,
    pub message: String,
    /// Innermost frame first.
    pub backtrace: Vec<Frame>,
    /// Name of the test that was running when the failure unwound through it.
    pub test: Option<String>,
}

impl Failure {
    pub fn new(kind: ErrorKind, message: impl Into<String>, backtrace: Vec<Frame>) -> Self {
        Self {
            kind,
            message: message.into(),
            backtrace,
            test: None,
        }
    }
}

/// Result of evaluating script code.
pub type EvalResult<T = crate::runtime::Value> = Result<T, Failure>;

// ============================================================================
// RAISE - lightweight errors from pure builtins
// ============================================================================

/// An error produced by a builtin that has no access to the call stack. The
/// evaluator turns it into a [`Failure`] at the call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raise {
    pub kind: ErrorKind,
    pub message: String,
}

impl Raise {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeError, message)
    }

    pub fn arity(name: &str, given: usize, expected: &str) -> Self {
        Self::new(
            ErrorKind::ArgumentError,
            format!("wrong number of arguments to `{name}` (given {given}, expected {expected})"),
        )
    }
}

// ============================================================================
// HARNESS ERRORS
// ============================================================================

/// Operational errors of the harness itself. These never reach a script.
#[derive(Debug, Error, Diagnostic)]
pub enum HarnessError {
    #[error("failed to read {}", .path.display())]
    #[diagnostic(code(isotest::io))]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration in {}", .path.display())]
    #[diagnostic(
        code(isotest::config),
        help("recognized keys: selected_scope, selected_test, warnings, backtrace, interactive_rescue, [database] url, ignore_tables")
    )]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("malformed line {line} in env file {}: expected KEY=VALUE", .path.display())]
    #[diagnostic(code(isotest::env_file))]
    EnvLine { path: PathBuf, line: usize },

    #[error("could not encode or decode the child process configuration")]
    #[diagnostic(code(isotest::handoff))]
    Handoff(#[source] serde_json::Error),

    #[error("could not locate the isotest executable")]
    #[diagnostic(code(isotest::exe))]
    CurrentExe(#[source] io::Error),

    #[error("failed to run a child process for {}", .file.display())]
    #[diagnostic(code(isotest::spawn))]
    Spawn {
        file: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to install a signal handler")]
    #[diagnostic(code(isotest::signal))]
    Signal(#[source] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_hierarchy() {
        assert!(ErrorKind::ZeroDivisionError.is_a(ErrorKind::ArithmeticError));
        assert!(ErrorKind::ZeroDivisionError.is_a(ErrorKind::Error));
        assert!(ErrorKind::AssertionFailed.is_a(ErrorKind::Error));
        assert!(!ErrorKind::TypeError.is_a(ErrorKind::ArithmeticError));
        assert!(!ErrorKind::Error.is_a(ErrorKind::RuntimeError));
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in ErrorKind::ALL {
            assert_eq!(ErrorKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(ErrorKind::from_name("NoSuchError"), None);
    }

    #[test]
    fn test_failure_display() {
        let failure = Failure::new(ErrorKind::AssertionFailed, "1 != 2", vec![]);
        assert_eq!(failure.to_string(), "AssertionFailed: 1 != 2");
    }
}
