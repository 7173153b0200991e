//! # Execution Control and I/O
//!
//! - `raise`: raise a runtime error of a given kind
//! - `load`: evaluate another script file
//! - `print`, `warn`: console output
//! - `env`: read an environment variable

use std::path::Path;

use crate::atoms::helpers::{check_arity, expect_string};
use crate::atoms::{Atom, AtomRegistry, PureAtomFn, StatefulAtomFn};
use crate::errors::ErrorKind;
use crate::runtime::Value;

/// Raises an error.
///
/// Usage:
///   (raise "message")          ; RuntimeError
///   (raise <Kind> "message")
///   (raise <Kind>)             ; message defaults to the kind name
pub const ATOM_RAISE: StatefulAtomFn = |args, interp| {
    let (kind, message) = match args {
        [Value::String(message)] => (ErrorKind::RuntimeError, message.clone()),
        [Value::Kind(kind)] => (*kind, kind.name().to_string()),
        [Value::Kind(kind), message] => (*kind, message.to_string()),
        _ => {
            return Err(interp.raise(
                ErrorKind::ArgumentError,
                "`raise` expects a message, a kind, or a kind and a message",
            ))
        }
    };
    Err(interp.raise(kind, message))
};

/// Evaluates another script into the global namespace. Relative paths resolve
/// against the directory of the file currently executing.
///
/// Usage: (load "helpers.ist")
pub const ATOM_LOAD: StatefulAtomFn = |args, interp| {
    let relative = check_arity("load", args, 1)
        .and_then(|_| expect_string("load", &args[0]))
        .map(Path::new)
        .map_err(|raise| interp.raise_from(raise))?;
    let resolved = match interp.current_file().parent() {
        Some(dir) => dir.join(relative),
        None => relative.to_path_buf(),
    };
    interp.load_nested(&resolved)?;
    Ok(Value::Bool(true))
};

/// Prints the display form of its arguments, space separated, on its own line.
///
/// Usage: (print <a> <b> ...)
pub const ATOM_PRINT: StatefulAtomFn = |args, interp| {
    let line = args
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    interp.reporter.print_line(&line);
    Ok(Value::Nil)
};

/// Emits a warning on stderr when warnings are enabled (`-w`).
///
/// Usage: (warn "message")
pub const ATOM_WARN: StatefulAtomFn = |args, interp| {
    let message = args
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    interp.warn(&message);
    Ok(Value::Nil)
};

/// Reads an environment variable; nil when unset.
///
/// Usage: (env "DATABASE_URL")
pub const ATOM_ENV: PureAtomFn = |args| {
    check_arity("env", args, 1)?;
    let key = expect_string("env", &args[0])?;
    Ok(std::env::var(key).map(Value::String).unwrap_or_default())
};

pub fn register_execution_atoms(registry: &mut AtomRegistry) {
    registry.register("raise", Atom::Stateful(ATOM_RAISE));
    registry.register("load", Atom::Stateful(ATOM_LOAD));
    registry.register("print", Atom::Stateful(ATOM_PRINT));
    registry.register("warn", Atom::Stateful(ATOM_WARN));
    registry.register("env", Atom::Pure(ATOM_ENV));
}
