//! # Assertions
//!
//! Truth, equality and exception checks, plus the failure signal they share.
//!
//! A failed assertion raises `AssertionFailed` with a call stack of exactly one
//! frame: the line the assertion was called from. Native assertions report the
//! line executing in the current frame. `flunk` called from inside a user function
//! (a custom assertion) reports the line that called that function instead, so
//! the trace points at the test rather than at the helper.
//!
//! Every passing assertion prints one success tick.

use crate::atoms::helpers::check_arity;
use crate::atoms::{Atom, AtomRegistry, SpecialFormFn, StatefulAtomFn};
use crate::errors::{ErrorKind, Failure};
use crate::runtime::{Env, Interpreter, Value};
use crate::syntax::AstNode;

// ============================================================================
// FAILURE SIGNAL
// ============================================================================

/// Failure attributed to the line executing in the current frame.
fn failure_here(interp: &Interpreter, message: String) -> Failure {
    let site = interp.stack.current().cloned().into_iter().collect();
    Failure::new(ErrorKind::AssertionFailed, message, site)
}

fn arity(interp: &Interpreter, name: &str, args: &[Value], expected: usize) -> Result<(), Failure> {
    check_arity(name, args, expected).map_err(|raise| interp.raise_from(raise))
}

/// Raises `AssertionFailed` with the given message.
///
/// Usage: (flunk "message")
pub const ATOM_FLUNK: StatefulAtomFn = |args, interp| {
    let message = match args {
        [] => String::new(),
        [Value::String(message)] => message.clone(),
        [other] => other.to_string(),
        _ => return Err(interp.raise_from(crate::errors::Raise::arity("flunk", args.len(), "0..1"))),
    };
    Err(Failure::new(
        ErrorKind::AssertionFailed,
        message,
        interp.stack.assertion_site(),
    ))
};

/// Records a passing assertion.
///
/// Usage: (success)
pub const ATOM_SUCCESS: StatefulAtomFn = |args, interp| {
    arity(interp, "success", args, 0)?;
    interp.reporter.tick();
    Ok(Value::Nil)
};

/// Fails unless the value is truthy.
///
/// Usage: (assert <value>)
pub const ATOM_ASSERT: StatefulAtomFn = |args, interp| {
    arity(interp, "assert", args, 1)?;
    if !args[0].is_truthy() {
        return Err(failure_here(
            interp,
            format!("expression returned {}", args[0].inspect()),
        ));
    }
    interp.reporter.tick();
    Ok(Value::Nil)
};

/// Fails unless both values are equal.
///
/// Usage: (assert-equal <expected> <actual>)
pub const ATOM_ASSERT_EQUAL: StatefulAtomFn = |args, interp| {
    arity(interp, "assert-equal", args, 2)?;
    if args[0] != args[1] {
        return Err(failure_here(
            interp,
            format!("{} != {}", args[0].inspect(), args[1].inspect()),
        ));
    }
    interp.reporter.tick();
    Ok(Value::Nil)
};

/// Evaluates the body and fails unless it raises an error of the given kind (any
/// error by default). Returns the raised message.
///
/// Usage:
///   (assert-raise body...)
///   (assert-raise <Kind> body...)
pub const FORM_ASSERT_RAISE: SpecialFormFn = |args, env, interp, span| {
    let (expected, body) = match args {
        [] => {
            return Err(interp.raise(
                ErrorKind::ArgumentError,
                "malformed `assert-raise`, expected (assert-raise Kind? body...)",
            ))
        }
        [first, rest @ ..] if !rest.is_empty() => match expected_kind(first, env) {
            Some(kind) => (kind, rest),
            None => (ErrorKind::Error, args),
        },
        _ => (ErrorKind::Error, args),
    };

    let outcome = interp.eval_body(body, env);
    interp.stack.set_line(span.line);

    match outcome {
        Err(raised) if raised.kind.is_a(expected) => {
            interp.reporter.tick();
            Ok(Value::String(raised.message))
        }
        Err(raised) => Err(failure_here(
            interp,
            format!("expected {expected}, got {}: {}", raised.kind, raised.message),
        )),
        Ok(_) => Err(failure_here(
            interp,
            format!("expected {expected}, nothing was raised"),
        )),
    }
};

/// A leading symbol naming an error kind selects what `assert-raise` expects.
fn expected_kind(node: &AstNode, env: &Env) -> Option<ErrorKind> {
    let name = node.value.as_symbol()?;
    match env.lookup(name) {
        Some(Value::Kind(kind)) => Some(kind),
        Some(_) => None,
        None => ErrorKind::from_name(name),
    }
}

pub fn register_assertion_atoms(registry: &mut AtomRegistry) {
    registry.register("flunk", Atom::Stateful(ATOM_FLUNK));
    registry.register("success", Atom::Stateful(ATOM_SUCCESS));
    registry.register("assert", Atom::Stateful(ATOM_ASSERT));
    registry.register("assert-equal", Atom::Stateful(ATOM_ASSERT_EQUAL));
    registry.register("assert-raise", Atom::SpecialForm(FORM_ASSERT_RAISE));
}
