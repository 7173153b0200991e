//! # Test Composition Forms
//!
//! Syntax adapters over [`crate::harness`]:
//!
//! - `(scope "name" body...)`, `(scope body...)`
//! - `(test "name" [input] body...)`, `(test "name" body...)`
//! - `(prepare body...)`, `(prepare)`
//! - `(setup body...)`, `(setup)`

use crate::atoms::{Atom, AtomRegistry, SpecialFormFn};
use crate::errors::ErrorKind;
use crate::harness::{run_scope, run_test, ScopeDecl, TestDecl};
use crate::runtime::Value;
use crate::syntax::AstNode;

/// Splits a leading string-literal name off a form's arguments. Forms without
/// one are anonymous.
fn split_name(args: &[AstNode]) -> (String, &[AstNode]) {
    match args.split_first() {
        Some((first, rest)) => match first.value.as_string() {
            Some(name) => (name.to_string(), rest),
            None => (String::new(), args),
        },
        None => (String::new(), args),
    }
}

pub const FORM_SCOPE: SpecialFormFn = |args, env, interp, _span| {
    let (name, body) = split_name(args);
    run_scope(interp, ScopeDecl { name, body }, env)
};

pub const FORM_TEST: SpecialFormFn = |args, env, interp, _span| {
    let (name, rest) = split_name(args);
    let (param, body) = match rest.first().and_then(|node| node.value.as_params()) {
        Some([]) => (None, &rest[1..]),
        Some([param]) => (Some(param.clone()), &rest[1..]),
        Some(_) => {
            return Err(interp.raise(
                ErrorKind::ArgumentError,
                "a test takes at most one parameter (the setup result)",
            ))
        }
        None => (None, rest),
    };
    run_test(interp, TestDecl { name, param, body }, env)
};

pub const FORM_PREPARE: SpecialFormFn = |args, env, interp, _span| {
    if args.is_empty() {
        let actions = interp
            .context
            .prepare_actions()
            .iter()
            .cloned()
            .map(Value::Lambda)
            .collect();
        return Ok(Value::List(actions));
    }
    let action = interp.make_lambda(Some("prepare".into()), vec![], args, env);
    interp.context.add_prepare(action);
    Ok(Value::Nil)
};

pub const FORM_SETUP: SpecialFormFn = |args, env, interp, _span| {
    if args.is_empty() {
        return Ok(interp
            .context
            .setup_action()
            .cloned()
            .map(Value::Lambda)
            .unwrap_or_default());
    }
    let action = interp.make_lambda(Some("setup".into()), vec![], args, env);
    interp.context.set_setup(action);
    Ok(Value::Nil)
};

pub fn register_harness_atoms(registry: &mut AtomRegistry) {
    registry.register("scope", Atom::SpecialForm(FORM_SCOPE));
    registry.register("test", Atom::SpecialForm(FORM_TEST));
    registry.register("prepare", Atom::SpecialForm(FORM_PREPARE));
    registry.register("setup", Atom::SpecialForm(FORM_SETUP));
}
