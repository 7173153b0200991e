//! Scope evaluation.

use tracing::debug;

use crate::errors::EvalResult;
use crate::runtime::{Env, FrameKind, Interpreter, Value};
use crate::syntax::AstNode;

/// A `scope` form: an optional name and its body.
pub struct ScopeDecl<'a> {
    pub name: String,
    pub body: &'a [AstNode],
}

/// Runs a scope body in a fresh child namespace, unless the selected-scope filter
/// excludes it. A skipped scope prints nothing and runs none of its tests.
pub fn run_scope(interp: &mut Interpreter, decl: ScopeDecl<'_>, env: &Env) -> EvalResult {
    let previous = interp.context.enter_scope(decl.name.clone());

    let result = if interp.context.scope_selected(&decl.name) {
        interp.reporter.scope_header(&decl.name);
        let namespace = env.child();
        let file = interp.current_file();
        let label = format!("scope {}", decl.name);
        interp.eval_in_frame(FrameKind::Scope, file, label.trim_end(), decl.body, &namespace)
    } else {
        debug!(scope = %decl.name, "scope not selected, skipping");
        Ok(Value::Nil)
    };

    interp.context.restore_scope(previous);
    result.map(|_| Value::Nil)
}
