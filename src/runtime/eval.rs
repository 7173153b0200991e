//! The evaluation engine: AST nodes to runtime values.
//!
//! One [`Interpreter`] exists per child process. It owns the per-process
//! [`ExecutionContext`], the call stack, the reporter and the global namespace, and
//! threads them explicitly through every evaluation step.
//!
//! ## Atom calling conventions
//!
//! Core forms (`define`, `if`, `fn`, ...) are evaluated here directly. Anything
//! else in call position is resolved through the namespace first, then through the
//! [`AtomRegistry`]. `Pure` and `Stateful` atoms receive evaluated arguments,
//! `SpecialForm` atoms receive the raw nodes.
//!
//! ## Errors
//!
//! Every error is a [`Failure`] built by [`Interpreter::raise`], which snapshots the
//! call stack at the raise point. Frames are popped on the way out whether the
//! body succeeded or not, so a failure caught by `assert-raise` leaves the stack
//! consistent.

use std::{
    fs,
    path::{Path, PathBuf},
    rc::Rc,
};

use tracing::debug;

use crate::atoms::{Atom, AtomRegistry};
use crate::config::RunConfig;
use crate::database::Database;
use crate::errors::{ErrorKind, EvalResult, Failure, Raise};
use crate::harness::ExecutionContext;
use crate::report::Reporter;
use crate::runtime::{CallStack, Env, FrameKind, Lambda, Value};
use crate::syntax::{parse, AstNode, Expr, Span};

/// Path under which the embedded prelude is evaluated.
pub const PRELUDE_PATH: &str = "<internal:prelude>";

const PRELUDE_SOURCE: &str = include_str!("../prelude.ist");

// ===================================================================================================
// INTERPRETER
// ===================================================================================================

pub struct Interpreter {
    pub(crate) context: ExecutionContext,
    pub(crate) reporter: Reporter,
    pub(crate) stack: CallStack,
    pub(crate) database: Database,
    registry: AtomRegistry,
    globals: Env,
}

impl Interpreter {
    pub fn new(config: &RunConfig, reporter: Reporter) -> Self {
        Self {
            context: ExecutionContext::from_config(config),
            reporter,
            stack: CallStack::new(),
            database: Database::new(config.database.clone()),
            registry: AtomRegistry::standard(),
            globals: Env::root(),
        }
    }

    pub fn reporter_mut(&mut self) -> &mut Reporter {
        &mut self.reporter
    }

    // ---------------------------------------------------------------------------------------------
    // Loading
    // ---------------------------------------------------------------------------------------------

    /// Evaluates the embedded prelude into the global namespace.
    pub fn load_prelude(&mut self) -> EvalResult<()> {
        self.eval_source(Path::new(PRELUDE_PATH), PRELUDE_SOURCE, "<internal>")
            .map(|_| ())
    }

    /// Loads and evaluates the file a child process was started for.
    pub fn load_file(&mut self, path: &Path) -> EvalResult {
        debug!(file = %path.display(), "loading test file");
        let source = self.read_source(path)?;
        self.eval_source(path, &source, "<main>")
    }

    /// Loads another script into the global namespace (the `load` builtin).
    pub(crate) fn load_nested(&mut self, path: &Path) -> EvalResult {
        debug!(file = %path.display(), "loading nested file");
        let source = self.read_source(path)?;
        self.eval_source(path, &source, "<load>")
    }

    /// Parses and evaluates `source` as if it were the contents of `path`.
    pub fn eval_source(&mut self, path: &Path, source: &str, label: &str) -> EvalResult {
        let nodes = parse(source).map_err(|err| {
            self.raise(
                ErrorKind::SyntaxError,
                format!("{}:{err}", path.display()),
            )
        })?;
        let globals = self.globals.clone();
        self.eval_in_frame(FrameKind::File, path.to_path_buf(), label, &nodes, &globals)
    }

    fn read_source(&self, path: &Path) -> EvalResult<String> {
        fs::read_to_string(path).map_err(|err| {
            self.raise(
                ErrorKind::LoadError,
                format!("cannot load such file -- {} ({err})", path.display()),
            )
        })
    }

    // ---------------------------------------------------------------------------------------------
    // Evaluation
    // ---------------------------------------------------------------------------------------------

    pub fn eval(&mut self, node: &AstNode, env: &Env) -> EvalResult {
        match &*node.value {
            Expr::Nil => Ok(Value::Nil),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Int(n) => Ok(Value::Int(*n)),
            Expr::Float(n) => Ok(Value::Float(*n)),
            Expr::String(s) => Ok(Value::String(s.clone())),
            Expr::Symbol(name) => {
                self.stack.set_line(node.span.line);
                self.resolve(name, env)
            }
            Expr::Params(_) => {
                self.stack.set_line(node.span.line);
                Err(self.raise(
                    ErrorKind::ArgumentError,
                    format!("parameter vector {} outside of fn, defn or test", node.value),
                ))
            }
            Expr::List(items) => {
                self.stack.set_line(node.span.line);
                self.eval_list(items, node.span, env)
            }
        }
    }

    /// Evaluates a sequence of forms, returning the last value (nil if empty).
    pub fn eval_body(&mut self, body: &[AstNode], env: &Env) -> EvalResult {
        let mut last = Value::Nil;
        for node in body {
            last = self.eval(node, env)?;
        }
        Ok(last)
    }

    /// Evaluates `body` inside a new call-stack frame.
    pub(crate) fn eval_in_frame(
        &mut self,
        kind: FrameKind,
        file: PathBuf,
        label: &str,
        body: &[AstNode],
        env: &Env,
    ) -> EvalResult {
        if self.stack.depth() >= CallStack::MAX_DEPTH {
            return Err(self.raise(ErrorKind::RuntimeError, "stack level too deep"));
        }
        self.stack.push(kind, file, label);
        let result = self.eval_body(body, env);
        self.stack.pop();
        result
    }

    fn eval_args(&mut self, args: &[AstNode], env: &Env) -> EvalResult<Vec<Value>> {
        args.iter().map(|arg| self.eval(arg, env)).collect()
    }

    fn eval_list(&mut self, items: &[AstNode], span: Span, env: &Env) -> EvalResult {
        let Some((head, args)) = items.split_first() else {
            return Ok(Value::List(vec![]));
        };

        if let Some(name) = head.value.as_symbol() {
            if let Some(form) = CoreForm::from_name(name) {
                return self.eval_core_form(form, args, span, env);
            }
            if !env.is_bound(name) {
                if let Some(atom) = self.registry.get(name) {
                    return self.call_atom(atom, args, span, env);
                }
            }
        }

        let callee = self.eval(head, env)?;
        let values = self.eval_args(args, env)?;
        self.stack.set_line(span.line);
        self.apply(&callee, values)
    }

    fn call_atom(&mut self, atom: Atom, args: &[AstNode], span: Span, env: &Env) -> EvalResult {
        match atom {
            Atom::SpecialForm(form) => form(args, env, self, span),
            Atom::Pure(pure) => {
                let values = self.eval_args(args, env)?;
                self.stack.set_line(span.line);
                pure(&values).map_err(|raise| self.raise_from(raise))
            }
            Atom::Stateful(stateful) => {
                let values = self.eval_args(args, env)?;
                self.stack.set_line(span.line);
                stateful(&values, self)
            }
        }
    }

    /// Calls a function value with already-evaluated arguments.
    pub fn apply(&mut self, callee: &Value, args: Vec<Value>) -> EvalResult {
        match callee {
            Value::Lambda(lambda) => self.call_lambda(lambda, args),
            Value::Native(name) => match self.registry.get(name) {
                Some(Atom::Pure(pure)) => pure(&args).map_err(|raise| self.raise_from(raise)),
                Some(Atom::Stateful(stateful)) => stateful(&args, self),
                Some(Atom::SpecialForm(_)) => Err(self.raise(
                    ErrorKind::TypeError,
                    format!("`{name}` is a special form and cannot be applied"),
                )),
                None => Err(self.raise(ErrorKind::NameError, format!("undefined name `{name}`"))),
            },
            other => Err(self.raise(
                ErrorKind::TypeError,
                format!("{} is not callable", other.inspect()),
            )),
        }
    }

    pub(crate) fn call_lambda(&mut self, lambda: &Rc<Lambda>, args: Vec<Value>) -> EvalResult {
        if args.len() != lambda.params.len() {
            return Err(self.raise(
                ErrorKind::ArgumentError,
                format!(
                    "wrong number of arguments to `{}` (given {}, expected {})",
                    lambda.label(),
                    args.len(),
                    lambda.params.len()
                ),
            ));
        }
        let namespace = lambda.env.child();
        for (param, value) in lambda.params.iter().zip(args) {
            namespace.define(param.clone(), value);
        }
        self.eval_in_frame(
            FrameKind::Function,
            lambda.file.clone(),
            lambda.label(),
            &lambda.body,
            &namespace,
        )
    }

    /// Runs a prepare or setup action.
    pub(crate) fn run_action(&mut self, action: &Rc<Lambda>, label: &str) -> EvalResult {
        let namespace = action.env.child();
        self.eval_in_frame(
            FrameKind::Action,
            action.file.clone(),
            label,
            &action.body,
            &namespace,
        )
    }

    fn resolve(&self, name: &str, env: &Env) -> EvalResult {
        if let Some(value) = env.lookup(name) {
            return Ok(value);
        }
        if let Some(kind) = ErrorKind::from_name(name) {
            return Ok(Value::Kind(kind));
        }
        if self.registry.has(name) {
            return Ok(Value::Native(name.to_string()));
        }
        Err(self.raise(ErrorKind::NameError, format!("undefined name `{name}`")))
    }

    // ---------------------------------------------------------------------------------------------
    // Raising, warnings
    // ---------------------------------------------------------------------------------------------

    /// Builds a failure carrying the full call stack at this point.
    pub fn raise(&self, kind: ErrorKind, message: impl Into<String>) -> Failure {
        Failure::new(kind, message, self.stack.snapshot())
    }

    pub(crate) fn raise_from(&self, raise: Raise) -> Failure {
        self.raise(raise.kind, raise.message)
    }

    /// File of the innermost frame; relative `load` paths resolve against it.
    pub(crate) fn current_file(&self) -> PathBuf {
        self.stack
            .current_file()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// Emits a runtime warning when warnings are enabled.
    pub(crate) fn warn(&mut self, message: &str) {
        if !self.context.flags().warnings {
            return;
        }
        let location = self
            .stack
            .current()
            .map(|frame| format!("{}:{}: ", frame.file.display(), frame.line))
            .unwrap_or_default();
        self.reporter.warning(&format!("{location}warning: {message}"));
    }

    fn bind(&mut self, env: &Env, name: &str, value: Value) {
        if env.define(name, value) {
            self.warn(&format!("redefining `{name}`"));
        }
    }

    /// Builds a closure over `env` in the current file.
    pub(crate) fn make_lambda(
        &self,
        name: Option<String>,
        params: Vec<String>,
        body: &[AstNode],
        env: &Env,
    ) -> Rc<Lambda> {
        Rc::new(Lambda {
            name,
            params,
            body: body.to_vec(),
            env: env.clone(),
            file: self.current_file(),
        })
    }

    // ---------------------------------------------------------------------------------------------
    // Core forms
    // ---------------------------------------------------------------------------------------------

    fn eval_core_form(
        &mut self,
        form: CoreForm,
        args: &[AstNode],
        span: Span,
        env: &Env,
    ) -> EvalResult {
        match form {
            CoreForm::Define => {
                let [name, expr] = args else {
                    return Err(self.malformed("define", "(define name value)"));
                };
                let Some(name) = name.value.as_symbol() else {
                    return Err(self.malformed("define", "(define name value)"));
                };
                let value = self.eval(expr, env)?;
                self.stack.set_line(span.line);
                self.bind(env, name, value.clone());
                Ok(value)
            }

            CoreForm::Defn => {
                let [name, params, body @ ..] = args else {
                    return Err(self.malformed("defn", "(defn name [params] body...)"));
                };
                let (Some(name), Some(params)) = (name.value.as_symbol(), params.value.as_params())
                else {
                    return Err(self.malformed("defn", "(defn name [params] body...)"));
                };
                let lambda = self.make_lambda(Some(name.to_string()), params.to_vec(), body, env);
                self.bind(env, name, Value::Lambda(lambda.clone()));
                Ok(Value::Lambda(lambda))
            }

            CoreForm::Fn => {
                let Some((params, body)) = args.split_first() else {
                    return Err(self.malformed("fn", "(fn [params] body...)"));
                };
                let Some(params) = params.value.as_params() else {
                    return Err(self.malformed("fn", "(fn [params] body...)"));
                };
                Ok(Value::Lambda(self.make_lambda(None, params.to_vec(), body, env)))
            }

            CoreForm::Set => {
                let [name, expr] = args else {
                    return Err(self.malformed("set!", "(set! name value)"));
                };
                let Some(name) = name.value.as_symbol() else {
                    return Err(self.malformed("set!", "(set! name value)"));
                };
                let value = self.eval(expr, env)?;
                self.stack.set_line(span.line);
                if !env.assign(name, value.clone()) {
                    return Err(self.raise(
                        ErrorKind::NameError,
                        format!("cannot set! undefined name `{name}`"),
                    ));
                }
                Ok(value)
            }

            CoreForm::If => {
                let (condition, then, otherwise) = match args {
                    [c, t] => (c, t, None),
                    [c, t, e] => (c, t, Some(e)),
                    _ => return Err(self.malformed("if", "(if condition then else?)")),
                };
                if self.eval(condition, env)?.is_truthy() {
                    self.eval(then, env)
                } else if let Some(otherwise) = otherwise {
                    self.eval(otherwise, env)
                } else {
                    Ok(Value::Nil)
                }
            }

            CoreForm::Do => self.eval_body(args, env),

            CoreForm::Let => {
                let Some((bindings, body)) = args.split_first() else {
                    return Err(self.malformed("let", "(let ((name value) ...) body...)"));
                };
                let Expr::List(bindings) = &*bindings.value else {
                    return Err(self.malformed("let", "(let ((name value) ...) body...)"));
                };
                let namespace = env.child();
                for binding in bindings {
                    let pair: &[AstNode] = match &*binding.value {
                        Expr::List(pair) => pair.as_slice(),
                        _ => &[],
                    };
                    let [name, expr] = pair else {
                        return Err(self.malformed("let", "(let ((name value) ...) body...)"));
                    };
                    let Some(name) = name.value.as_symbol() else {
                        return Err(self.malformed("let", "(let ((name value) ...) body...)"));
                    };
                    let value = self.eval(expr, &namespace)?;
                    namespace.define(name, value);
                }
                self.eval_body(body, &namespace)
            }

            CoreForm::And => {
                let mut last = Value::Bool(true);
                for arg in args {
                    last = self.eval(arg, env)?;
                    if !last.is_truthy() {
                        break;
                    }
                }
                Ok(last)
            }

            CoreForm::Or => {
                let mut last = Value::Nil;
                for arg in args {
                    last = self.eval(arg, env)?;
                    if last.is_truthy() {
                        break;
                    }
                }
                Ok(last)
            }

            CoreForm::Quote => {
                let [expr] = args else {
                    return Err(self.malformed("quote", "(quote expr)"));
                };
                Ok(quote_value(expr))
            }
        }
    }

    fn malformed(&self, form: &str, usage: &str) -> Failure {
        self.raise(
            ErrorKind::ArgumentError,
            format!("malformed `{form}`, expected {usage}"),
        )
    }
}

// ===================================================================================================
// CORE FORMS
// ===================================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CoreForm {
    Define,
    Defn,
    Fn,
    Set,
    If,
    Do,
    Let,
    And,
    Or,
    Quote,
}

impl CoreForm {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "define" => CoreForm::Define,
            "defn" => CoreForm::Defn,
            "fn" => CoreForm::Fn,
            "set!" => CoreForm::Set,
            "if" => CoreForm::If,
            "do" => CoreForm::Do,
            "let" => CoreForm::Let,
            "and" => CoreForm::And,
            "or" => CoreForm::Or,
            "quote" => CoreForm::Quote,
            _ => return None,
        })
    }
}

fn quote_value(node: &AstNode) -> Value {
    match &*node.value {
        Expr::List(items) => Value::List(items.iter().map(quote_value).collect()),
        Expr::Params(names) => Value::List(names.iter().cloned().map(Value::Symbol).collect()),
        Expr::Symbol(name) => Value::Symbol(name.clone()),
        Expr::String(s) => Value::String(s.clone()),
        Expr::Int(n) => Value::Int(*n),
        Expr::Float(n) => Value::Float(*n),
        Expr::Bool(b) => Value::Bool(*b),
        Expr::Nil => Value::Nil,
    }
}
