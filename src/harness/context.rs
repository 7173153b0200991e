//! Per-process execution state.
//!
//! One [`ExecutionContext`] exists per child process, owned by the interpreter.
//! It accumulates prepare actions, holds the current setup action, tracks the
//! active scope/test labels and carries the run filters fixed at startup.

use std::rc::Rc;

use crate::config::RunConfig;
use crate::runtime::Lambda;

/// Run-wide switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub warnings: bool,
    pub backtrace: bool,
    pub interactive_rescue: bool,
}

#[derive(Debug, Default)]
pub struct ExecutionContext {
    prepare_actions: Vec<Rc<Lambda>>,
    setup_action: Option<Rc<Lambda>>,
    current_scope: Option<String>,
    current_test: Option<String>,
    selected_scope: Option<String>,
    selected_test: Option<String>,
    flags: Flags,
}

impl ExecutionContext {
    pub fn from_config(config: &RunConfig) -> Self {
        Self {
            selected_scope: config.selected_scope.clone(),
            selected_test: config.selected_test.clone(),
            flags: Flags {
                warnings: config.warnings,
                backtrace: config.backtrace,
                interactive_rescue: config.interactive_rescue,
            },
            ..Self::default()
        }
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    // ------------------------------------------------------------------------
    // prepare / setup
    // ------------------------------------------------------------------------

    /// Appends an action run before every subsequent test of the process.
    pub fn add_prepare(&mut self, action: Rc<Lambda>) {
        self.prepare_actions.push(action);
    }

    pub fn prepare_actions(&self) -> &[Rc<Lambda>] {
        &self.prepare_actions
    }

    /// Replaces the setup action; the last one assigned wins.
    pub fn set_setup(&mut self, action: Rc<Lambda>) {
        self.setup_action = Some(action);
    }

    pub fn setup_action(&self) -> Option<&Rc<Lambda>> {
        self.setup_action.as_ref()
    }

    // ------------------------------------------------------------------------
    // scope / test labels and filters
    // ------------------------------------------------------------------------

    /// Sets the active scope, returning the one it replaces.
    pub fn enter_scope(&mut self, name: String) -> Option<String> {
        self.current_scope.replace(name)
    }

    pub fn restore_scope(&mut self, previous: Option<String>) {
        self.current_scope = previous;
    }

    pub fn current_scope(&self) -> Option<&str> {
        self.current_scope.as_deref()
    }

    pub fn enter_test(&mut self, name: String) {
        self.current_test = Some(name);
    }

    pub fn clear_test(&mut self) {
        self.current_test = None;
    }

    pub fn current_test(&self) -> Option<&str> {
        self.current_test.as_deref()
    }

    /// True if no scope filter is set or it names exactly this scope.
    pub fn scope_selected(&self, name: &str) -> bool {
        self.selected_scope.as_deref().map_or(true, |selected| selected == name)
    }

    /// True if no test filter is set or it names exactly this test.
    pub fn test_selected(&self, name: &str) -> bool {
        self.selected_test.as_deref().map_or(true, |selected| selected == name)
    }
}
