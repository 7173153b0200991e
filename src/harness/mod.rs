//! The test-composition model: scopes, tests, prepare and setup actions.
//!
//! Scopes and tests execute immediately, in declaration order, as their forms are
//! evaluated. Prepare actions accumulate across the whole process; the setup
//! action is replaced by each new `setup` and its result feeds the next test.

pub mod context;
pub mod scope;

pub use context::{ExecutionContext, Flags};
pub use scope::{run_scope, ScopeDecl};
pub use test::{run_test, TestDecl};
