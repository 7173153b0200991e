pub use crate::errors::{ErrorKind, EvalResult, Failure, HarnessError};
pub use crate::config::RunConfig;
pub use crate::runtime::{Interpreter, Value};

pub mod atoms;
pub mod child;
pub mod cli;
pub mod config;
pub mod database;
pub mod envfile;
pub mod errors;
pub mod harness;
pub mod orchestrator;
pub mod report;
pub mod runtime;
pub mod syntax;
