//! Command-line arguments for isotest.
//!
//! Declared with the `clap` derive API.

use clap::Parser;
use std::path::PathBuf;

use crate::config::RunConfig;

/// Runs isotest scripts, each file in its own process.
#[derive(Debug, Parser)]
#[command(
    name = "isotest",
    version,
    about = "A minimal test harness: every file runs in its own process."
)]
pub struct IsotestArgs {
    /// Test files to run, in order.
    #[arg(value_name = "FILE", required_unless_present = "child")]
    pub files: Vec<PathBuf>,

    /// Only run the scope with exactly this name.
    #[arg(short = 's', long = "scope", value_name = "NAME")]
    pub scope: Option<String>,

    /// Only run the test with exactly this name.
    #[arg(short = 't', long = "test", value_name = "NAME")]
    pub test: Option<String>,

    /// Show runtime warnings.
    #[arg(short = 'w', long = "warnings")]
    pub warnings: bool,

    /// Pause a failing file so a debugger can be attached.
    #[arg(short = 'p', long = "rescue")]
    pub rescue: bool,

    /// Print the full backtrace of a failure.
    #[arg(short = 'b', long = "backtrace")]
    pub backtrace: bool,

    /// Load KEY=VALUE lines into the environment before running.
    #[arg(short = 'e', long = "env", value_name = "FILE")]
    pub env: Vec<PathBuf>,

    /// TOML configuration file. Command-line flags take precedence.
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run a single file in this process (used by the orchestrator).
    #[arg(long = "child", value_name = "FILE", hide = true, conflicts_with = "files")]
    pub child: Option<PathBuf>,
}

impl IsotestArgs {
    /// Applies command-line flags on top of a loaded configuration.
    pub fn apply_overrides(&self, config: &mut RunConfig) {
        if let Some(scope) = &self.scope {
            config.selected_scope = Some(scope.clone());
        }
        if let Some(test) = &self.test {
            config.selected_test = Some(test.clone());
        }
        config.warnings |= self.warnings;
        config.interactive_rescue |= self.rescue;
        config.backtrace |= self.backtrace;
    }
}
