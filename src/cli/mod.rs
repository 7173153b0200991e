//! The isotest command-line interface.
//!
//! One binary, two modes: the orchestrator (default) and the hidden `--child`
//! mode it re-executes itself with for every file.

use std::{path::Path, process::ExitCode};

use clap::Parser;
use tracing::debug;

use crate::child;
use crate::cli::args::IsotestArgs;
use crate::config::RunConfig;
use crate::envfile;
use crate::errors::HarnessError;
use crate::orchestrator::Orchestrator;

pub mod args;

/// Exit status for harness errors (bad config, unreadable env file, spawn failure).
pub const HARNESS_ERROR_EXIT: u8 = 2;

/// The main entry point for the CLI.
pub fn run() -> ExitCode {
    let args = IsotestArgs::parse();

    if let Some(file) = &args.child {
        return run_child(file);
    }

    match run_files(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => harness_error(err),
    }
}

/// Resolves the configuration: the TOML file if given, then command-line flags.
pub fn resolve_config(args: &IsotestArgs) -> Result<RunConfig, HarnessError> {
    let mut config = match &args.config {
        Some(path) => RunConfig::from_toml_file(path)?,
        None => RunConfig::default(),
    };
    args.apply_overrides(&mut config);
    debug!(?config, "resolved configuration");
    Ok(config)
}

fn run_files(args: &IsotestArgs) -> Result<bool, HarnessError> {
    for env_file in &args.env {
        envfile::load_env_file(env_file)?;
    }
    let config = resolve_config(args)?;
    Orchestrator::new(config)?.run(&args.files)
}

fn run_child(file: &Path) -> ExitCode {
    let config = match RunConfig::from_env() {
        Ok(config) => config,
        Err(err) => return harness_error(err),
    };
    if child::run(file, &config) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn harness_error(err: HarnessError) -> ExitCode {
    eprintln!("{:?}", miette::Report::new(err));
    ExitCode::from(HARNESS_ERROR_EXIT)
}
