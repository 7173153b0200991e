//! Process-per-file orchestration.
//!
//! The harness binary re-executes itself once per test file with the hidden
//! `--child` flag. Files run one at a time; the first failing file ends the run.

use std::{
    path::{Path, PathBuf},
    process::Command,
    sync::{atomic::AtomicBool, Arc},
};

use signal_hook::{consts::SIGINT, SigId};
use tracing::{debug, info};

use crate::config::{RunConfig, CONFIG_ENV};
use crate::errors::HarnessError;

pub struct Orchestrator {
    config: RunConfig,
    executable: PathBuf,
}

impl Orchestrator {
    /// Orchestrator spawning the currently running executable.
    pub fn new(config: RunConfig) -> Result<Self, HarnessError> {
        let executable = std::env::current_exe().map_err(HarnessError::CurrentExe)?;
        Ok(Self::with_executable(config, executable))
    }

    pub fn with_executable(config: RunConfig, executable: PathBuf) -> Self {
        Self { config, executable }
    }

    /// Runs every file in order, each in its own child process. Returns true if
    /// all of them passed; stops at the first file that fails.
    pub fn run(&self, files: &[PathBuf]) -> Result<bool, HarnessError> {
        let handoff = self.config.to_handoff()?;
        let _interrupts = if self.config.interactive_rescue {
            Some(InterruptGuard::install()?)
        } else {
            None
        };

        let mut passed = true;
        for file in files {
            if !self.run_file(file, &handoff)? {
                passed = false;
                break;
            }
        }

        println!();
        Ok(passed)
    }

    fn run_file(&self, file: &Path, handoff: &str) -> Result<bool, HarnessError> {
        info!(file = %file.display(), "spawning child");
        let status = Command::new(&self.executable)
            .arg("--child")
            .arg(file)
            .env(CONFIG_ENV, handoff)
            .status()
            .map_err(|source| HarnessError::Spawn {
                file: file.to_path_buf(),
                source,
            })?;
        debug!(file = %file.display(), %status, "child exited");
        Ok(status.success())
    }
}

/// Keeps SIGINT from terminating the orchestrator while it is installed; the
/// child still receives it.
struct InterruptGuard(SigId);

impl InterruptGuard {
    fn install() -> Result<Self, HarnessError> {
        let interrupted = Arc::new(AtomicBool::new(false));
        signal_hook::flag::register(SIGINT, interrupted)
            .map(InterruptGuard)
            .map_err(HarnessError::Signal)
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        signal_hook::low_level::unregister(self.0);
    }
}
