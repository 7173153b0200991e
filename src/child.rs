//! The per-file failure boundary, run inside a child process.
//!
//! A child loads the prelude and then its one test file. Any failure that
//! unwinds out of the file is caught here, reported and turned into a failing
//! exit status. Nothing about the failure crosses back to the parent except that
//! status.

use std::{path::Path, thread};

use signal_hook::{
    consts::{SIGINT, SIGTERM},
    iterator::Signals,
};
use tracing::{debug, error, info, warn};

use crate::config::RunConfig;
use crate::report::{self, Reporter};
use crate::runtime::Interpreter;

/// Stack reserved for the interpreter thread. Every script call nests a dozen
/// or so Rust frames, so this must cover
/// [`CallStack::MAX_DEPTH`](crate::runtime::CallStack::MAX_DEPTH) script frames
/// in unoptimized builds.
pub const INTERPRETER_STACK_SIZE: usize = 256 * 1024 * 1024;

/// Runs `path` with console output; true if the file completed without failure.
///
/// The interpreter runs on its own thread with [`INTERPRETER_STACK_SIZE`] of
/// stack, so runaway recursion ends in `stack level too deep` and a report
/// instead of a native stack overflow.
pub fn run(path: &Path, config: &RunConfig) -> bool {
    thread::scope(|scope| {
        let spawned = thread::Builder::new()
            .name("isotest-interpreter".into())
            .stack_size(INTERPRETER_STACK_SIZE)
            .spawn_scoped(scope, || run_with(path, config, Reporter::stdio()));
        match spawned {
            Ok(handle) => handle.join().unwrap_or_else(|_| {
                error!(file = %path.display(), "interpreter thread panicked");
                false
            }),
            Err(err) => {
                error!(%err, "cannot start the interpreter thread");
                false
            }
        }
    })
}

pub fn run_with(path: &Path, config: &RunConfig, reporter: Reporter) -> bool {
    let mut interpreter = Interpreter::new(config, reporter);
    let outcome = interpreter
        .load_prelude()
        .and_then(|()| interpreter.load_file(path).map(|_| ()));

    match outcome {
        Ok(()) => {
            interpreter.reporter_mut().flush();
            info!(file = %path.display(), "file passed");
            true
        }
        Err(failure) => {
            debug!(file = %path.display(), kind = %failure.kind, "file failed");
            report::report_failure(interpreter.reporter_mut(), path, &failure, config.backtrace);
            if config.interactive_rescue && !failure.kind.is_load_failure() {
                pause_for_rescue(interpreter.reporter_mut());
            }
            false
        }
    }
}

/// Blocks until SIGINT or SIGTERM so a debugger can be attached to this process.
///
/// The handlers are installed before the pause line is printed, so a signal sent
/// in response to that line always ends the pause rather than the process.
fn pause_for_rescue(reporter: &mut Reporter) {
    let mut signals = match Signals::new([SIGINT, SIGTERM]) {
        Ok(signals) => signals,
        Err(err) => {
            warn!(%err, "cannot wait for signals, not pausing");
            return;
        }
    };
    reporter.print_line(&format!(
        "  paused for inspection (pid {}), interrupt to continue",
        std::process::id()
    ));
    reporter.flush();
    let signal = signals.forever().next();
    debug!(?signal, "rescue pause interrupted");
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn run_source(source: &str, config: RunConfig) -> (bool, String, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("case.ist");
        fs::write(&file, source).unwrap();
        let (reporter, output) = Reporter::captured();
        let passed = run_with(&file, &config, reporter);
        (passed, output.contents(), file)
    }

    #[test]
    fn test_clean_file_passes() {
        let (passed, text, _) = run_source("(test \"ok\" (assert true))", RunConfig::default());
        assert!(passed);
        assert!(text.contains("Test: ok ✔"));
    }

    #[test]
    fn test_failure_is_reported_with_source_line() {
        let source = "(scope \"s\"\n  (test \"bad\"\n    (assert-equal 1 2)))\n";
        let (passed, text, file) = run_source(source, RunConfig::default());
        assert!(!passed);
        let expected = format!(
            "  Test: bad ✘\n  → file: {} ↪3\n  → line: (assert-equal 1 2)))\n  AssertionFailed: 1 != 2\n",
            file.display()
        );
        assert!(text.contains(&expected), "{text}");
    }

    #[test]
    fn test_syntax_error_prints_summary_only() {
        let (passed, text, _) = run_source("(test \"x\"\n  (assert true)", RunConfig::default());
        assert!(!passed);
        assert!(text.contains("SyntaxError: "));
        assert!(!text.contains("✘"));
        assert!(!text.contains("→ file"));
    }

    #[test]
    fn test_runaway_recursion_is_reported_not_a_crash() {
        let source = "(defn f [n] (+ 1 (f (- n 1))))\n(test \"deep\"\n  (f 1))\n";
        let (passed, text, _) = thread::Builder::new()
            .stack_size(INTERPRETER_STACK_SIZE)
            .spawn(move || run_source(source, RunConfig::default()))
            .unwrap()
            .join()
            .unwrap();
        assert!(!passed);
        assert!(text.contains("  Test: deep ✘\n"), "{text}");
        assert!(text.contains("  RuntimeError: stack level too deep\n"), "{text}");
    }

    #[test]
    fn test_load_failure_does_not_pause_for_rescue() {
        let config = RunConfig {
            interactive_rescue: true,
            ..RunConfig::default()
        };
        let (passed, text, _) = run_source("(test \"x\"", config);
        assert!(!passed);
        assert!(text.contains("SyntaxError: "));
        assert!(!text.contains("paused for inspection"));
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let (reporter, output) = Reporter::captured();
        let passed = run_with(Path::new("/definitely/missing.ist"), &RunConfig::default(), reporter);
        assert!(!passed);
        assert!(output.contents().contains("LoadError: cannot load such file -- /definitely/missing.ist"));
    }
}
