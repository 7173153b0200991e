//! Failure reporting: console protocol, trace filtering, source annotation.

pub mod reporter;
pub mod source;
pub mod trace;

pub use reporter::{CapturedOutput, Reporter};
pub use source::SourceLineCache;

use std::path::Path;

use crate::errors::Failure;

/// Prints a failure raised while executing `file`.
///
/// Load failures print only the summary. Anything else prints the failed-test
/// line and the filtered trace first. With `full_backtrace` every captured frame
/// is printed before the summary.
pub fn report_failure(reporter: &mut Reporter, file: &Path, failure: &Failure, full_backtrace: bool) {
    if !failure.kind.is_load_failure() {
        reporter.test_failed(failure.test.as_deref());
        for frame in trace::filtered_trace(&failure.backtrace, file) {
            reporter.trace_frame(frame);
        }
    }
    if full_backtrace {
        for frame in &failure.backtrace {
            reporter.trace_frame(frame);
        }
    }
    reporter.error_summary(failure.kind, &failure.message);
    reporter.flush();
}
