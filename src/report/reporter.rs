//! Console rendering of the run protocol.
//!
//! Everything a child prints about its tests goes through [`Reporter`]: scope
//! headers, success ticks, pass/fail lines, trace frames and error summaries.
//! Ticks are written inline; the reporter remembers whether a line is still open
//! so the next line-oriented output starts on a fresh line.

use std::{
    cell::RefCell,
    io::{self, IsTerminal, Write},
    rc::Rc,
    time::Duration,
};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::errors::ErrorKind;
use crate::report::SourceLineCache;
use crate::runtime::Frame;

pub const PASS_MARK: &str = "✔";
pub const FAIL_MARK: &str = "✘";
pub const TICK: &str = "•";

pub struct Reporter {
    out: Box<dyn WriteColor>,
    err: Box<dyn WriteColor>,
    line_open: bool,
    /// A test has started but printed no tick yet.
    indent_pending: bool,
    sources: SourceLineCache,
}

impl Reporter {
    pub fn new(out: Box<dyn WriteColor>, err: Box<dyn WriteColor>) -> Self {
        Self {
            out,
            err,
            line_open: false,
            indent_pending: false,
            sources: SourceLineCache::new(),
        }
    }

    /// Reporter on the process's stdout/stderr. Colors are off when stdout is not
    /// a terminal or `NO_COLOR` is set.
    pub fn stdio() -> Self {
        let choice = if std::env::var_os("NO_COLOR").is_some() || !io::stdout().is_terminal() {
            ColorChoice::Never
        } else {
            ColorChoice::Auto
        };
        Self::new(
            Box::new(StandardStream::stdout(choice)),
            Box::new(StandardStream::stderr(choice)),
        )
    }

    /// Reporter writing both streams, uncolored, into a shared buffer.
    pub fn captured() -> (Self, CapturedOutput) {
        let output = CapturedOutput::default();
        let reporter = Self::new(Box::new(output.clone()), Box::new(output.clone()));
        (reporter, output)
    }

    // ========================================================================
    // PROTOCOL
    // ========================================================================

    pub fn scope_header(&mut self, name: &str) {
        self.close_line();
        self.colored(&color(Color::Yellow, true), "Scope: ");
        self.plain(&format!("{name}\n\n"));
    }

    /// Starts the tick line of a test about to run. The indent is written with
    /// the first tick, so a test failing before any tick leaves no empty line.
    pub fn begin_test(&mut self) {
        self.close_line();
        self.indent_pending = true;
    }

    /// One passing assertion.
    pub fn tick(&mut self) {
        if std::mem::take(&mut self.indent_pending) {
            self.plain("  ");
        }
        self.plain(TICK);
        self.line_open = true;
        let _ = self.out.flush();
    }

    pub fn test_passed(&mut self, name: &str, elapsed: Duration) {
        self.close_line();
        self.colored(&color(Color::Yellow, true), "  Test: ");
        self.plain(&format!("{name} "));
        self.colored(&color(Color::Green, false), PASS_MARK);
        self.plain("\n");
        self.colored(
            &color(Color::Blue, true),
            &format!("  ({:.6}s)\n", elapsed.as_secs_f64()),
        );
    }

    pub fn test_failed(&mut self, name: Option<&str>) {
        self.close_line();
        self.colored(&color(Color::Yellow, true), "  Test: ");
        if let Some(name) = name.filter(|name| !name.is_empty()) {
            self.plain(&format!("{name} "));
        }
        self.colored(&color(Color::Red, false), FAIL_MARK);
        self.plain("\n");
    }

    /// A frame pointer plus the source line it points at.
    pub fn trace_frame(&mut self, frame: &Frame) {
        let code = self.sources.line(&frame.file, frame.line);
        self.plain(&format!(
            "  → file: {} ↪{}\n",
            frame.file.display(),
            frame.line
        ));
        self.plain("  → ");
        self.colored(&color(Color::Black, true), &format!("line: {code}\n"));
    }

    /// `<Kind>: <message>` followed by a blank line.
    pub fn error_summary(&mut self, kind: ErrorKind, message: &str) {
        self.close_line();
        self.colored(&color(Color::Yellow, true), &format!("  {kind}: "));
        self.colored(&color(Color::Red, false), message);
        self.plain("\n\n");
    }

    /// Script output from `print`.
    pub fn print_line(&mut self, text: &str) {
        self.close_line();
        self.plain(&format!("{text}\n"));
    }

    pub fn warning(&mut self, text: &str) {
        let _ = self.err.set_color(&color(Color::Yellow, false));
        let _ = writeln!(self.err, "{text}");
        let _ = self.err.reset();
    }

    /// Ends a pending tick line.
    pub fn close_line(&mut self) {
        self.indent_pending = false;
        if self.line_open {
            self.line_open = false;
            self.plain("\n");
        }
    }

    pub fn flush(&mut self) {
        let _ = self.out.flush();
        let _ = self.err.flush();
    }

    // ========================================================================
    // PRIVATE HELPERS
    // ========================================================================

    fn plain(&mut self, text: &str) {
        let _ = self.out.write_all(text.as_bytes());
    }

    fn colored(&mut self, spec: &ColorSpec, text: &str) {
        let _ = self.out.set_color(spec);
        let _ = self.out.write_all(text.as_bytes());
        let _ = self.out.reset();
    }
}

fn color(fg: Color, intense: bool) -> ColorSpec {
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(fg)).set_intense(intense);
    spec
}

// ============================================================================
// CAPTURE SINK
// ============================================================================

/// Collects reporter output in memory, without color, for tests and programmatic
/// capture.
#[derive(Clone, Default)]
pub struct CapturedOutput {
    buffer: Rc<RefCell<Vec<u8>>>,
}

impl CapturedOutput {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.borrow()).into_owned()
    }
}

impl Write for CapturedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl WriteColor for CapturedOutput {
    fn supports_color(&self) -> bool {
        false
    }

    fn set_color(&mut self, _spec: &ColorSpec) -> io::Result<()> {
        Ok(())
    }

    fn reset(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_share_a_line_until_closed() {
        let (mut reporter, output) = Reporter::captured();
        reporter.begin_test();
        reporter.tick();
        reporter.tick();
        reporter.test_passed("works", Duration::from_millis(2));
        let text = output.contents();
        assert!(text.starts_with("  ••\n  Test: works ✔\n  (0.002000s)\n"), "{text}");
    }

    #[test]
    fn test_failure_before_any_tick_leaves_no_blank_line() {
        let (mut reporter, output) = Reporter::captured();
        reporter.begin_test();
        reporter.test_failed(Some("adds"));
        reporter.begin_test();
        reporter.test_passed("empty", Duration::ZERO);
        assert_eq!(
            output.contents(),
            "  Test: adds ✘\n  Test: empty ✔\n  (0.000000s)\n"
        );
    }

    #[test]
    fn test_failed_line_omits_empty_name() {
        let (mut reporter, output) = Reporter::captured();
        reporter.test_failed(None);
        reporter.test_failed(Some("named"));
        assert_eq!(output.contents(), "  Test: ✘\n  Test: named ✘\n");
    }

    #[test]
    fn test_error_summary_closes_pending_tick_line() {
        let (mut reporter, output) = Reporter::captured();
        reporter.tick();
        reporter.error_summary(ErrorKind::AssertionFailed, "1 != 2");
        assert_eq!(output.contents(), "•\n  AssertionFailed: 1 != 2\n\n");
    }

    #[test]
    fn test_trace_frame_placeholder_for_unreadable_file() {
        let (mut reporter, output) = Reporter::captured();
        reporter.trace_frame(&Frame::new("/no/such/file.ist", 3, "<main>"));
        assert_eq!(
            output.contents(),
            "  → file: /no/such/file.ist ↪3\n  → line: (Can't display line)\n"
        );
    }
}
