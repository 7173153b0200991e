//! The interpreter's explicit call stack.
//!
//! A frame is pushed for every loaded file, scope body, test body, prepare/setup
//! action and user-function call. The top frame's line follows the form being
//! evaluated, so a snapshot taken at a raise point records, for every active
//! frame, the line it was executing.

use std::{
    fmt,
    path::{Path, PathBuf},
};

/// What pushed a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    File,
    Scope,
    Test,
    Action,
    Function,
}

/// A captured stack frame: `file:line:in 'label'`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub file: PathBuf,
    pub line: usize,
    pub label: String,
}

impl Frame {
    pub fn new(file: impl Into<PathBuf>, line: usize, label: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            label: label.into(),
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:in '{}'", self.file.display(), self.line, self.label)
    }
}

#[derive(Debug, Clone)]
struct ActiveFrame {
    kind: FrameKind,
    frame: Frame,
}

#[derive(Debug, Default)]
pub struct CallStack {
    frames: Vec<ActiveFrame>,
}

impl CallStack {
    /// Deepest nesting allowed before a call raises `stack level too deep`.
    pub const MAX_DEPTH: usize = 512;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: FrameKind, file: impl Into<PathBuf>, label: impl Into<String>) {
        self.frames.push(ActiveFrame {
            kind,
            frame: Frame::new(file, 0, label),
        });
    }

    pub fn pop(&mut self) {
        self.frames.pop();
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Records the line of the form the top frame is evaluating.
    pub fn set_line(&mut self, line: usize) {
        if let Some(top) = self.frames.last_mut() {
            top.frame.line = line;
        }
    }

    pub fn current(&self) -> Option<&Frame> {
        self.frames.last().map(|active| &active.frame)
    }

    pub fn current_kind(&self) -> Option<FrameKind> {
        self.frames.last().map(|active| active.kind)
    }

    /// The frame below the top one.
    pub fn caller(&self) -> Option<&Frame> {
        let len = self.frames.len();
        len.checked_sub(2)
            .and_then(|i| self.frames.get(i))
            .map(|active| &active.frame)
    }

    pub fn current_file(&self) -> Option<&Path> {
        self.current().map(|frame| frame.file.as_path())
    }

    /// Every active frame, innermost first.
    pub fn snapshot(&self) -> Vec<Frame> {
        self.frames
            .iter()
            .rev()
            .map(|active| active.frame.clone())
            .collect()
    }

    /// The single frame an assertion failure is attributed to.
    ///
    /// Inside a user function (a custom assertion) that is the line which called
    /// the function; anywhere else it is the line currently executing.
    pub fn assertion_site(&self) -> Vec<Frame> {
        let site = match self.current_kind() {
            Some(FrameKind::Function) => self.caller().or_else(|| self.current()),
            _ => self.current(),
        };
        site.cloned().into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack() -> CallStack {
        let mut stack = CallStack::new();
        stack.push(FrameKind::File, "t.ist", "<main>");
        stack.set_line(3);
        stack.push(FrameKind::Test, "t.ist", "test");
        stack.set_line(5);
        stack
    }

    #[test]
    fn test_snapshot_is_innermost_first() {
        let snapshot = stack().snapshot();
        assert_eq!(snapshot[0], Frame::new("t.ist", 5, "test"));
        assert_eq!(snapshot[1], Frame::new("t.ist", 3, "<main>"));
    }

    #[test]
    fn test_assertion_site_in_test_body_is_current_line() {
        assert_eq!(stack().assertion_site(), vec![Frame::new("t.ist", 5, "test")]);
    }

    #[test]
    fn test_assertion_site_in_function_is_caller_line() {
        let mut stack = stack();
        stack.push(FrameKind::Function, "helper.ist", "assert-positive");
        stack.set_line(2);
        assert_eq!(stack.assertion_site(), vec![Frame::new("t.ist", 5, "test")]);
    }

    #[test]
    fn test_frame_display() {
        assert_eq!(Frame::new("a.ist", 7, "<main>").to_string(), "a.ist:7:in '<main>'");
    }
}
