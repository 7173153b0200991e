//! Trace pivoting and runtime-internals filtering.
//!
//! A failure's stack holds every active frame, innermost first. What gets shown is
//! the slice from the innermost frame down to the first frame in the executing
//! file (the pivot), with frames from the embedded prelude removed, outermost
//! first. Without a pivot only the innermost frame is shown.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::runtime::Frame;

/// Files of runtime internals never shown in a filtered trace.
pub static RUNTIME_INTERNALS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<internal:[^>]*>$").expect("static pattern is valid"));

pub fn is_internal(frame: &Frame) -> bool {
    frame
        .file
        .to_str()
        .is_some_and(|file| RUNTIME_INTERNALS.is_match(file))
}

/// Index of the first frame, innermost first, whose file is exactly `file`.
pub fn pivot(frames: &[Frame], file: &Path) -> Option<usize> {
    frames.iter().position(|frame| frame.file == file)
}

/// Frames to print for a failure in `file`, outermost first.
pub fn filtered_trace<'a>(frames: &'a [Frame], file: &Path) -> Vec<&'a Frame> {
    match pivot(frames, file) {
        Some(pivot) => frames[..=pivot]
            .iter()
            .filter(|frame| !is_internal(frame))
            .rev()
            .collect(),
        None => frames.first().into_iter().collect(),
    }
}
