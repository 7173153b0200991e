//! Memoized source lines for trace annotation.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

/// Shown when a frame's file cannot be read or the line does not exist.
pub const UNAVAILABLE: &str = "(Can't display line)";

/// Each file is read at most once per process, including failed reads.
#[derive(Debug, Default)]
pub struct SourceLineCache {
    files: HashMap<PathBuf, Option<Vec<String>>>,
}

impl SourceLineCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The trimmed text of 1-based `line` in `path`, or [`UNAVAILABLE`].
    pub fn line(&mut self, path: &Path, line: usize) -> String {
        let lines = self.files.entry(path.to_path_buf()).or_insert_with(|| {
            fs::read_to_string(path)
                .ok()
                .map(|text| text.lines().map(str::to_string).collect())
        });

        lines
            .as_ref()
            .and_then(|lines| lines.get(line.checked_sub(1)?))
            .map(|text| text.trim().to_string())
            .unwrap_or_else(|| UNAVAILABLE.to_string())
    }

    pub fn cached_files(&self) -> usize {
        self.files.len()
    }
}
