//! `KEY=VALUE` environment files (`-e`).

use std::{fs, path::Path};

use tracing::debug;

use crate::errors::HarnessError;

/// One line of an env file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvLine {
    /// Blank line or `#` comment.
    Skip,
    Pair(String, String),
    /// No `=`, or nothing before it.
    Malformed,
}

/// Parses one line.
///
/// The value is everything after the first `=`, with literal `\n` sequences
/// removed and surrounding whitespace trimmed.
pub fn parse_line(line: &str) -> EnvLine {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return EnvLine::Skip;
    }
    let Some((key, value)) = trimmed.split_once('=') else {
        return EnvLine::Malformed;
    };
    let key = key.trim();
    if key.is_empty() {
        return EnvLine::Malformed;
    }
    let value = value.replace("\\n", "").trim().to_string();
    EnvLine::Pair(key.to_string(), value)
}

/// Parses a whole env file, naming the first malformed line.
pub fn parse(path: &Path, text: &str) -> Result<Vec<(String, String)>, HarnessError> {
    let mut vars = Vec::new();
    for (index, line) in text.lines().enumerate() {
        match parse_line(line) {
            EnvLine::Pair(key, value) => vars.push((key, value)),
            EnvLine::Skip => {}
            EnvLine::Malformed => {
                return Err(HarnessError::EnvLine {
                    path: path.to_path_buf(),
                    line: index + 1,
                })
            }
        }
    }
    Ok(vars)
}

/// Loads `path` into the process environment before any child is spawned, so
/// every child inherits it. Returns the number of variables set.
pub fn load_env_file(path: &Path) -> Result<usize, HarnessError> {
    let text = fs::read_to_string(path).map_err(|source| HarnessError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let vars = parse(path, &text)?;
    for (key, value) in &vars {
        std::env::set_var(key, value);
    }
    debug!(path = %path.display(), count = vars.len(), "loaded env file");
    Ok(vars.len())
}
