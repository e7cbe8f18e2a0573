//! Warnings collected during an aggregation run.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// A non-fatal problem found while reading metadata.
///
/// Every diagnostic is also logged through `tracing` when it is recorded;
/// keeping them on the context lets callers report or test them afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Metadata file the problem was found in, if any.
    pub file: Option<PathBuf>,
    /// 1-based line number inside `file`.
    pub line: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    /// A diagnostic not tied to a file position.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            file: None,
            line: None,
            message: message.into(),
        }
    }

    /// A diagnostic for a line of a metadata file.
    pub fn at(file: &Path, line: usize, message: impl Into<String>) -> Self {
        Self {
            file: Some(file.to_path_buf()),
            line: Some(line),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => {
                write!(f, "`{}`, line {}: {}", file.display(), line, self.message)
            }
            (Some(file), None) => write!(f, "`{}`: {}", file.display(), self.message),
            _ => f.write_str(&self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_position() {
        let diag = Diagnostic::at(Path::new("/games/metadata.txt"), 60, "duplicate file `horse.ext`");
        assert_eq!(
            diag.to_string(),
            "`/games/metadata.txt`, line 60: duplicate file `horse.ext`"
        );
    }

    #[test]
    fn test_display_plain() {
        let diag = Diagnostic::new("No metadata file found in `/x`, directory ignored");
        assert_eq!(diag.to_string(), "No metadata file found in `/x`, directory ignored");
    }
}
