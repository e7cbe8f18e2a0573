//! Line reader for metadata files.
//!
//! The format is a sequence of entries:
//!
//! ```text
//! # comment
//! key: first value line
//!   continuation line
//!   another one
//!
//! next-key: value
//! ```
//!
//! A line starting with whitespace continues the current entry, a blank line
//! ends it. Problems are reported per line and never stop the reader.

use std::fs;
use std::io;
use std::path::Path;

/// One logical `key: value` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// 1-based line number of the key.
    pub line: usize,
    /// Trimmed, lowercase key.
    pub key: String,
    /// Trimmed value lines; the inline value is omitted when empty.
    pub values: Vec<String>,
}

/// Line-level reader problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ReadError {
    #[error("line continuation without a key, ignored")]
    ContinuationWithoutKey,

    #[error("line is not a `key: value` pair, ignored")]
    NotKeyValue,
}

/// A [`ReadError`] together with the line it occurred on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {kind}")]
pub struct LineError {
    pub line: usize,
    pub kind: ReadError,
}

/// Read and split a metadata file.
///
/// Only the failure to read the file itself is an error; malformed lines
/// come back as [`LineError`] items in file order.
pub fn read_file(path: &Path) -> io::Result<Vec<Result<Entry, LineError>>> {
    let text = fs::read_to_string(path)?;
    Ok(read_str(&text))
}

/// Split metadata text into entries and line errors, in file order.
pub fn read_str(text: &str) -> Vec<Result<Entry, LineError>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut items = Vec::new();
    let mut current: Option<Entry> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            items.extend(current.take().map(Ok));
            continue;
        }
        if trimmed.starts_with('#') {
            continue;
        }

        if raw.starts_with(char::is_whitespace) {
            match current.as_mut() {
                Some(entry) => entry.values.push(trimmed.to_string()),
                None => items.push(Err(LineError {
                    line,
                    kind: ReadError::ContinuationWithoutKey,
                })),
            }
            continue;
        }

        items.extend(current.take().map(Ok));

        let Some((key, value)) = raw.split_once(':') else {
            items.push(Err(LineError {
                line,
                kind: ReadError::NotKeyValue,
            }));
            continue;
        };
        let key = key.trim().to_lowercase();
        if key.is_empty() {
            items.push(Err(LineError {
                line,
                kind: ReadError::NotKeyValue,
            }));
            continue;
        }

        let value = value.trim();
        let values = if value.is_empty() {
            Vec::new()
        } else {
            vec![value.to_string()]
        };
        current = Some(Entry { line, key, values });
    }

    items.extend(current.map(Ok));
    items
}

/// Join the value lines of an entry into one string.
///
/// Lines are separated by a single space. A line holding a lone `.` becomes a
/// paragraph break (`\n\n`) with no spaces around it.
///
/// # Examples
///
/// ```
/// use gamedeck_metafile::merge_lines;
///
/// let lines = ["first".to_string(), "second".to_string(), ".".to_string(), "third".to_string()];
/// assert_eq!(merge_lines(&lines), "first second\n\nthird");
/// ```
pub fn merge_lines<S: AsRef<str>>(values: &[S]) -> String {
    let mut out = String::new();
    for value in values {
        let value = value.as_ref();
        if value == "." {
            out.push_str("\n\n");
            continue;
        }
        if !out.is_empty() && !out.ends_with('\n') {
            out.push(' ');
        }
        out.push_str(value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(text: &str) -> Vec<Entry> {
        read_str(text).into_iter().filter_map(Result::ok).collect()
    }

    #[test]
    fn test_basic_entries() {
        let items = entries("collection: Foo\nextensions: a, b\n");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].line, 1);
        assert_eq!(items[0].key, "collection");
        assert_eq!(items[0].values, ["Foo"]);
        assert_eq!(items[1].line, 2);
        assert_eq!(items[1].values, ["a, b"]);
    }

    #[test]
    fn test_key_is_lowercased_and_trimmed() {
        let items = entries("  \nShort-Name  :  foo  \n");
        assert_eq!(items[0].key, "short-name");
        assert_eq!(items[0].values, ["foo"]);
        assert_eq!(items[0].line, 2);
    }

    #[test]
    fn test_value_may_contain_colons() {
        let items = entries("launch: emu --opt=a:b {file.path}\n");
        assert_eq!(items[0].values, ["emu --opt=a:b {file.path}"]);
    }

    #[test]
    fn test_continuation_lines() {
        let text = "description:\n  line one\n\tline two\nrating: 50%\n";
        let items = entries(text);
        assert_eq!(items.len(), 2);
        assert!(items[0].values.len() == 2);
        assert_eq!(items[0].values, ["line one", "line two"]);
        assert_eq!(items[1].key, "rating");
    }

    #[test]
    fn test_comments_are_skipped() {
        let text = "# header\ngame: Foo\n  # not a comment inside\n    # still skipped\nfile: a.ext\n";
        let items = entries(text);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].values, ["Foo"]);
        assert_eq!(items[1].key, "file");
    }

    #[test]
    fn test_bom_and_crlf() {
        let items = entries("\u{feff}game: Foo\r\nfile: a.ext\r\n");
        assert_eq!(items[0].key, "game");
        assert_eq!(items[0].values, ["Foo"]);
        assert_eq!(items[1].values, ["a.ext"]);
    }

    #[test]
    fn test_blank_line_ends_entry() {
        let items = read_str("summary: one\n\n  orphan\n");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap().values, ["one"]);
        assert_eq!(
            items[1],
            Err(LineError {
                line: 3,
                kind: ReadError::ContinuationWithoutKey
            })
        );
    }

    #[test]
    fn test_errors_keep_reading() {
        let items = read_str("  leading\nno separator here\n: empty key\ngame: Bar\n");
        let errors: Vec<_> = items.iter().filter_map(|r| r.as_ref().err()).collect();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0].kind, ReadError::ContinuationWithoutKey);
        assert_eq!(errors[1].kind, ReadError::NotKeyValue);
        assert_eq!(errors[1].line, 2);
        assert_eq!(errors[2].line, 3);
        assert_eq!(items.last().unwrap().as_ref().unwrap().key, "game");
    }

    #[test]
    fn test_error_display() {
        let err = LineError {
            line: 7,
            kind: ReadError::NotKeyValue,
        };
        assert_eq!(err.to_string(), "line 7: line is not a `key: value` pair, ignored");
    }

    #[test]
    fn test_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.gamedeck.txt");
        std::fs::write(&path, "game: Foo\n").unwrap();

        let items = read_file(&path).unwrap();
        assert_eq!(items.len(), 1);
        assert!(read_file(&dir.path().join("missing.txt")).is_err());
    }

    #[test]
    fn test_merge_lines() {
        assert_eq!(merge_lines::<String>(&[]), "");
        assert_eq!(merge_lines(&["a", "b", "c"]), "a b c");
        assert_eq!(merge_lines(&["a", ".", "b"]), "a\n\nb");
        assert_eq!(merge_lines(&[".", "b"]), "\n\nb");
        assert_eq!(merge_lines(&["a", ".", ".", "b"]), "a\n\n\n\nb");
    }
}
