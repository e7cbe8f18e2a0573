//! # gamedeck-metafile
//!
//! Reading and interpreting gamedeck metadata files.
//!
//! A metadata file is a line-oriented UTF-8 text file made of `key: value`
//! entries. This crate provides the three layers below the catalog builder:
//!
//! - [`discovery`]: locating metadata files by their well-known names
//! - [`reader`]: splitting a file into [`Entry`] records with line numbers
//! - [`grammar`]: mapping keys to typed attributes and validating values
//!
//! ## Quick Start
//!
//! ```
//! use gamedeck_metafile::grammar::{classify, Key};
//! use gamedeck_metafile::reader::read_str;
//!
//! let text = "collection: My Games\nextension: ext\n\ngame: Foo\nrating: 80%\n";
//! let entries: Vec<_> = read_str(text).into_iter().filter_map(Result::ok).collect();
//!
//! assert_eq!(entries.len(), 4);
//! assert_eq!(classify(&entries[0].key), Key::Collection);
//! assert_eq!(entries[3].values, ["80%"]);
//! ```

pub mod discovery;
pub mod grammar;
pub mod reader;

pub use reader::{merge_lines, Entry, LineError, ReadError};
