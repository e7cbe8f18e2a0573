//! File filters declared by collections and their expansion into files.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use gamedeck_common::paths::{canonicalize, extension_lowercase};
use regex::Regex;
use tracing::{debug, trace};
use walkdir::WalkDir;

/// Subdirectory name never entered while scanning for game files.
pub(crate) const MEDIA_DIR_NAME: &str = "media";

/// Declarative file selection rules of one `collection:` block.
#[derive(Debug, Clone)]
pub struct FileFilter {
    /// Collection the matched files belong to.
    pub collection: String,
    /// Directory of the metadata file that declared the filter.
    pub root_dir: PathBuf,
    /// Directories to scan; empty means `root_dir`.
    pub directories: Vec<PathBuf>,
    /// Lowercase extensions without the dot.
    pub extensions: Vec<String>,
    /// Explicitly listed files, not yet canonicalized.
    pub files: Vec<PathBuf>,
    pub regex: Option<Regex>,
    pub ignore_extensions: Vec<String>,
    pub ignore_files: Vec<PathBuf>,
    pub ignore_regex: Option<Regex>,
}

/// A file selected by a filter, with the directory it was found from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FilterMatch {
    /// Canonical file path.
    pub path: PathBuf,
    /// Canonical scan directory, or the filter root for explicit files.
    pub root: PathBuf,
}

impl FileFilter {
    pub fn new(collection: impl Into<String>, root_dir: PathBuf) -> Self {
        Self {
            collection: collection.into(),
            root_dir,
            directories: Vec::new(),
            extensions: Vec::new(),
            files: Vec::new(),
            regex: None,
            ignore_extensions: Vec::new(),
            ignore_files: Vec::new(),
            ignore_regex: None,
        }
    }

    /// Whether directory scanning can match anything at all.
    fn scans_directories(&self) -> bool {
        !self.extensions.is_empty() || self.regex.is_some()
    }

    /// Directories to scan, canonicalized; missing ones are skipped.
    ///
    /// The metadata file's own directory always comes first, declared
    /// directories are scanned in addition to it.
    pub fn scan_dirs(&self) -> Vec<PathBuf> {
        if !self.scans_directories() {
            return Vec::new();
        }
        let declared = std::iter::once(&self.root_dir).chain(&self.directories);

        let mut dirs = Vec::new();
        for dir in declared {
            match canonicalize(dir) {
                Some(dir) if dir.is_dir() => {
                    if !dirs.contains(&dir) {
                        dirs.push(dir);
                    }
                }
                _ => debug!(dir = %dir.display(), "filter directory does not exist"),
            }
        }
        dirs
    }

    fn matches_name(&self, path: &Path) -> bool {
        let by_ext = extension_lowercase(path)
            .map(|ext| self.extensions.contains(&ext))
            .unwrap_or(false);
        by_ext || self.regex_matches(self.regex.as_ref(), path)
    }

    fn is_ignored(&self, path: &Path, ignored_files: &[PathBuf]) -> bool {
        let by_ext = extension_lowercase(path)
            .map(|ext| self.ignore_extensions.contains(&ext))
            .unwrap_or(false);
        by_ext
            || self.regex_matches(self.ignore_regex.as_ref(), path)
            || ignored_files.iter().any(|ignored| ignored == path)
    }

    fn regex_matches(&self, regex: Option<&Regex>, path: &Path) -> bool {
        match (regex, path.file_name().and_then(|n| n.to_str())) {
            (Some(regex), Some(name)) => regex.is_match(name),
            _ => false,
        }
    }

    /// Expand the filter into concrete files.
    ///
    /// The result is the explicit files plus the matching files of each scan
    /// directory, minus everything an ignore rule selects. Directories are
    /// scanned non-recursively unless `recursive` is set; a `media`
    /// subdirectory is never entered. Results are sorted by path.
    pub fn expand(&self, recursive: bool) -> Vec<FilterMatch> {
        let ignored_files: Vec<PathBuf> =
            self.ignore_files.iter().filter_map(canonicalize).collect();

        let mut found = BTreeSet::new();

        for file in &self.files {
            match canonicalize(file) {
                Some(path) if path.is_file() => {
                    found.insert(FilterMatch {
                        path,
                        root: self.root_dir.clone(),
                    });
                }
                _ => debug!(file = %file.display(), "explicit collection file not found"),
            }
        }

        for dir in self.scan_dirs() {
            let max_depth = if recursive { usize::MAX } else { 1 };
            let walker = WalkDir::new(&dir)
                .min_depth(1)
                .max_depth(max_depth)
                .follow_links(true)
                .into_iter()
                .filter_entry(|entry| {
                    !(entry.depth() > 0
                        && entry.file_type().is_dir()
                        && entry.file_name() == MEDIA_DIR_NAME)
                });

            for entry in walker.filter_map(Result::ok) {
                if !entry.file_type().is_file() || !self.matches_name(entry.path()) {
                    continue;
                }
                if let Some(path) = canonicalize(entry.path()) {
                    trace!(file = %path.display(), "filter match");
                    found.insert(FilterMatch {
                        path,
                        root: dir.clone(),
                    });
                }
            }
        }

        let mut seen = BTreeSet::new();
        found
            .into_iter()
            .filter(|m| !self.is_ignored(&m.path, &ignored_files))
            .filter(|m| seen.insert(m.path.clone()))
            .collect()
    }
}
