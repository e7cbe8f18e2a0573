//! Locating metadata files.
//!
//! Only the direct children of a directory are looked at. Names are matched
//! exactly, except on Windows and macOS where the file system is usually
//! case-insensitive.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

/// Default metadata file name.
pub const DEFAULT_FILENAME: &str = "metadata.gamedeck.txt";

/// Legacy metadata file name, still accepted.
pub const LEGACY_FILENAME: &str = "metadata.txt";

/// Recognized names in lookup order.
pub const METAFILE_NAMES: [&str; 2] = [DEFAULT_FILENAME, LEGACY_FILENAME];

/// Subdirectory of the config dir holding global metadata files.
pub const GLOBAL_METAFILE_DIR: &str = "metafiles";

const CASE_INSENSITIVE: bool = cfg!(any(windows, target_os = "macos"));

fn names_equal(a: &str, b: &str) -> bool {
    if CASE_INSENSITIVE {
        a.eq_ignore_ascii_case(b)
    } else {
        a == b
    }
}

fn ends_with_name(name: &str, suffix: &str) -> bool {
    if name.len() < suffix.len() || !name.is_char_boundary(name.len() - suffix.len()) {
        return false;
    }
    names_equal(&name[name.len() - suffix.len()..], suffix)
}

/// Whether a file name is one of the recognized metadata file names.
///
/// # Examples
///
/// ```
/// use gamedeck_metafile::discovery::is_metafile_name;
///
/// assert!(is_metafile_name("metadata.gamedeck.txt"));
/// assert!(is_metafile_name("metadata.txt"));
/// assert!(!is_metafile_name("readme.txt"));
/// ```
pub fn is_metafile_name(name: &str) -> bool {
    METAFILE_NAMES.iter().any(|known| names_equal(name, known))
}

/// Whether a file name is a global metadata file, `<anything>.metadata.txt`
/// or `<anything>.metadata.gamedeck.txt`.
pub fn is_global_metafile_name(name: &str) -> bool {
    METAFILE_NAMES
        .iter()
        .any(|known| name.len() > known.len() + 1 && ends_with_name(name, &format!(".{known}")))
}

fn sorted_files(dir: &Path, accept: impl Fn(&str) -> bool) -> Vec<PathBuf> {
    let Ok(read_dir) = fs::read_dir(dir) else {
        debug!(dir = %dir.display(), "directory not readable");
        return Vec::new();
    };

    let mut found: Vec<PathBuf> = read_dir
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().map(|ty| !ty.is_dir()).unwrap_or(false))
        .filter(|entry| entry.file_name().to_str().map(&accept).unwrap_or(false))
        .map(|entry| entry.path())
        .collect();
    found.sort();
    found
}

fn name_rank(path: &Path) -> usize {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    METAFILE_NAMES
        .iter()
        .position(|known| names_equal(name, known))
        .unwrap_or(METAFILE_NAMES.len())
}

/// Metadata files directly inside `dir`, default name first.
///
/// Logs every hit. An empty result is not logged here: the caller decides how
/// to report a directory without metadata (see [`no_metafile_message`]).
pub fn find_in_dir(dir: &Path) -> Vec<PathBuf> {
    let mut found = sorted_files(dir, is_metafile_name);
    found.sort_by_key(|path| name_rank(path));

    for path in &found {
        info!("found `{}`", path.display());
    }
    found
}

/// Global metadata files inside `dir`, sorted by name.
///
/// A missing directory yields nothing and is not reported.
pub fn find_in_global_dir(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }
    let found = sorted_files(dir, is_global_metafile_name);
    for path in &found {
        info!("found `{}`", path.display());
    }
    found
}

/// Warning text for a game directory without any metadata file.
pub fn no_metafile_message(dir: &Path) -> String {
    format!("No metadata file found in `{}`, directory ignored", dir.display())
}
