//! Path utilities for canonicalization, resolution and media detection.
//!
//! Games are identified by the canonical form of their file paths, so every
//! path that enters the catalog goes through [`canonicalize`] first. Asset
//! references are published as `file://` URIs built by [`to_file_uri`].

use std::path::{Path, PathBuf};

/// Image file extensions accepted for picture assets.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp", "svg", "apng"];

/// Video file extensions accepted for video assets.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "avi", "mkv", "m4v", "mov"];

/// Audio file extensions accepted for music assets.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "ogg", "wav", "flac", "opus"];

/// Absolute, symlink-free form of an existing file or directory.
///
/// Returns `None` when the path does not exist.
///
/// # Examples
///
/// ```
/// use gamedeck_common::paths::canonicalize;
///
/// assert!(canonicalize("/definitely/not/here.bin").is_none());
/// ```
pub fn canonicalize(path: impl AsRef<Path>) -> Option<PathBuf> {
    strip_verbatim(std::fs::canonicalize(path.as_ref()).ok()?)
}

#[cfg(windows)]
fn strip_verbatim(path: PathBuf) -> Option<PathBuf> {
    // Strip the verbatim prefix so paths compare equal to user input.
    let stripped = path
        .to_str()
        .and_then(|text| text.strip_prefix(r"\\?\"))
        .filter(|rest| !rest.starts_with("UNC"))
        .map(PathBuf::from);
    Some(stripped.unwrap_or(path))
}

#[cfg(not(windows))]
fn strip_verbatim(path: PathBuf) -> Option<PathBuf> {
    Some(path)
}

/// Resolve a path written in a metadata or list file against `base_dir`.
///
/// A leading `~` expands to the home directory. Absolute values are kept,
/// relative ones are joined onto `base_dir`. The result is not canonicalized.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use gamedeck_common::paths::resolve;
///
/// assert_eq!(resolve(Path::new("/games"), "snes/a.sfc"), Path::new("/games/snes/a.sfc"));
/// assert_eq!(resolve(Path::new("/games"), "/roms/b.sfc"), Path::new("/roms/b.sfc"));
/// ```
pub fn resolve(base_dir: &Path, value: &str) -> PathBuf {
    let expanded = shellexpand::tilde(value);
    let path = Path::new(expanded.as_ref());
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Whether the path exists, following symlinks.
pub fn exists(path: &Path) -> bool {
    path.exists()
}

/// Whether the path exists and is a regular file.
pub fn is_file(path: &Path) -> bool {
    path.is_file()
}

/// Build a `file://` URI from an absolute path.
///
/// Path separators are normalized to `/`; no percent-encoding is applied.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use gamedeck_common::paths::to_file_uri;
///
/// assert_eq!(
///     to_file_uri(Path::new("/games/media/Foo/box_front.png")),
///     "file:///games/media/Foo/box_front.png"
/// );
/// ```
pub fn to_file_uri(path: &Path) -> String {
    let text = path.to_string_lossy().replace('\\', "/");
    if text.starts_with('/') {
        format!("file://{text}")
    } else {
        format!("file:///{text}")
    }
}

/// Whether a metadata value already carries a URI scheme such as `http:`.
///
/// Single-letter schemes are treated as Windows drive letters.
pub fn has_uri_scheme(value: &str) -> bool {
    match value.find(':') {
        Some(pos) if pos > 1 => value[..pos]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')),
        _ => false,
    }
}

/// Human readable title derived from a file name.
///
/// The extension is dropped and `_` and `.` become spaces.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use gamedeck_common::paths::title_from_path;
///
/// assert_eq!(title_from_path(Path::new("/roms/Super_Game.v1.sfc")), "Super Game v1");
/// ```
pub fn title_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().replace(['_', '.'], " "))
        .unwrap_or_default()
}

/// Lowercase extension of a path, without the dot.
pub fn extension_lowercase(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
}

/// Check if a path has an image file extension.
pub fn is_image_file(path: &Path) -> bool {
    extension_lowercase(path)
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Check if a path has a video file extension.
pub fn is_video_file(path: &Path) -> bool {
    extension_lowercase(path)
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Check if a path has an audio file extension.
pub fn is_audio_file(path: &Path) -> bool {
    extension_lowercase(path)
        .map(|ext| AUDIO_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Path of `path` relative to `base`, using `..` where needed.
///
/// Both paths are expected to be absolute. Returns `None` when they share no
/// common root (for example different drives on Windows).
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use gamedeck_common::paths::relative_to;
///
/// assert_eq!(relative_to(Path::new("/cfg/roms/a.bin"), Path::new("/cfg")).unwrap(), Path::new("roms/a.bin"));
/// assert_eq!(relative_to(Path::new("/games/a.bin"), Path::new("/cfg")).unwrap(), Path::new("../games/a.bin"));
/// ```
pub fn relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    use std::path::Component;

    let mut path_parts = path.components().peekable();
    let mut base_parts = base.components().peekable();

    match (path_parts.peek(), base_parts.peek()) {
        (Some(Component::Prefix(a)), Some(Component::Prefix(b))) if a != b => return None,
        _ => {}
    }

    loop {
        match (path_parts.peek(), base_parts.peek()) {
            (Some(a), Some(b)) if a == b => {}
            _ => break,
        }
        path_parts.next();
        base_parts.next();
    }

    let mut relative = PathBuf::new();
    for part in base_parts {
        if matches!(part, Component::Normal(_)) {
            relative.push("..");
        }
    }
    relative.extend(path_parts);
    Some(relative)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_existing_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("game.bin");
        std::fs::write(&file, b"").unwrap();

        let canonical = canonicalize(dir.path().join(".").join("game.bin")).unwrap();
        assert!(canonical.is_absolute());
        assert_eq!(canonical.file_name().unwrap(), "game.bin");
        assert_eq!(canonical, canonicalize(&file).unwrap());

        assert!(canonicalize(dir.path().join("missing.bin")).is_none());
    }

    #[test]
    fn test_resolve() {
        let base = Path::new("/base");
        assert_eq!(resolve(base, "a/b.ext"), PathBuf::from("/base/a/b.ext"));
        assert_eq!(resolve(base, "/abs/c.ext"), PathBuf::from("/abs/c.ext"));
        assert_eq!(resolve(base, "."), PathBuf::from("/base/."));
    }

    #[test]
    fn test_exists_and_is_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("x.txt");
        std::fs::write(&file, b"x").unwrap();

        assert!(exists(dir.path()));
        assert!(!is_file(dir.path()));
        assert!(is_file(&file));
        assert!(!exists(&dir.path().join("nope")));
    }

    #[test]
    fn test_to_file_uri() {
        assert_eq!(to_file_uri(Path::new("/a/b c.png")), "file:///a/b c.png");
        assert_eq!(
            to_file_uri(Path::new(r"C:\games\x.png")),
            "file:///C:/games/x.png"
        );
    }

    #[test]
    fn test_has_uri_scheme() {
        assert!(has_uri_scheme("http://example.com/a.png"));
        assert!(has_uri_scheme("file:///a.png"));
        assert!(!has_uri_scheme("C:/a.png"));
        assert!(!has_uri_scheme("media/a.png"));
        assert!(!has_uri_scheme("weird name:x"));
    }

    #[test]
    fn test_title_from_path() {
        assert_eq!(title_from_path(Path::new("a.ext")), "a");
        assert_eq!(title_from_path(Path::new("/x/My_Game.Deluxe.ext")), "My Game Deluxe");
        assert_eq!(title_from_path(Path::new("")), "");
    }

    #[test]
    fn test_extension_lowercase() {
        assert_eq!(extension_lowercase(Path::new("a.EXT")), Some("ext".to_string()));
        assert_eq!(extension_lowercase(Path::new("noext")), None);
    }

    #[test]
    fn test_media_detection() {
        assert!(is_image_file(Path::new("box_front.PNG")));
        assert!(is_video_file(Path::new("video.webm")));
        assert!(is_audio_file(Path::new("music.ogg")));
        assert!(!is_image_file(Path::new("video.mp4")));
        assert!(!is_audio_file(Path::new("no_extension")));
    }

    #[test]
    fn test_relative_to() {
        assert_eq!(relative_to(Path::new("/a/b/c.txt"), Path::new("/a")).unwrap(), Path::new("b/c.txt"));
        assert_eq!(relative_to(Path::new("/x/c.txt"), Path::new("/a/b")).unwrap(), Path::new("../../x/c.txt"));
        assert_eq!(relative_to(Path::new("/a"), Path::new("/a")).unwrap(), Path::new(""));
    }
}
