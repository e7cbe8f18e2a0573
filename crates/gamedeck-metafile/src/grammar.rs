//! Attribute grammar of metadata files.
//!
//! Keys are classified into declarations (`collection`, `game`), asset keys
//! (`assets.<type>`), extension keys (`x-...`) and attributes. Attributes are
//! then looked up in the collection or game table depending on which block is
//! open. Value validators return [`ValueError`] with the exact wording used
//! in warnings.

use std::ops::RangeInclusive;
use std::sync::OnceLock;

use gamedeck_common::{ListField, ReleaseDate};
use regex::Regex;

/// Coarse classification of an entry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key<'a> {
    /// `collection:` opens a collection block.
    Collection,
    /// `game:` opens a game block.
    Game,
    /// `assets.<type>` or `asset.<type>`, carrying the type token.
    Asset(&'a str),
    /// `x-...` keys reserved for third-party tools.
    Extension,
    /// Anything else, to be looked up in the attribute tables.
    Attribute(&'a str),
}

/// Classify a lowercase key.
pub fn classify(key: &str) -> Key<'_> {
    match key {
        "collection" => Key::Collection,
        "game" => Key::Game,
        _ if key.starts_with("x-") => Key::Extension,
        _ => match asset_type_token(key) {
            Some(token) => Key::Asset(token),
            None => Key::Attribute(key),
        },
    }
}

/// Attributes accepted inside a collection block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollAttrib {
    ShortName,
    LaunchCmd,
    LaunchWorkdir,
    Directories,
    Extensions,
    Files,
    Regex,
    IgnoreExtensions,
    IgnoreFiles,
    IgnoreRegex,
    ShortDesc,
    LongDesc,
    SortBy,
    MediaDir,
}

impl CollAttrib {
    pub fn from_key(key: &str) -> Option<Self> {
        let attrib = match key {
            "shortname" => Self::ShortName,
            "launch" | "command" => Self::LaunchCmd,
            "workdir" | "cwd" => Self::LaunchWorkdir,
            "directory" | "directories" => Self::Directories,
            "extension" | "extensions" => Self::Extensions,
            "file" | "files" => Self::Files,
            "regex" => Self::Regex,
            "ignore-extension" | "ignore-extensions" => Self::IgnoreExtensions,
            "ignore-file" | "ignore-files" => Self::IgnoreFiles,
            "ignore-regex" => Self::IgnoreRegex,
            "summary" => Self::ShortDesc,
            "description" => Self::LongDesc,
            "sortby" | "sort_by" | "sort-by" => Self::SortBy,
            "media" | "mediadir" | "media-dir" | "media_dir" => Self::MediaDir,
            _ => return None,
        };
        Some(attrib)
    }
}

/// Attributes accepted inside a game block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameAttrib {
    Files,
    LaunchCmd,
    LaunchWorkdir,
    PlayerCount,
    ShortDesc,
    LongDesc,
    Release,
    Rating,
    SortBy,
    MediaDir,
    List(ListField),
}

impl GameAttrib {
    pub fn from_key(key: &str) -> Option<Self> {
        let attrib = match key {
            "file" | "files" => Self::Files,
            "launch" | "command" => Self::LaunchCmd,
            "workdir" | "cwd" => Self::LaunchWorkdir,
            "players" => Self::PlayerCount,
            "summary" => Self::ShortDesc,
            "description" => Self::LongDesc,
            "release" => Self::Release,
            "rating" => Self::Rating,
            "sorttitle" | "sortname" | "sort_title" | "sort_name" | "sort-title" | "sort-name"
            | "sortby" | "sort_by" | "sort-by" => Self::SortBy,
            "media" | "mediadir" | "media-dir" | "media_dir" => Self::MediaDir,
            _ => return list_field_for_key(key).map(Self::List),
        };
        Some(attrib)
    }
}

fn list_field_for_key(key: &str) -> Option<ListField> {
    let singular = key.strip_suffix('s').unwrap_or(key);
    ListField::ALL
        .into_iter()
        .find(|field| field.singular() == key || field.singular() == singular)
}

/// Invalid attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("failed to parse rating value")]
    Rating,

    #[error("incorrect date format, should be YYYY, YYYY-MM or YYYY-MM-DD")]
    Date,

    #[error("incorrect player count format, should be N or N-M")]
    PlayerCount,
}

fn asset_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^assets?\.(.+)$").expect("asset key pattern is valid"))
}

fn count_range_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d+)(-(\d+))?$").expect("count pattern is valid"))
}

fn percent_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d+%$").expect("percent pattern is valid"))
}

fn float_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d(\.\d+)?$").expect("float pattern is valid"))
}

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{4})(-(\d{1,2}))?(-(\d{1,2}))?$").expect("date pattern is valid")
    })
}

/// Asset type token of an `assets.<type>` key.
///
/// # Examples
///
/// ```
/// use gamedeck_metafile::grammar::asset_type_token;
///
/// assert_eq!(asset_type_token("assets.box_front"), Some("box_front"));
/// assert_eq!(asset_type_token("asset.logo"), Some("logo"));
/// assert_eq!(asset_type_token("assets"), None);
/// ```
pub fn asset_type_token(key: &str) -> Option<&str> {
    asset_key_pattern()
        .captures(key)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Parse `N` or `N-M` into an inclusive range.
///
/// A reversed range such as `4-2` is normalized to `2..=4`.
pub fn parse_count_range(value: &str) -> Option<RangeInclusive<u32>> {
    let caps = count_range_pattern().captures(value.trim())?;
    let low: u32 = caps.get(1)?.as_str().parse().ok()?;
    let high: u32 = match caps.get(3) {
        Some(m) => m.as_str().parse().ok()?,
        None => low,
    };
    Some(low.min(high)..=low.max(high))
}

/// Parse a player count; a range stores its upper bound.
pub fn parse_player_count(value: &str) -> Result<u32, ValueError> {
    parse_count_range(value)
        .map(|range| *range.end())
        .ok_or(ValueError::PlayerCount)
}

/// Parse a rating written as `NN%` or as a float in `0..=1`.
///
/// The result is clamped into `0.0..=1.0`.
///
/// # Examples
///
/// ```
/// use gamedeck_metafile::grammar::parse_rating;
///
/// assert_eq!(parse_rating("80%"), Ok(0.8));
/// assert_eq!(parse_rating("0.5"), Ok(0.5));
/// assert!(parse_rating("asd").is_err());
/// ```
pub fn parse_rating(value: &str) -> Result<f32, ValueError> {
    let value = value.trim();
    let rating = if percent_pattern().is_match(value) {
        value
            .trim_end_matches('%')
            .parse::<f32>()
            .map(|percent| percent / 100.0)
            .map_err(|_| ValueError::Rating)?
    } else if float_pattern().is_match(value) {
        value.parse::<f32>().map_err(|_| ValueError::Rating)?
    } else {
        return Err(ValueError::Rating);
    };
    Ok(rating.clamp(0.0, 1.0))
}

/// Parse a `YYYY`, `YYYY-MM` or `YYYY-MM-DD` release date.
pub fn parse_release_date(value: &str) -> Result<ReleaseDate, ValueError> {
    let caps = date_pattern().captures(value.trim()).ok_or(ValueError::Date)?;
    let component = |idx: usize| caps.get(idx).and_then(|m| m.as_str().parse::<u32>().ok());

    let year = caps
        .get(1)
        .and_then(|m| m.as_str().parse::<i32>().ok())
        .ok_or(ValueError::Date)?;
    ReleaseDate::new(year, component(3), component(5)).ok_or(ValueError::Date)
}

/// Split list values on commas, trimming and dropping empty items.
///
/// # Examples
///
/// ```
/// use gamedeck_metafile::grammar::split_list;
///
/// let lines = ["Dev A, Dev B".to_string(), "Dev C".to_string()];
/// assert_eq!(split_list(&lines), ["Dev A", "Dev B", "Dev C"]);
/// ```
pub fn split_list<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    values
        .iter()
        .flat_map(|line| line.as_ref().split(','))
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Translate manual line breaks in text fields.
///
/// `\n` written as two characters becomes a newline, unless the backslash is
/// itself escaped: `\\n` becomes the literal text `\n`.
///
/// # Examples
///
/// ```
/// use gamedeck_metafile::grammar::replace_newlines;
///
/// assert_eq!(replace_newlines(r"one\ntwo"), "one\ntwo");
/// assert_eq!(replace_newlines(r"keep\\nthis"), r"keep\nthis");
/// ```
pub fn replace_newlines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('n') => {
                chars.next();
                out.push('\n');
            }
            Some('\\') => {
                chars.next();
                if chars.peek() == Some(&'n') {
                    chars.next();
                    out.push_str("\\n");
                } else {
                    out.push_str("\\\\");
                }
            }
            _ => out.push('\\'),
        }
    }
    out
}
