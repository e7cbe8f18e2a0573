//! Core type definitions for assets, multi-valued game fields and dates.
//!
//! All enums serialize in snake_case so they can be written to JSON catalog
//! dumps and read back by other tooling.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::paths::{AUDIO_EXTENSIONS, IMAGE_EXTENSIONS, VIDEO_EXTENSIONS};

/// Type of a media asset attached to a game or collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    BoxFront,
    BoxBack,
    BoxSpine,
    BoxFull,
    Cartridge,
    Logo,
    Poster,
    Background,
    Music,
    Screenshots,
    Videos,
    Titlescreen,
    Marquee,
    Bezel,
    Tile,
    Banner,
    Steamgrid,
}

impl AssetType {
    /// Every asset type, in declaration order.
    pub const ALL: [AssetType; 17] = [
        Self::BoxFront,
        Self::BoxBack,
        Self::BoxSpine,
        Self::BoxFull,
        Self::Cartridge,
        Self::Logo,
        Self::Poster,
        Self::Background,
        Self::Music,
        Self::Screenshots,
        Self::Videos,
        Self::Titlescreen,
        Self::Marquee,
        Self::Bezel,
        Self::Tile,
        Self::Banner,
        Self::Steamgrid,
    ];

    /// Whether the type holds an ordered list of URIs instead of a single one.
    #[must_use]
    pub const fn is_multi(self) -> bool {
        matches!(self, Self::Screenshots | Self::Videos | Self::Titlescreen)
    }

    /// Normalized names this type is recognized by.
    ///
    /// Names are compared after lowercasing and removing `_`, `-` and spaces,
    /// so `box_front`, `boxFront` and `box-front` are all the same key.
    #[must_use]
    pub const fn names(self) -> &'static [&'static str] {
        match self {
            Self::BoxFront => &["boxfront", "boxart2d", "boxart"],
            Self::BoxBack => &["boxback"],
            Self::BoxSpine => &["boxspine", "boxside"],
            Self::BoxFull => &["boxfull", "box"],
            Self::Cartridge => &["cartridge", "cart", "disc"],
            Self::Logo => &["logo", "wheel"],
            Self::Poster => &["poster", "flyer"],
            Self::Background => &["background", "fanart"],
            Self::Music => &["music"],
            Self::Screenshots => &["screenshot", "screenshots"],
            Self::Videos => &["video", "videos"],
            Self::Titlescreen => &["titlescreen", "titlescreens"],
            Self::Marquee => &["marquee"],
            Self::Bezel => &["bezel", "screenmarquee"],
            Self::Tile => &["tile"],
            Self::Banner => &["banner"],
            Self::Steamgrid => &["steamgrid", "steam"],
        }
    }

    /// File extensions (lowercase, without dot) accepted for this type
    /// during directory-based asset discovery.
    #[must_use]
    pub const fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Videos => VIDEO_EXTENSIONS,
            Self::Music => AUDIO_EXTENSIONS,
            _ => IMAGE_EXTENSIONS,
        }
    }

    /// Look up an asset type by one of its names.
    ///
    /// # Examples
    ///
    /// ```
    /// use gamedeck_common::AssetType;
    ///
    /// assert_eq!(AssetType::from_name("box_front"), Some(AssetType::BoxFront));
    /// assert_eq!(AssetType::from_name("boxFront"), Some(AssetType::BoxFront));
    /// assert_eq!(AssetType::from_name("nope"), None);
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        Self::ALL
            .into_iter()
            .find(|ty| ty.names().contains(&normalized.as_str()))
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BoxFront => "box_front",
            Self::BoxBack => "box_back",
            Self::BoxSpine => "box_spine",
            Self::BoxFull => "box_full",
            Self::Cartridge => "cartridge",
            Self::Logo => "logo",
            Self::Poster => "poster",
            Self::Background => "background",
            Self::Music => "music",
            Self::Screenshots => "screenshots",
            Self::Videos => "videos",
            Self::Titlescreen => "titlescreen",
            Self::Marquee => "marquee",
            Self::Bezel => "bezel",
            Self::Tile => "tile",
            Self::Banner => "banner",
            Self::Steamgrid => "steamgrid",
        };
        f.write_str(name)
    }
}

/// Multi-valued string fields of a game.
///
/// All of these behave the same way: an ordered list of strings where
/// duplicates are allowed and repeated declarations append.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListField {
    Developers,
    Publishers,
    Genres,
    Websites,
    Sources,
    Versions,
    Items,
    Tiers,
    Twitters,
    Facebooks,
    Instagrams,
    Snapchats,
    Pinterests,
    Youtubes,
    Tiktoks,
    Discords,
    Twitchs,
    DeveloperTitles,
    VersionTitles,
    ExternalVideos,
    Startups,
    Signatures,
    Vanitys,
    Thankyous,
    Whos,
    Artists,
    Welcomes,
    Tags,
}

impl ListField {
    pub const ALL: [ListField; 28] = [
        Self::Developers,
        Self::Publishers,
        Self::Genres,
        Self::Websites,
        Self::Sources,
        Self::Versions,
        Self::Items,
        Self::Tiers,
        Self::Twitters,
        Self::Facebooks,
        Self::Instagrams,
        Self::Snapchats,
        Self::Pinterests,
        Self::Youtubes,
        Self::Tiktoks,
        Self::Discords,
        Self::Twitchs,
        Self::DeveloperTitles,
        Self::VersionTitles,
        Self::ExternalVideos,
        Self::Startups,
        Self::Signatures,
        Self::Vanitys,
        Self::Thankyous,
        Self::Whos,
        Self::Artists,
        Self::Welcomes,
        Self::Tags,
    ];

    /// Singular key of the field as written in metadata files.
    ///
    /// The plural form is the singular with an `s` appended.
    #[must_use]
    pub const fn singular(self) -> &'static str {
        match self {
            Self::Developers => "developer",
            Self::Publishers => "publisher",
            Self::Genres => "genre",
            Self::Websites => "website",
            Self::Sources => "source",
            Self::Versions => "version",
            Self::Items => "item",
            Self::Tiers => "tier",
            Self::Twitters => "twitter",
            Self::Facebooks => "facebook",
            Self::Instagrams => "instagram",
            Self::Snapchats => "snapchat",
            Self::Pinterests => "pinterest",
            Self::Youtubes => "youtube",
            Self::Tiktoks => "tiktok",
            Self::Discords => "discord",
            Self::Twitchs => "twitch",
            Self::DeveloperTitles => "developertitle",
            Self::VersionTitles => "versiontitle",
            Self::ExternalVideos => "externalvideo",
            Self::Startups => "startup",
            Self::Signatures => "signature",
            Self::Vanitys => "vanity",
            Self::Thankyous => "thankyou",
            Self::Whos => "who",
            Self::Artists => "artist",
            Self::Welcomes => "welcome",
            Self::Tags => "tag",
        }
    }
}

impl fmt::Display for ListField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.singular())
    }
}

/// Release date with optional month and day precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReleaseDate {
    pub year: i32,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl ReleaseDate {
    /// Build a date, rejecting impossible calendar values.
    ///
    /// A day without a month is not representable.
    #[must_use]
    pub fn new(year: i32, month: Option<u32>, day: Option<u32>) -> Option<Self> {
        if day.is_some() && month.is_none() {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month.unwrap_or(1), day.unwrap_or(1))?;
        Some(Self { year, month, day })
    }

    /// The date with missing components filled with `1`.
    #[must_use]
    pub fn to_naive_date(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month.unwrap_or(1), self.day.unwrap_or(1))
    }
}

impl fmt::Display for ReleaseDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.year)?;
        if let Some(month) = self.month {
            write!(f, "-{month:02}")?;
        }
        if let Some(day) = self.day {
            write!(f, "-{day:02}")?;
        }
        Ok(())
    }
}
