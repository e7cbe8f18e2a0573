//! Catalog model shared by the parser, the providers and the consumers.
//!
//! [`GameData`] and [`LaunchParams`] are the mutable attribute sets filled in
//! while metadata is being aggregated. [`Game`], [`GameFile`], [`Collection`]
//! and [`Catalog`] are the finalized records handed to the caller once an
//! aggregation run is complete.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use crate::assets::Assets;
use crate::ids::GameId;
use crate::types::{ListField, ReleaseDate};

/// Canonical file path to owning game, built once per dynamic search.
pub type PathIndex = HashMap<PathBuf, GameId>;

/// How a game or the games of a collection are started.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchParams {
    /// Command line template, empty when unset.
    #[serde(default)]
    pub launch_cmd: String,
    /// Working directory, empty when unset.
    #[serde(default)]
    pub launch_workdir: String,
    /// Directory relative paths in the command are resolved against.
    #[serde(default)]
    pub relative_basedir: PathBuf,
}

impl LaunchParams {
    pub fn has_command(&self) -> bool {
        !self.launch_cmd.is_empty()
    }

    /// Fill every unset field from `fallback`.
    pub fn inherit_from(&mut self, fallback: &LaunchParams) {
        if self.launch_cmd.is_empty() {
            self.launch_cmd.clone_from(&fallback.launch_cmd);
        }
        if self.launch_workdir.is_empty() {
            self.launch_workdir.clone_from(&fallback.launch_workdir);
        }
        if self.relative_basedir.as_os_str().is_empty() {
            self.relative_basedir.clone_from(&fallback.relative_basedir);
        }
    }

    /// Overwrite fields that are set in `other`.
    pub fn merge_from(&mut self, other: LaunchParams) {
        if !other.launch_cmd.is_empty() {
            self.launch_cmd = other.launch_cmd;
        }
        if !other.launch_workdir.is_empty() {
            self.launch_workdir = other.launch_workdir;
        }
        if !other.relative_basedir.as_os_str().is_empty() {
            self.relative_basedir = other.relative_basedir;
        }
    }
}

/// Attributes of a game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameData {
    pub title: String,
    #[serde(default)]
    pub sort_by: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub lists: BTreeMap<ListField, Vec<String>>,
    #[serde(default)]
    pub player_count: Option<u32>,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub release: Option<ReleaseDate>,
    #[serde(default)]
    pub launch: LaunchParams,
    #[serde(default)]
    pub assets: Assets,
    /// Per-game override of the media root used by asset discovery.
    #[serde(default)]
    pub media_dir: Option<PathBuf>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub is_whitelist: bool,
}

impl GameData {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Number of players, `1` when never declared.
    pub fn player_count(&self) -> u32 {
        self.player_count.unwrap_or(1)
    }

    /// Rating in `0.0..=1.0`, `0.0` when never declared.
    pub fn rating(&self) -> f32 {
        self.rating.unwrap_or(0.0)
    }

    /// Values of a multi-valued field in encounter order.
    pub fn list(&self, field: ListField) -> &[String] {
        self.lists.get(&field).map(Vec::as_slice).unwrap_or_default()
    }

    /// Append values to a multi-valued field.
    pub fn extend_list<I>(&mut self, field: ListField, values: I)
    where
        I: IntoIterator<Item = String>,
    {
        let list = self.lists.entry(field).or_default();
        list.extend(values);
        if list.is_empty() {
            self.lists.remove(&field);
        }
    }

    /// Fold a later declaration of the same game into this one.
    ///
    /// Lists extend, set scalars overwrite, assets follow [`Assets::add`].
    pub fn merge_from(&mut self, other: GameData) {
        if !other.title.is_empty() {
            self.title = other.title;
        }
        if !other.sort_by.is_empty() {
            self.sort_by = other.sort_by;
        }
        if !other.summary.is_empty() {
            self.summary = other.summary;
        }
        if !other.description.is_empty() {
            self.description = other.description;
        }
        for (field, values) in other.lists {
            self.extend_list(field, values);
        }
        if other.player_count.is_some() {
            self.player_count = other.player_count;
        }
        if other.rating.is_some() {
            self.rating = other.rating;
        }
        if other.release.is_some() {
            self.release = other.release;
        }
        if other.media_dir.is_some() {
            self.media_dir = other.media_dir;
        }
        self.launch.merge_from(other.launch);
        self.assets.merge_from(other.assets);
        self.is_favorite |= other.is_favorite;
        self.is_whitelist |= other.is_whitelist;
    }
}

/// One launchable file of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameFile {
    /// Canonical path.
    pub path: PathBuf,
    /// File name without its extension.
    pub name: String,
}

impl GameFile {
    pub fn new(path: PathBuf) -> Self {
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, name }
    }
}

/// A finalized game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    #[serde(flatten)]
    pub data: GameData,
    pub files: Vec<GameFile>,
    /// Names of the collections this game belongs to.
    pub collections: Vec<String>,
}

/// A finalized collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
    pub short_name: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sort_by: String,
    #[serde(default)]
    pub launch: LaunchParams,
    #[serde(default)]
    pub media_dir: Option<PathBuf>,
    #[serde(default)]
    pub assets: Assets,
    /// Member games, sorted by id and free of duplicates.
    pub games: Vec<GameId>,
}

/// Output of one aggregation run.
///
/// An empty catalog is a valid result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub collections: Vec<Collection>,
    /// Games sorted by id.
    pub games: Vec<Game>,
}

impl Catalog {
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty() && self.games.is_empty()
    }

    pub fn game(&self, id: GameId) -> Option<&Game> {
        self.games
            .binary_search_by_key(&id, |game| game.id)
            .ok()
            .map(|idx| &self.games[idx])
    }

    pub fn game_mut(&mut self, id: GameId) -> Option<&mut Game> {
        self.games
            .binary_search_by_key(&id, |game| game.id)
            .ok()
            .map(move |idx| &mut self.games[idx])
    }

    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.collections.iter().find(|coll| coll.name == name)
    }

    /// First game with the given title.
    pub fn game_by_title(&self, title: &str) -> Option<&Game> {
        self.games.iter().find(|game| game.data.title == title)
    }

    /// Games of a collection, in id order.
    pub fn games_of<'a>(&'a self, collection: &'a Collection) -> impl Iterator<Item = &'a Game> + 'a {
        collection.games.iter().filter_map(|id| self.game(*id))
    }

    /// Build the canonical path index of every game file.
    pub fn path_index(&self) -> PathIndex {
        self.games
            .iter()
            .flat_map(|game| game.files.iter().map(move |file| (file.path.clone(), game.id)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AssetType;

    fn sample_game(id: usize, title: &str, path: &str) -> Game {
        Game {
            id: GameId::new(id),
            data: GameData::new(title),
            files: vec![GameFile::new(PathBuf::from(path))],
            collections: vec!["Coll".into()],
        }
    }

    #[test]
    fn test_game_data_defaults() {
        let data = GameData::new("Foo");
        assert_eq!(data.player_count(), 1);
        assert_eq!(data.rating(), 0.0);
        assert!(data.list(ListField::Developers).is_empty());
        assert!(data.release.is_none());
    }

    #[test]
    fn test_game_data_merge() {
        let mut first = GameData::new("First");
        first.extend_list(ListField::Developers, ["Dev A".to_string()]);
        first.rating = Some(0.5);
        first.summary = "kept".into();

        let mut second = GameData::new("Second");
        second.extend_list(ListField::Developers, ["Dev B".to_string()]);
        second.player_count = Some(4);
        second.assets.add(AssetType::Logo, "file:///logo.png");

        first.merge_from(second);
        assert_eq!(first.title, "Second");
        assert_eq!(first.summary, "kept");
        assert_eq!(first.list(ListField::Developers), ["Dev A", "Dev B"]);
        assert_eq!(first.rating(), 0.5);
        assert_eq!(first.player_count(), 4);
        assert!(first.assets.has(AssetType::Logo));
    }

    #[test]
    fn test_launch_inherit() {
        let mut own = LaunchParams {
            launch_workdir: "own".into(),
            ..LaunchParams::default()
        };
        let parent = LaunchParams {
            launch_cmd: "emu {file.path}".into(),
            launch_workdir: "parent".into(),
            relative_basedir: PathBuf::from("/games"),
        };
        own.inherit_from(&parent);
        assert_eq!(own.launch_cmd, "emu {file.path}");
        assert_eq!(own.launch_workdir, "own");
        assert_eq!(own.relative_basedir, PathBuf::from("/games"));
    }

    #[test]
    fn test_game_file_name() {
        let file = GameFile::new(PathBuf::from("/roms/Some Game.sfc"));
        assert_eq!(file.name, "Some Game");
    }

    #[test]
    fn test_catalog_lookup_and_index() {
        let catalog = Catalog {
            collections: vec![Collection {
                name: "Coll".into(),
                short_name: "coll".into(),
                games: vec![GameId::new(0), GameId::new(2)],
                ..Collection::default()
            }],
            games: vec![sample_game(0, "A", "/a.ext"), sample_game(2, "B", "/b.ext")],
        };

        assert_eq!(catalog.game(GameId::new(2)).unwrap().data.title, "B");
        assert!(catalog.game(GameId::new(1)).is_none());
        assert_eq!(catalog.game_by_title("A").unwrap().id, GameId::new(0));

        let coll = catalog.collection("Coll").unwrap();
        assert_eq!(catalog.games_of(coll).count(), 2);

        let index = catalog.path_index();
        assert_eq!(index.len(), 2);
        assert_eq!(index[&PathBuf::from("/b.ext")], GameId::new(2));
    }

    #[test]
    fn test_empty_catalog_serializes() {
        let catalog = Catalog::default();
        assert!(catalog.is_empty());
        let json = serde_json::to_string(&catalog).unwrap();
        assert_eq!(json, r#"{"collections":[],"games":[]}"#);
    }
}
