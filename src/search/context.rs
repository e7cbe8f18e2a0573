use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Instant;

use gamedeck_common::paths::title_from_path;
use gamedeck_common::{
    Assets, Catalog, Collection, Game, GameData, GameFile, GameId, LaunchParams,
};
use tracing::{debug, info, warn};

use super::Diagnostic;

/// Errors returned by [`SearchContext`] mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    /// The path is already owned by another game.
    #[error("file `{}` already belongs to game {owner}", path.display())]
    DuplicatePath { path: PathBuf, owner: GameId },

    /// No game with this id exists.
    #[error("unknown game {0}")]
    UnknownGame(GameId),
}

/// A game being assembled during list discovery.
#[derive(Debug, Clone, Default)]
pub struct PendingGame {
    pub data: GameData,
    /// Canonical file paths, in the order they were added.
    pub files: Vec<PathBuf>,
    /// Names of the collections the game belongs to, first one first.
    pub collections: Vec<String>,
    /// Directory the game was declared in or discovered from.
    pub root_dir: Option<PathBuf>,
}

/// A collection being assembled during list discovery.
#[derive(Debug, Clone, Default)]
pub struct PendingCollection {
    pub name: String,
    pub short_name: String,
    pub summary: String,
    pub description: String,
    pub sort_by: String,
    pub launch: LaunchParams,
    pub media_dir: Option<PathBuf>,
    pub assets: Assets,
}

impl PendingCollection {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            short_name: name.to_lowercase(),
            ..Self::default()
        }
    }
}

/// Shared catalog every provider writes into during one aggregation run.
///
/// Invariants:
/// - `path_to_gameid` maps each canonical path to exactly one game, and every
///   path listed in a game's `files` is in the map pointing back to it.
/// - after [`SearchContext::finalize`], `collection_childs` only holds ids of
///   existing games, sorted and free of duplicates, and no collection is
///   empty.
///
/// The context is owned by a single worker at a time; providers of a phase
/// run one after another, so no locking happens here.
#[derive(Debug)]
pub struct SearchContext {
    games: BTreeMap<GameId, PendingGame>,
    collections: BTreeMap<String, PendingCollection>,
    path_to_gameid: HashMap<PathBuf, GameId>,
    collection_childs: HashMap<String, Vec<GameId>>,
    game_root_dirs: Vec<PathBuf>,
    diagnostics: Vec<Diagnostic>,
    next_id: GameId,
    finalized: bool,
    started: Instant,
}

impl Default for SearchContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchContext {
    pub fn new() -> Self {
        Self {
            games: BTreeMap::new(),
            collections: BTreeMap::new(),
            path_to_gameid: HashMap::new(),
            collection_childs: HashMap::new(),
            game_root_dirs: Vec::new(),
            diagnostics: Vec::new(),
            next_id: GameId::new(0),
            finalized: false,
            started: Instant::now(),
        }
    }

    // ------------------------------------------------------------------
    // Collections
    // ------------------------------------------------------------------

    /// Get or create the collection with the given display name.
    pub fn add_collection(&mut self, name: &str) -> &mut PendingCollection {
        self.collections
            .entry(name.to_string())
            .or_insert_with(|| PendingCollection::new(name))
    }

    pub fn collection(&self, name: &str) -> Option<&PendingCollection> {
        self.collections.get(name)
    }

    pub fn collection_mut(&mut self, name: &str) -> Option<&mut PendingCollection> {
        self.collections.get_mut(name)
    }

    pub fn collections(&self) -> impl Iterator<Item = &PendingCollection> {
        self.collections.values()
    }

    pub fn collections_mut(&mut self) -> impl Iterator<Item = &mut PendingCollection> {
        self.collections.values_mut()
    }

    /// Member ids of a collection, in insertion order until finalized.
    pub fn collection_childs(&self, name: &str) -> &[GameId] {
        self.collection_childs
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Add a game to a collection, creating the collection if needed.
    ///
    /// Adding the same game twice has no effect.
    pub fn add_to_collection(&mut self, name: &str, game: GameId) -> Result<(), ContextError> {
        let pending = self
            .games
            .get_mut(&game)
            .ok_or(ContextError::UnknownGame(game))?;
        if !pending.collections.iter().any(|c| c == name) {
            pending.collections.push(name.to_string());
        }

        self.add_collection(name);
        let childs = self.collection_childs.entry(name.to_string()).or_default();
        if !childs.contains(&game) {
            childs.push(game);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Games
    // ------------------------------------------------------------------

    /// Create a game without files and return its id.
    pub fn create_game(&mut self, data: GameData) -> GameId {
        let id = self.next_id;
        self.next_id = id.next();
        self.games.insert(
            id,
            PendingGame {
                data,
                ..PendingGame::default()
            },
        );
        debug!(game = %id, "created game");
        id
    }

    pub fn game(&self, id: GameId) -> Option<&PendingGame> {
        self.games.get(&id)
    }

    pub fn game_mut(&mut self, id: GameId) -> Option<&mut PendingGame> {
        self.games.get_mut(&id)
    }

    pub fn games(&self) -> impl Iterator<Item = (GameId, &PendingGame)> {
        self.games.iter().map(|(id, game)| (*id, game))
    }

    pub fn games_mut(&mut self) -> impl Iterator<Item = (GameId, &mut PendingGame)> {
        self.games.iter_mut().map(|(id, game)| (*id, game))
    }

    pub fn game_count(&self) -> usize {
        self.games.len()
    }

    /// Id of the game owning a canonical path.
    pub fn game_id_for_path(&self, path: &Path) -> Option<GameId> {
        self.path_to_gameid.get(path).copied()
    }

    /// Bind a canonical path to a game.
    ///
    /// Binding a path to the game that already owns it is a no-op.
    pub fn add_file(&mut self, game: GameId, path: PathBuf) -> Result<(), ContextError> {
        if let Some(&owner) = self.path_to_gameid.get(&path) {
            if owner == game {
                return Ok(());
            }
            return Err(ContextError::DuplicatePath { path, owner });
        }

        let pending = self
            .games
            .get_mut(&game)
            .ok_or(ContextError::UnknownGame(game))?;
        pending.files.push(path.clone());
        self.path_to_gameid.insert(path, game);
        Ok(())
    }

    /// Game owning a canonical path, creating a single-file game if needed.
    ///
    /// New games are titled after the file name.
    pub fn game_for_path(&mut self, path: PathBuf) -> GameId {
        if let Some(id) = self.game_id_for_path(&path) {
            return id;
        }

        let id = self.create_game(GameData::new(title_from_path(&path)));
        self.path_to_gameid.insert(path.clone(), id);
        if let Some(game) = self.games.get_mut(&id) {
            game.files.push(path);
        }
        id
    }

    /// Number of canonical paths bound to games.
    pub fn path_count(&self) -> usize {
        self.path_to_gameid.len()
    }

    // ------------------------------------------------------------------
    // Root directories and diagnostics
    // ------------------------------------------------------------------

    /// Remember a directory games were discovered in.
    pub fn add_root_dir(&mut self, dir: PathBuf) {
        if !self.game_root_dirs.contains(&dir) {
            self.game_root_dirs.push(dir);
        }
    }

    pub fn game_root_dirs(&self) -> &[PathBuf] {
        &self.game_root_dirs
    }

    /// Record and log a warning.
    pub fn warn(&mut self, diagnostic: Diagnostic) {
        warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    /// Record and log a warning tied to a metadata file line.
    pub fn warn_at(&mut self, file: &Path, line: usize, message: impl Into<String>) {
        self.warn(Diagnostic::at(file, line, message));
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    // ------------------------------------------------------------------
    // Finalization
    // ------------------------------------------------------------------

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Cross-reference and clean up after all list providers ran.
    ///
    /// Games inherit launch settings from their first collection, games
    /// without files or launch command are dropped, member lists are sorted
    /// and deduplicated, and empty collections are removed.
    ///
    /// # Panics
    ///
    /// Panics when called more than once.
    pub fn finalize(&mut self) {
        assert!(!self.finalized, "SearchContext::finalize called twice");
        self.finalized = true;
        let start = Instant::now();

        for game in self.games.values_mut() {
            let parent = game
                .collections
                .first()
                .and_then(|name| self.collections.get(name));
            if let Some(parent) = parent {
                game.data.launch.inherit_from(&parent.launch);
            }
        }

        let unplayable: Vec<GameId> = self
            .games
            .iter()
            .filter(|(_, game)| game.files.is_empty() && !game.data.launch.has_command())
            .map(|(id, _)| *id)
            .collect();
        for id in &unplayable {
            if let Some(game) = self.games.remove(id) {
                debug!(game = %id, title = %game.data.title, "dropping game without files");
            }
        }

        let games = &self.games;
        for childs in self.collection_childs.values_mut() {
            childs.retain(|id| games.contains_key(id));
            childs.sort_unstable();
            childs.dedup();
        }
        self.collection_childs.retain(|_, childs| !childs.is_empty());

        let childs = &self.collection_childs;
        let before = self.collections.len();
        self.collections.retain(|name, _| childs.contains_key(name));
        let pruned = before - self.collections.len();

        let collections = &self.collections;
        for game in self.games.values_mut() {
            game.collections.retain(|name| collections.contains_key(name));
        }

        info!(
            games = self.games.len(),
            collections = self.collections.len(),
            pruned_collections = pruned,
            dropped_games = unplayable.len(),
            "Game list finalized in {}ms ({}ms since start)",
            start.elapsed().as_millis(),
            self.started.elapsed().as_millis()
        );
    }

    /// Move everything into the finalized catalog.
    ///
    /// # Panics
    ///
    /// Panics when [`SearchContext::finalize`] has not been called.
    pub fn consume(mut self) -> Catalog {
        assert!(self.finalized, "SearchContext::consume called before finalize");

        let collections = std::mem::take(&mut self.collections)
            .into_values()
            .map(|coll| Collection {
                games: self.collection_childs.remove(&coll.name).unwrap_or_default(),
                name: coll.name,
                short_name: coll.short_name,
                summary: coll.summary,
                description: coll.description,
                sort_by: coll.sort_by,
                launch: coll.launch,
                media_dir: coll.media_dir,
                assets: coll.assets,
            })
            .collect();

        let games = std::mem::take(&mut self.games)
            .into_iter()
            .map(|(id, game)| Game {
                id,
                data: game.data,
                files: game.files.into_iter().map(GameFile::new).collect(),
                collections: game.collections,
            })
            .collect();

        Catalog { collections, games }
    }
}
