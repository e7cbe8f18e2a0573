//! Metadata file provider.
//!
//! Reads `metadata.gamedeck.txt` / `metadata.txt` files from the configured
//! game directories (and optionally the global metafile directory), turns
//! them into collections and games, expands collection file filters and,
//! in the second search phase, attaches assets found in media directories.
//!
//! # Module layout
//!
//! - [`parser`] -- per-file parsing into the search context.
//! - [`filter`] -- collection file filters and their expansion.
//! - [`assets`] -- directory-based asset discovery.

pub mod assets;
pub mod filter;
pub mod parser;

pub use assets::discover_assets;
pub use filter::{FileFilter, FilterMatch};
pub use parser::parse_metafile;

use std::path::PathBuf;
use std::time::Instant;

use gamedeck_common::paths::canonicalize;
use gamedeck_metafile::discovery::{
    find_in_dir, find_in_global_dir, no_metafile_message, GLOBAL_METAFILE_DIR,
};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::config::Config;
use crate::providers::{GameDirsFile, Provider, ProviderFlags};
use crate::search::{Diagnostic, SearchContext};

/// Provider reading metadata files from game directories.
#[derive(Debug)]
pub struct MetadataProvider {
    game_dirs: Vec<PathBuf>,
    game_dirs_file: Option<GameDirsFile>,
    global_dir: Option<PathBuf>,
    recursive: bool,
    enabled: bool,
    /// Directories resolved by the last `load`.
    loaded_dirs: Mutex<Option<Vec<PathBuf>>>,
}

impl MetadataProvider {
    /// A provider searching exactly the given directories.
    pub fn new(game_dirs: Vec<PathBuf>) -> Self {
        Self {
            game_dirs,
            game_dirs_file: None,
            global_dir: None,
            recursive: false,
            enabled: true,
            loaded_dirs: Mutex::new(None),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let config_dir = config.config_dir();
        let global_dir = config
            .scan
            .global_metafiles
            .then(|| config_dir.join(GLOBAL_METAFILE_DIR));

        Self {
            game_dirs_file: Some(GameDirsFile::new(config_dir)),
            global_dir,
            recursive: config.scan.recursive_directories,
            enabled: config.providers.metadata,
            ..Self::new(config.scan.game_dirs.clone())
        }
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Also read global metadata files from `dir`.
    pub fn with_global_dir(mut self, dir: PathBuf) -> Self {
        self.global_dir = Some(dir);
        self
    }

    /// Also read directories listed in the config dir's `game_dirs.txt`.
    pub fn with_game_dirs_file(mut self, file: GameDirsFile) -> Self {
        self.game_dirs_file = Some(file);
        self
    }

    /// Configured directories followed by the `game_dirs.txt` entries,
    /// without duplicates.
    pub fn collect_dirs(&self) -> Vec<PathBuf> {
        let listed = self
            .game_dirs_file
            .as_ref()
            .map(GameDirsFile::read)
            .unwrap_or_default();

        let mut dirs: Vec<PathBuf> = Vec::new();
        for dir in self.game_dirs.iter().cloned().chain(listed) {
            if !dirs.contains(&dir) {
                dirs.push(dir);
            }
        }
        dirs
    }

    fn search_dirs(&self) -> Vec<PathBuf> {
        self.loaded_dirs
            .lock()
            .clone()
            .unwrap_or_else(|| self.collect_dirs())
    }
}

impl Provider for MetadataProvider {
    fn name(&self) -> &'static str {
        "metafiles"
    }

    fn flags(&self) -> ProviderFlags {
        ProviderFlags::PROVIDES_GAMES | ProviderFlags::PROVIDES_ASSETS
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn load(&self) {
        let dirs = self.collect_dirs();
        debug!(count = dirs.len(), "game directories loaded");
        *self.loaded_dirs.lock() = Some(dirs);
    }

    fn find_lists(&self, ctx: &mut SearchContext) {
        let start = Instant::now();
        let mut filters: Vec<FileFilter> = Vec::new();
        let mut metafiles = 0;

        for dir in self.search_dirs() {
            let found = find_in_dir(&dir);
            if found.is_empty() {
                ctx.warn(Diagnostic::new(no_metafile_message(&dir)));
                continue;
            }
            if let Some(root) = canonicalize(&dir) {
                ctx.add_root_dir(root);
            }
            for metafile in found {
                parse_metafile(ctx, &metafile, &mut filters);
                metafiles += 1;
            }
        }

        if let Some(global_dir) = &self.global_dir {
            for metafile in find_in_global_dir(global_dir) {
                parse_metafile(ctx, &metafile, &mut filters);
                metafiles += 1;
            }
        }

        for filter in &filters {
            for dir in filter.scan_dirs() {
                ctx.add_root_dir(dir);
            }
            for matched in filter.expand(self.recursive) {
                ctx.add_root_dir(matched.root.clone());
                let id = ctx.game_for_path(matched.path);
                if let Some(game) = ctx.game_mut(id) {
                    if game.root_dir.is_none() {
                        game.root_dir = Some(matched.root);
                    }
                }
                if let Err(err) = ctx.add_to_collection(&filter.collection, id) {
                    debug!(%err, "could not add filter match to collection");
                }
            }
        }

        info!(
            metafiles,
            games = ctx.game_count(),
            "Metadata files processed in {}ms",
            start.elapsed().as_millis()
        );
    }

    fn find_static_data(&self, ctx: &mut SearchContext) {
        discover_assets(ctx);
    }
}
