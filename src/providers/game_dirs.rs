use std::path::{Path, PathBuf};

use gamedeck_common::paths::resolve;
use tracing::{debug, warn};

use super::list_file::read_list_file;

/// Name of the game directory list inside the config dir.
pub const GAME_DIRS_FILE: &str = "game_dirs.txt";

/// The user's list of game directories, `<config>/game_dirs.txt`.
///
/// One directory per line; relative entries are resolved against the config
/// dir. A missing file is an empty list.
#[derive(Debug, Clone)]
pub struct GameDirsFile {
    config_dir: PathBuf,
}

impl GameDirsFile {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.config_dir.join(GAME_DIRS_FILE)
    }

    pub fn read(&self) -> Vec<PathBuf> {
        let path = self.path();
        if !path.exists() {
            debug!(file = %path.display(), "no game directory list");
            return Vec::new();
        }

        match read_list_file(&path) {
            Ok(lines) => lines
                .iter()
                .map(|line| resolve(&self.config_dir, line))
                .collect(),
            Err(err) => {
                warn!("could not read `{}`: {}", path.display(), err);
                Vec::new()
            }
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }
}
