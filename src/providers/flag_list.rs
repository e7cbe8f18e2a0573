//! Shared storage for per-game boolean flags kept as path lists.

use std::path::PathBuf;

use gamedeck_common::paths::{canonicalize, relative_to, resolve};
use gamedeck_common::{Catalog, GameData, PathIndex};
use tracing::{debug, info, warn};

use super::list_file::{read_list_file, ListFileWriter};

/// A list file mapping canonical game file paths to a flag on the game.
#[derive(Debug, Clone)]
pub(crate) struct FlagList {
    label: &'static str,
    config_dir: PathBuf,
    portable: bool,
    writer: ListFileWriter,
}

impl FlagList {
    pub fn new(label: &'static str, config_dir: PathBuf, portable: bool) -> Self {
        let path = config_dir.join(format!("{label}.txt"));
        Self {
            label,
            config_dir,
            portable,
            writer: ListFileWriter::new(path, label),
        }
    }

    pub fn writer(&self) -> &ListFileWriter {
        &self.writer
    }

    /// Set the flag on every game with a listed file. Returns the number of
    /// games marked.
    pub fn mark(
        &self,
        catalog: &mut Catalog,
        index: &PathIndex,
        set: impl Fn(&mut GameData),
    ) -> usize {
        let path = self.writer.path();
        if !path.exists() {
            return 0;
        }
        let lines = match read_list_file(path) {
            Ok(lines) => lines,
            Err(err) => {
                warn!(
                    "could not open `{}` for reading, {} are not loaded: {}",
                    path.display(),
                    self.label,
                    err
                );
                return 0;
            }
        };

        let mut marked = 0;
        for line in lines {
            let Some(file) = canonicalize(resolve(&self.config_dir, &line)) else {
                debug!(entry = %line, "listed file does not exist");
                continue;
            };
            let Some(game) = index.get(&file).and_then(|id| catalog.game_mut(*id)) else {
                continue;
            };
            set(&mut game.data);
            marked += 1;
        }
        info!("{}: {} games marked", self.label, marked);
        marked
    }

    /// File content for the current state of the catalog.
    pub fn lines(&self, catalog: &Catalog, is_set: impl Fn(&GameData) -> bool) -> Vec<String> {
        let mut lines = vec![format!("# List of {}, one path per line", self.label)];
        let flagged = catalog.games.iter().filter(|game| is_set(&game.data));
        for game in flagged {
            for file in &game.files {
                let full = canonicalize(&file.path).unwrap_or_else(|| file.path.clone());
                let written = if self.portable {
                    relative_to(&full, &self.config_dir).unwrap_or(full)
                } else {
                    full
                };
                let written = written.to_string_lossy().into_owned();
                if !written.is_empty() {
                    lines.push(written);
                }
            }
        }
        lines
    }

    /// Rewrite the list file in the background.
    pub fn save(&self, catalog: &Catalog, is_set: impl Fn(&GameData) -> bool) {
        self.writer.queue(self.lines(catalog, is_set));
    }
}
