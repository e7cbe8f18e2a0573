use std::path::PathBuf;

use gamedeck_common::{Catalog, PathIndex};

use super::flag_list::FlagList;
use super::list_file::ListFileWriter;
use super::{Provider, ProviderFlags};

/// Favorite games, stored in `<config>/favorites.txt`.
#[derive(Debug, Clone)]
pub struct Favorites {
    list: FlagList,
    enabled: bool,
}

impl Favorites {
    pub fn new(config_dir: PathBuf, portable: bool) -> Self {
        Self {
            list: FlagList::new("favorites", config_dir, portable),
            enabled: true,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Writer of the favorites file, for waiting on pending saves.
    pub fn writer(&self) -> &ListFileWriter {
        self.list.writer()
    }
}

impl Provider for Favorites {
    fn name(&self) -> &'static str {
        "favorites"
    }

    fn flags(&self) -> ProviderFlags {
        ProviderFlags::PROVIDES_DYNDATA
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn find_dynamic_data(&self, catalog: &mut Catalog, index: &PathIndex) {
        self.list.mark(catalog, index, |game| game.is_favorite = true);
    }

    fn on_game_favorite_changed(&self, catalog: &Catalog) {
        self.list.save(catalog, |game| game.is_favorite);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamedeck_common::paths::canonicalize;
    use gamedeck_common::{Game, GameData, GameFile, GameId};
    use std::fs;

    fn catalog(paths: &[PathBuf]) -> Catalog {
        Catalog {
            collections: Vec::new(),
            games: paths
                .iter()
                .enumerate()
                .map(|(idx, path)| Game {
                    id: GameId::new(idx),
                    data: GameData::new(format!("Game {idx}")),
                    files: vec![GameFile::new(path.clone())],
                    collections: Vec::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_marks_listed_games() {
        let dir = tempfile::tempdir().unwrap();
        let root = canonicalize(dir.path()).unwrap();
        let a = root.join("a.bin");
        let b = root.join("b.bin");
        fs::write(&a, "").unwrap();
        fs::write(&b, "").unwrap();
        fs::write(
            root.join("favorites.txt"),
            "# List of favorites, one path per line\nb.bin\n/nowhere/c.bin\n",
        )
        .unwrap();

        let mut catalog = catalog(&[a, b]);
        let index = catalog.path_index();
        Favorites::new(root, false).find_dynamic_data(&mut catalog, &index);

        assert!(!catalog.games[0].data.is_favorite);
        assert!(catalog.games[1].data.is_favorite);
    }

    #[tokio::test]
    async fn test_save_writes_absolute_paths() {
        let dir = tempfile::tempdir().unwrap();
        let root = canonicalize(dir.path()).unwrap();
        let a = root.join("games/a.bin");
        fs::create_dir_all(a.parent().unwrap()).unwrap();
        fs::write(&a, "").unwrap();

        let mut catalog = catalog(&[a.clone()]);
        catalog.games[0].data.is_favorite = true;

        let favorites = Favorites::new(root.join("config"), false);
        favorites.on_game_favorite_changed(&catalog);
        favorites.writer().wait_idle().await;

        let written = fs::read_to_string(root.join("config/favorites.txt")).unwrap();
        assert_eq!(
            written,
            format!("# List of favorites, one path per line\n{}\n", a.display())
        );
    }

    #[tokio::test]
    async fn test_portable_save_is_relative() {
        let dir = tempfile::tempdir().unwrap();
        let root = canonicalize(dir.path()).unwrap();
        let a = root.join("games/a.bin");
        fs::create_dir_all(a.parent().unwrap()).unwrap();
        fs::create_dir_all(root.join("config")).unwrap();
        fs::write(&a, "").unwrap();

        let mut catalog = catalog(&[a]);
        catalog.games[0].data.is_favorite = true;

        let favorites = Favorites::new(root.join("config"), true);
        favorites.on_game_favorite_changed(&catalog);
        favorites.writer().wait_idle().await;

        let written = fs::read_to_string(root.join("config/favorites.txt")).unwrap();
        assert_eq!(
            written,
            "# List of favorites, one path per line\n../games/a.bin\n"
        );

        // Reading the relative entry back finds the same game.
        catalog.games[0].data.is_favorite = false;
        let index = catalog.path_index();
        favorites.find_dynamic_data(&mut catalog, &index);
        assert!(catalog.games[0].data.is_favorite);
    }
}
