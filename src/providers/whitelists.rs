use std::path::PathBuf;

use gamedeck_common::{Catalog, PathIndex};

use super::flag_list::FlagList;
use super::list_file::ListFileWriter;
use super::{Provider, ProviderFlags};

/// Whitelisted games, stored in `<config>/whitelists.txt`.
#[derive(Debug, Clone)]
pub struct Whitelists {
    list: FlagList,
    enabled: bool,
}

impl Whitelists {
    pub fn new(config_dir: PathBuf, portable: bool) -> Self {
        Self {
            list: FlagList::new("whitelists", config_dir, portable),
            enabled: true,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn writer(&self) -> &ListFileWriter {
        self.list.writer()
    }
}

impl Provider for Whitelists {
    fn name(&self) -> &'static str {
        "whitelists"
    }

    fn flags(&self) -> ProviderFlags {
        ProviderFlags::PROVIDES_DYNDATA
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn find_dynamic_data(&self, catalog: &mut Catalog, index: &PathIndex) {
        self.list.mark(catalog, index, |game| game.is_whitelist = true);
    }

    fn on_game_whitelist_changed(&self, catalog: &Catalog) {
        self.list.save(catalog, |game| game.is_whitelist);
    }
}
