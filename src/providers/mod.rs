//! Data providers and the two-phase search orchestration.
//!
//! A [`Provider`] contributes to a search in up to three steps: game lists
//! (phase 1, into the [`SearchContext`]), static data such as assets
//! (phase 2, same context) and dynamic data (on the finalized [`Catalog`]).
//! Providers are passed to the [`ProviderManager`] as an explicit ordered
//! list; there is no global registry.

mod favorites;
mod flag_list;
mod game_dirs;
mod list_file;
mod manager;
mod whitelists;

pub use favorites::Favorites;
pub use game_dirs::{GameDirsFile, GAME_DIRS_FILE};
pub use list_file::{read_list_file, ListFileWriter};
pub use manager::{run_static_phases, ProviderManager, SearchError, SearchEvent};
pub use whitelists::Whitelists;

use std::sync::Arc;

use gamedeck_common::{Catalog, Game, PathIndex};

use crate::config::Config;
use crate::metadata::MetadataProvider;
use crate::search::SearchContext;

bitflags::bitflags! {
    /// Capabilities of a provider, deciding which steps it takes part in.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ProviderFlags: u8 {
        /// Takes part in phase 1, list discovery.
        const PROVIDES_GAMES = 0b0000_0001;
        /// Takes part in phase 2, static data discovery.
        const PROVIDES_ASSETS = 0b0000_0010;
        /// Takes part in the dynamic search.
        const PROVIDES_DYNDATA = 0b0000_0100;
    }
}

/// A source of games, assets or per-game state.
///
/// Every step has a no-op default. Steps receive `&self`; providers keeping
/// state between steps use interior mutability.
pub trait Provider: Send + Sync {
    /// Short, lowercase identifier used in logs.
    fn name(&self) -> &'static str;

    fn flags(&self) -> ProviderFlags;

    fn enabled(&self) -> bool {
        true
    }

    /// Called once at the start of every static search.
    fn load(&self) {}

    /// Phase 1: add collections, games and files.
    fn find_lists(&self, _ctx: &mut SearchContext) {}

    /// Phase 2: augment the finalized game list.
    fn find_static_data(&self, _ctx: &mut SearchContext) {}

    /// Apply per-game state to a finished catalog. `index` maps every
    /// canonical game file path to its game.
    fn find_dynamic_data(&self, _catalog: &mut Catalog, _index: &PathIndex) {}

    fn on_game_favorite_changed(&self, _catalog: &Catalog) {}

    fn on_game_whitelist_changed(&self, _catalog: &Catalog) {}

    fn on_game_launched(&self, _game: &Game) {}

    fn on_game_finished(&self, _game: &Game) {}
}

/// The standard provider list for a configuration, in search order.
pub fn default_providers(config: &Config) -> Vec<Arc<dyn Provider>> {
    providers_with_metadata(config, MetadataProvider::from_config(config))
}

/// The standard provider list with a custom metadata provider.
pub fn providers_with_metadata(
    config: &Config,
    metadata: MetadataProvider,
) -> Vec<Arc<dyn Provider>> {
    let config_dir = config.config_dir();
    let portable = config.paths.portable;

    vec![
        Arc::new(metadata),
        Arc::new(Favorites::new(config_dir.clone(), portable).with_enabled(config.providers.favorites)),
        Arc::new(Whitelists::new(config_dir, portable).with_enabled(config.providers.whitelists)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags() {
        let flags = ProviderFlags::PROVIDES_GAMES | ProviderFlags::PROVIDES_ASSETS;
        assert!(flags.contains(ProviderFlags::PROVIDES_GAMES));
        assert!(flags.contains(ProviderFlags::PROVIDES_ASSETS));
        assert!(!flags.contains(ProviderFlags::PROVIDES_DYNDATA));
        assert!(flags.contains(ProviderFlags::empty()));
        assert!(!ProviderFlags::empty().contains(ProviderFlags::PROVIDES_GAMES));
    }

    #[test]
    fn test_default_providers_follow_config() {
        let mut config = Config::default();
        config.paths.config_dir = Some("/tmp/gamedeck-test".into());
        config.providers.favorites = false;

        let providers = default_providers(&config);
        let names: Vec<&str> = providers.iter().map(|p| p.name()).collect();
        assert_eq!(names, ["metafiles", "favorites", "whitelists"]);
        assert!(providers[0].enabled());
        assert!(!providers[1].enabled());
        assert!(providers[2].enabled());
    }
}
