use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use gamedeck_common::{Catalog, Game};
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::{Provider, ProviderFlags};
use crate::search::SearchContext;

/// Progress events of a search, published on a broadcast channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SearchEvent {
    /// Game lists are collected and finalized.
    FirstPhaseComplete { elapsed_ms: u64 },
    /// Static data such as assets is attached.
    SecondPhaseComplete { elapsed_ms: u64 },
    /// The catalog of a static search is ready.
    StaticDataReady {
        games: usize,
        collections: usize,
        warnings: usize,
    },
    /// Dynamic data has been applied to a catalog.
    DynamicDataReady { elapsed_ms: u64 },
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("a search is already running")]
    AlreadyRunning,

    #[error("search worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Clears the running flag when the search worker ends, even by panic.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn elapsed_ms(since: Instant) -> u64 {
    u64::try_from(since.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn broadcast(events: &broadcast::Sender<SearchEvent>, event: SearchEvent) {
    if events.send(event).is_err() {
        debug!("No subscribers for search event");
    }
}

/// Run the static search steps of `providers` on the current thread.
///
/// Enabled providers are loaded, then asked for game lists (phase 1) and
/// static data (phase 2) in order. Each phase completion is broadcast.
pub fn run_static_phases(
    providers: &[Arc<dyn Provider>],
    events: &broadcast::Sender<SearchEvent>,
) -> Catalog {
    let enabled: Vec<&Arc<dyn Provider>> = providers.iter().filter(|p| p.enabled()).collect();
    for provider in &enabled {
        provider.load();
    }

    let mut ctx = SearchContext::new();

    let phase_start = Instant::now();
    for provider in enabled
        .iter()
        .filter(|p| p.flags().contains(ProviderFlags::PROVIDES_GAMES))
    {
        let start = Instant::now();
        provider.find_lists(&mut ctx);
        info!(
            provider = provider.name(),
            games = ctx.game_count(),
            "Game list search finished in {}ms",
            elapsed_ms(start)
        );
    }
    ctx.finalize();
    broadcast(
        events,
        SearchEvent::FirstPhaseComplete {
            elapsed_ms: elapsed_ms(phase_start),
        },
    );

    let phase_start = Instant::now();
    for provider in enabled
        .iter()
        .filter(|p| p.flags().contains(ProviderFlags::PROVIDES_ASSETS))
    {
        let start = Instant::now();
        provider.find_static_data(&mut ctx);
        info!(
            provider = provider.name(),
            "Static data search finished in {}ms",
            elapsed_ms(start)
        );
    }
    broadcast(
        events,
        SearchEvent::SecondPhaseComplete {
            elapsed_ms: elapsed_ms(phase_start),
        },
    );

    let warnings = ctx.diagnostics().len();
    let catalog = ctx.consume();
    broadcast(
        events,
        SearchEvent::StaticDataReady {
            games: catalog.games.len(),
            collections: catalog.collections.len(),
            warnings,
        },
    );
    catalog
}

fn run_dynamic_phase(
    providers: &[Arc<dyn Provider>],
    events: &broadcast::Sender<SearchEvent>,
    mut catalog: Catalog,
) -> Catalog {
    let start = Instant::now();
    let index = catalog.path_index();

    for provider in providers
        .iter()
        .filter(|p| p.enabled() && p.flags().contains(ProviderFlags::PROVIDES_DYNDATA))
    {
        provider.find_dynamic_data(&mut catalog, &index);
    }

    broadcast(
        events,
        SearchEvent::DynamicDataReady {
            elapsed_ms: elapsed_ms(start),
        },
    );
    catalog
}

/// Runs searches over an ordered provider list, one at a time.
///
/// Searches execute on a blocking worker so the caller never waits on file
/// system access. Starting a search while one is running is refused, and
/// notification hooks are skipped while a search is running.
pub struct ProviderManager {
    providers: Arc<[Arc<dyn Provider>]>,
    running: Arc<AtomicBool>,
    events: broadcast::Sender<SearchEvent>,
}

impl ProviderManager {
    pub fn new(providers: Vec<Arc<dyn Provider>>) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            providers: providers.into(),
            running: Arc::new(AtomicBool::new(false)),
            events,
        }
    }

    pub fn providers(&self) -> &[Arc<dyn Provider>] {
        &self.providers
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SearchEvent> {
        self.events.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn try_start(&self) -> Result<RunningGuard, SearchError> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| RunningGuard(Arc::clone(&self.running)))
            .map_err(|_| SearchError::AlreadyRunning)
    }

    /// Start a static search on a blocking worker.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start_static_search(&self) -> Result<JoinHandle<Catalog>, SearchError> {
        let guard = self.try_start()?;
        let providers = Arc::clone(&self.providers);
        let events = self.events.clone();

        info!("Starting static search with {} providers", providers.len());
        Ok(tokio::task::spawn_blocking(move || {
            let _guard = guard;
            run_static_phases(&providers, &events)
        }))
    }

    /// Start applying dynamic data to `catalog` on a blocking worker.
    pub fn start_dynamic_search(&self, catalog: Catalog) -> Result<JoinHandle<Catalog>, SearchError> {
        let guard = self.try_start()?;
        let providers = Arc::clone(&self.providers);
        let events = self.events.clone();

        Ok(tokio::task::spawn_blocking(move || {
            let _guard = guard;
            run_dynamic_phase(&providers, &events, catalog)
        }))
    }

    /// Run a static search and wait for its catalog.
    pub async fn run_static_search(&self) -> Result<Catalog, SearchError> {
        Ok(self.start_static_search()?.await?)
    }

    /// Run a dynamic search and wait for the updated catalog.
    pub async fn run_dynamic_search(&self, catalog: Catalog) -> Result<Catalog, SearchError> {
        Ok(self.start_dynamic_search(catalog)?.await?)
    }

    fn notify(&self, hook: &str, call: impl Fn(&dyn Provider)) {
        if self.is_running() {
            debug!(hook, "search running, notification skipped");
            return;
        }
        for provider in self.providers.iter().filter(|p| p.enabled()) {
            call(provider.as_ref());
        }
    }

    pub fn notify_favorite_changed(&self, catalog: &Catalog) {
        self.notify("favorite_changed", |p| p.on_game_favorite_changed(catalog));
    }

    pub fn notify_whitelist_changed(&self, catalog: &Catalog) {
        self.notify("whitelist_changed", |p| p.on_game_whitelist_changed(catalog));
    }

    pub fn notify_game_launched(&self, game: &Game) {
        self.notify("game_launched", |p| p.on_game_launched(game));
    }

    pub fn notify_game_finished(&self, game: &Game) {
        self.notify("game_finished", |p| p.on_game_finished(game));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use gamedeck_common::{GameData, PathIndex};
    use parking_lot::Mutex;
    use std::path::PathBuf;
    use std::sync::mpsc;

    /// Records the steps it is asked to run.
    #[derive(Default)]
    struct Recorder {
        name: &'static str,
        flags: ProviderFlags,
        disabled: bool,
        calls: Mutex<Vec<String>>,
        gate: Mutex<Option<mpsc::Receiver<()>>>,
    }

    impl Recorder {
        fn new(name: &'static str, flags: ProviderFlags) -> Self {
            Self {
                name,
                flags,
                ..Self::default()
            }
        }

        fn record(&self, step: &str) {
            self.calls.lock().push(format!("{}:{}", self.name, step));
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }
    }

    impl Provider for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        fn flags(&self) -> ProviderFlags {
            self.flags
        }

        fn enabled(&self) -> bool {
            !self.disabled
        }

        fn load(&self) {
            self.record("load");
        }

        fn find_lists(&self, ctx: &mut SearchContext) {
            if let Some(gate) = self.gate.lock().take() {
                let _ = gate.recv();
            }
            self.record("lists");
            let id = ctx.game_for_path(PathBuf::from(format!("/games/{}.bin", self.name)));
            ctx.add_to_collection("Recorded", id).unwrap();
        }

        fn find_static_data(&self, _ctx: &mut SearchContext) {
            self.record("static");
        }

        fn find_dynamic_data(&self, catalog: &mut Catalog, index: &PathIndex) {
            self.record("dynamic");
            assert_eq!(index.len(), catalog.games.len());
        }

        fn on_game_favorite_changed(&self, _catalog: &Catalog) {
            self.record("favorite");
        }

        fn on_game_launched(&self, _game: &Game) {
            self.record("launched");
        }
    }

    #[tokio::test]
    async fn test_static_search_runs_phases_in_order() {
        let first = Arc::new(Recorder::new(
            "first",
            ProviderFlags::PROVIDES_GAMES | ProviderFlags::PROVIDES_ASSETS,
        ));
        let second = Arc::new(Recorder::new("second", ProviderFlags::PROVIDES_GAMES));
        let manager = ProviderManager::new(vec![first.clone(), second.clone()]);
        let mut events = manager.subscribe();

        let catalog = manager.run_static_search().await.unwrap();

        assert_eq!(catalog.games.len(), 2);
        assert_eq!(catalog.collection("Recorded").unwrap().games.len(), 2);
        assert_eq!(first.calls(), ["first:load", "first:lists", "first:static"]);
        assert_eq!(second.calls(), ["second:load", "second:lists"]);

        assert_matches!(events.recv().await, Ok(SearchEvent::FirstPhaseComplete { .. }));
        assert_matches!(events.recv().await, Ok(SearchEvent::SecondPhaseComplete { .. }));
        assert_eq!(
            events.recv().await.unwrap(),
            SearchEvent::StaticDataReady {
                games: 2,
                collections: 1,
                warnings: 0
            }
        );
        assert!(!manager.is_running());
    }

    #[tokio::test]
    async fn test_disabled_providers_are_skipped() {
        let disabled = Arc::new(Recorder {
            disabled: true,
            ..Recorder::new("off", ProviderFlags::PROVIDES_GAMES)
        });
        let manager = ProviderManager::new(vec![disabled.clone()]);

        let catalog = manager.run_static_search().await.unwrap();
        assert!(catalog.is_empty());
        assert!(disabled.calls().is_empty());
    }

    #[tokio::test]
    async fn test_dynamic_search_gets_path_index() {
        let provider = Arc::new(Recorder::new(
            "dyn",
            ProviderFlags::PROVIDES_GAMES | ProviderFlags::PROVIDES_DYNDATA,
        ));
        let manager = ProviderManager::new(vec![provider.clone()]);
        let mut events = manager.subscribe();

        let catalog = manager.run_static_search().await.unwrap();
        let catalog = manager.run_dynamic_search(catalog).await.unwrap();

        assert_eq!(catalog.games.len(), 1);
        assert_eq!(provider.calls().last().unwrap(), "dyn:dynamic");

        let mut saw_dynamic = false;
        while let Ok(event) = events.try_recv() {
            saw_dynamic |= matches!(event, SearchEvent::DynamicDataReady { .. });
        }
        assert!(saw_dynamic);
    }

    #[tokio::test]
    async fn test_second_search_is_refused_while_running() {
        let (release, gate) = mpsc::channel();
        let slow = Arc::new(Recorder::new("slow", ProviderFlags::PROVIDES_GAMES));
        *slow.gate.lock() = Some(gate);
        let manager = ProviderManager::new(vec![slow.clone()]);

        let handle = manager.start_static_search().unwrap();
        assert!(manager.is_running());
        assert_matches!(manager.start_static_search(), Err(SearchError::AlreadyRunning));
        assert_matches!(
            manager.start_dynamic_search(Catalog::default()),
            Err(SearchError::AlreadyRunning)
        );

        // Hooks are silently skipped while the search runs.
        manager.notify_favorite_changed(&Catalog::default());

        release.send(()).unwrap();
        let catalog = handle.await.unwrap();
        assert_eq!(catalog.games.len(), 1);
        assert!(!manager.is_running());
        assert!(!slow.calls().iter().any(|call| call.ends_with("favorite")));

        manager.notify_favorite_changed(&catalog);
        assert_eq!(slow.calls().last().unwrap(), "slow:favorite");
        assert!(manager.run_static_search().await.is_ok());
    }

    #[test]
    fn test_hooks_reach_enabled_providers() {
        let provider = Arc::new(Recorder::new("hooks", ProviderFlags::empty()));
        let manager = ProviderManager::new(vec![provider.clone()]);
        let game = Game {
            id: gamedeck_common::GameId::new(0),
            data: GameData::new("Foo"),
            files: Vec::new(),
            collections: Vec::new(),
        };

        manager.notify_game_launched(&game);
        manager.notify_game_finished(&game);
        assert_eq!(provider.calls(), ["hooks:launched"]);
    }
}
