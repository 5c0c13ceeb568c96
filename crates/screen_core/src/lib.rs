use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::{
    future::{BoxFuture, Shared},
    FutureExt,
};
use shared::{
    domain::{MovieId, MovieRecord},
    error::StoreError,
    screen::{NavigationEvent, ScreenPhase, ScreenState},
};
use thiserror::Error;
use tokio::{runtime::Handle, sync::broadcast};
use tracing::{debug, info, warn};

pub mod collaborators;
pub mod memory;
pub mod store;

pub use collaborators::{
    DiscardSelection, FlagMutator, IdSink, MissingFlagStore, MissingSearchGateway, MovieFlag,
    QuerySource, SearchGateway,
};
pub use store::{StateStore, StateStream};

const NAVIGATION_EVENT_CAPACITY: usize = 64;

type SearchTask = Shared<BoxFuture<'static, ()>>;

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("movie list controller must be started inside a tokio runtime")]
    NoRuntime,
}

/// Everything the list screen needs from the outside world.
#[derive(Clone)]
pub struct ScreenDependencies {
    pub search: Arc<dyn SearchGateway>,
    pub watch_later: Arc<dyn FlagMutator>,
    pub watched: Arc<dyn FlagMutator>,
    pub query: Arc<dyn QuerySource>,
    pub id_sink: Arc<dyn IdSink>,
}

impl ScreenDependencies {
    /// Dependencies that fail every search and every flag write.
    pub fn unavailable(query: Arc<dyn QuerySource>) -> Self {
        Self {
            search: Arc::new(MissingSearchGateway),
            watch_later: Arc::new(MissingFlagStore),
            watched: Arc::new(MissingFlagStore),
            query,
            id_sink: Arc::new(DiscardSelection),
        }
    }

    fn mutator(&self, flag: MovieFlag) -> Arc<dyn FlagMutator> {
        match flag {
            MovieFlag::WatchLater => Arc::clone(&self.watch_later),
            MovieFlag::Watched => Arc::clone(&self.watched),
        }
    }
}

/// Drives the movie list screen: runs the initial search, applies flag
/// toggles and emits the details navigation pulse.
///
/// All snapshot writes go through one [`StateStore`]; every command is a
/// synchronous call that never fails from the caller's side.
pub struct MovieListController {
    deps: ScreenDependencies,
    store: StateStore<ScreenState>,
    runtime: Handle,
    phase: Mutex<ScreenPhase>,
    search_task: Mutex<Option<SearchTask>>,
    navigation: broadcast::Sender<NavigationEvent>,
}

impl MovieListController {
    /// Builds the controller and kicks off the search for the pending query.
    pub fn start(deps: ScreenDependencies) -> Result<Arc<Self>, ControllerError> {
        let runtime = Handle::try_current().map_err(|_| ControllerError::NoRuntime)?;
        let (navigation, _) = broadcast::channel(NAVIGATION_EVENT_CAPACITY);
        let controller = Arc::new(Self {
            deps,
            store: StateStore::new(),
            runtime,
            phase: Mutex::new(ScreenPhase::Uninitialized),
            search_task: Mutex::new(None),
            navigation,
        });
        controller.initialize();
        Ok(controller)
    }

    /// Reads the pending query and searches for it in the background. Only the
    /// first call does anything.
    pub fn initialize(self: &Arc<Self>) {
        {
            let mut phase = self.lock_phase();
            if *phase != ScreenPhase::Uninitialized {
                debug!(phase = ?*phase, "movie list already initialized");
                return;
            }
            *phase = ScreenPhase::Loading;
        }

        let query = self.deps.query.current_query();
        info!(%query, "starting movie search");
        let controller = Arc::clone(self);
        let task = self
            .runtime
            .spawn(async move { controller.run_search(query).await })
            .map(|result| {
                if let Err(err) = result {
                    warn!(error = %err, "movie search task ended abnormally");
                }
            })
            .boxed()
            .shared();
        *self.lock_search_task() = Some(task);
    }

    async fn run_search(&self, query: String) {
        let (state, outcome) = match self.deps.search.search(&query).await {
            Ok(items) => {
                info!(%query, items = items.len(), "movie search succeeded");
                (ScreenState::loaded(items), ScreenPhase::Loaded)
            }
            Err(failure) => {
                warn!(%query, error = %failure, "movie search failed");
                (ScreenState::failed(failure.message), ScreenPhase::Failed)
            }
        };

        // Phase and snapshot move together: observers woken by the commit
        // block on the phase lock until the new phase is in place.
        let mut phase = self.lock_phase();
        match self.store.commit(state) {
            Ok(()) => {
                if *phase == ScreenPhase::Loading {
                    *phase = outcome;
                }
            }
            Err(StoreError::Closed) => {
                debug!(%query, "search finished after teardown, result dropped");
            }
        }
    }

    /// Waits for the construction-time search to finish. Any number of
    /// callers may wait at once.
    pub async fn search_finished(&self) {
        let task = self.lock_search_task().clone();
        if let Some(task) = task {
            task.await;
        }
    }

    pub fn observe(&self) -> StateStream<ScreenState> {
        self.store.observe()
    }

    pub fn current(&self) -> Option<ScreenState> {
        self.store.current()
    }

    pub fn phase(&self) -> ScreenPhase {
        *self.lock_phase()
    }

    /// Discrete details-navigation events, delivered alongside the
    /// `navigate_to_details` pulse.
    pub fn subscribe_navigation(&self) -> broadcast::Receiver<NavigationEvent> {
        self.navigation.subscribe()
    }

    pub fn toggle_watch_later(&self, id: &MovieId, watch_later: bool) {
        self.persist_flag(MovieFlag::WatchLater, id, watch_later);
        self.patch_item(id, |item| item.with_watch_later(watch_later));
    }

    pub fn toggle_watched(&self, id: &MovieId, watched: bool) {
        self.persist_flag(MovieFlag::Watched, id, watched);
        self.patch_item(id, |item| item.with_watched(watched));
    }

    /// Hands `id` to the details screen and pulses `navigate_to_details`.
    ///
    /// Both pulse commits land back-to-back; with no snapshot yet only the id
    /// is stored and the navigation event is sent.
    pub fn go_to_details(&self, id: &MovieId) {
        self.deps.id_sink.store(id);

        let pulse = self.store.update_sequence(|current| match current {
            Some(state) => vec![state.with_navigation(true), state.with_navigation(false)],
            None => Vec::new(),
        });
        match pulse {
            Ok(0) => debug!(movie_id = %id, "no screen state yet, skipping details pulse"),
            Ok(_) => info!(movie_id = %id, "navigating to movie details"),
            Err(err) => {
                debug!(movie_id = %id, error = %err, "details requested after teardown");
                return;
            }
        }

        let _ = self
            .navigation
            .send(NavigationEvent::Details { id: id.clone() });
    }

    /// Closes the state stream. In-flight searches and flag writes keep
    /// running; their late commits are dropped.
    pub fn teardown(&self) {
        {
            let mut phase = self.lock_phase();
            if *phase == ScreenPhase::Closed {
                return;
            }
            *phase = ScreenPhase::Closed;
        }
        self.store.close();
        info!("movie list screen torn down");
    }

    fn persist_flag(&self, flag: MovieFlag, id: &MovieId, value: bool) {
        let mutator = self.deps.mutator(flag);
        let id = id.clone();
        self.runtime.spawn(async move {
            if let Err(err) = mutator.set_flag(&id, value).await {
                warn!(
                    movie_id = %id,
                    flag = flag.as_str(),
                    value,
                    error = %err,
                    "failed to persist movie flag"
                );
            }
        });
    }

    fn patch_item<F>(&self, id: &MovieId, update: F)
    where
        F: FnOnce(&MovieRecord) -> MovieRecord,
    {
        match self
            .store
            .update(|current| current?.replace_item(id, update))
        {
            Ok(Some(_)) => debug!(movie_id = %id, "movie record updated"),
            Ok(None) => debug!(movie_id = %id, "no movie record to update"),
            Err(err) => debug!(movie_id = %id, error = %err, "movie update dropped"),
        }
    }

    fn lock_phase(&self) -> MutexGuard<'_, ScreenPhase> {
        self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_search_task(&self) -> MutexGuard<'_, Option<SearchTask>> {
        self.search_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
