//! Application root: owns the shared collaborators and builds state components.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use jobdeck_core::{Error, ErrorHandler, JobApi, KeyValueStore, Result, SelectionSignal};

use crate::active::ActiveDetailState;
use crate::bookmarks::BookmarkState;
use crate::cache::JobCache;
use crate::config::BoardConfig;
use crate::listing::ListingState;
use crate::search::SearchState;

/// Root of the data layer.
///
/// Holds the single [`JobCache`] and the external collaborators, and hands
/// them to every state it creates so that all consumers share one cache.
pub struct JobBoard {
    cache: JobCache,
    store: Arc<dyn KeyValueStore>,
    signal: Arc<dyn SelectionSignal>,
    config: BoardConfig,
}

impl JobBoard {
    pub fn builder() -> JobBoardBuilder {
        JobBoardBuilder::default()
    }

    pub fn cache(&self) -> &JobCache {
        &self.cache
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn create_search_state(&self) -> SearchState {
        SearchState::new(self.config.debounce)
    }

    pub fn create_listing_state(&self, debounced_query: impl Into<String>) -> ListingState {
        ListingState::new(self.cache.clone(), debounced_query, self.config.page_size)
    }

    pub fn create_bookmark_state(&self) -> BookmarkState {
        BookmarkState::new(
            self.cache.clone(),
            Arc::clone(&self.store),
            self.config.bookmarks_key.clone(),
        )
    }

    pub fn create_active_detail_state(&self) -> ActiveDetailState {
        ActiveDetailState::new(self.cache.clone(), self.signal.as_ref())
    }

    /// Forward every debounced query into `listing` and refresh it.
    ///
    /// Each refresh runs in its own task so a slow query never delays a newer
    /// one; the listing discards results for queries that are no longer
    /// current.
    pub fn spawn_search_pipeline(
        &self,
        search: &SearchState,
        listing: Arc<ListingState>,
    ) -> PipelineHandle {
        let mut rx = search.subscribe_debounced();
        info!(subsystem = "state", component = "pipeline", "Search pipeline started");

        let task = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let query = rx.borrow_and_update().clone();
                debug!(
                    subsystem = "state",
                    component = "pipeline",
                    query = %query,
                    "Debounced query received"
                );
                listing.set_query(query);
                let listing = Arc::clone(&listing);
                tokio::spawn(async move { listing.refresh().await });
            }
            info!(subsystem = "state", component = "pipeline", "Search pipeline stopped");
        });

        PipelineHandle { task: Some(task) }
    }
}

/// Handle for a running search pipeline. Dropping it stops the pipeline.
pub struct PipelineHandle {
    task: Option<JoinHandle<()>>,
}

impl PipelineHandle {
    /// Stop forwarding queries.
    pub fn shutdown(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().map(|t| !t.is_finished()).unwrap_or(false)
    }
}

impl Drop for PipelineHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Builder for [`JobBoard`].
///
/// Takes either a prebuilt [`JobCache`] or the `JobApi` and `ErrorHandler`
/// to build one from. Any collaborator left out fails `build()` with
/// [`Error::MissingDependency`].
#[derive(Default)]
pub struct JobBoardBuilder {
    cache: Option<JobCache>,
    api: Option<Arc<dyn JobApi>>,
    error_handler: Option<Arc<dyn ErrorHandler>>,
    store: Option<Arc<dyn KeyValueStore>>,
    signal: Option<Arc<dyn SelectionSignal>>,
    config: BoardConfig,
}

impl JobBoardBuilder {
    pub fn cache(mut self, cache: JobCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn api(mut self, api: impl JobApi + 'static) -> Self {
        self.api = Some(Arc::new(api));
        self
    }

    pub fn error_handler(mut self, handler: impl ErrorHandler + 'static) -> Self {
        self.error_handler = Some(Arc::new(handler));
        self
    }

    pub fn store(mut self, store: impl KeyValueStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    pub fn signal(mut self, signal: impl SelectionSignal + 'static) -> Self {
        self.signal = Some(Arc::new(signal));
        self
    }

    pub fn config(mut self, config: BoardConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<JobBoard> {
        let cache = match self.cache {
            Some(cache) => cache,
            None => {
                let api = self.api.ok_or(Error::MissingDependency("JobApi"))?;
                let handler = self
                    .error_handler
                    .ok_or(Error::MissingDependency("ErrorHandler"))?;
                JobCache::builder()
                    .api_arc(api)
                    .error_handler_arc(handler)
                    .stale_time(self.config.stale_time)
                    .build()?
            }
        };
        let store = self.store.ok_or(Error::MissingDependency("KeyValueStore"))?;
        let signal = self
            .signal
            .ok_or(Error::MissingDependency("SelectionSignal"))?;

        info!(
            subsystem = "state",
            page_size = self.config.page_size,
            debounce_ms = self.config.debounce.as_millis() as u64,
            stale_secs = self.config.stale_time.as_secs(),
            "Job board built"
        );

        Ok(JobBoard {
            cache,
            store,
            signal,
            config: self.config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::active::FragmentSignal;
    use crate::persist::MemoryStore;
    use jobdeck_core::mock::MockJobApi;
    use jobdeck_core::CollectingErrorHandler;

    #[test]
    fn test_build_without_api_fails_fast() {
        let result = JobBoard::builder()
            .error_handler(CollectingErrorHandler::new())
            .store(MemoryStore::new())
            .signal(FragmentSignal::default())
            .build();
        assert!(matches!(result, Err(Error::MissingDependency("JobApi"))));
    }

    #[test]
    fn test_build_without_store_fails_fast() {
        let result = JobBoard::builder()
            .api(MockJobApi::new())
            .error_handler(CollectingErrorHandler::new())
            .signal(FragmentSignal::default())
            .build();
        assert!(matches!(
            result,
            Err(Error::MissingDependency("KeyValueStore"))
        ));
    }

    #[test]
    fn test_build_without_signal_fails_fast() {
        let result = JobBoard::builder()
            .api(MockJobApi::new())
            .error_handler(CollectingErrorHandler::new())
            .store(MemoryStore::new())
            .build();
        assert!(matches!(
            result,
            Err(Error::MissingDependency("SelectionSignal"))
        ));
    }

    #[test]
    fn test_prebuilt_cache_is_shared_by_states() {
        let cache = JobCache::builder()
            .api(MockJobApi::new())
            .error_handler(CollectingErrorHandler::new())
            .build()
            .unwrap();
        let board = JobBoard::builder()
            .cache(cache)
            .store(MemoryStore::new())
            .signal(FragmentSignal::default())
            .config(BoardConfig::default().with_page_size(3))
            .build()
            .unwrap();

        let listing = board.create_listing_state("rust");
        assert_eq!(listing.page_size(), 3);
        assert_eq!(listing.query(), "rust");
    }
}
