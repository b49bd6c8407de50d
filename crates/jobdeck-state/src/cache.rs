//! Keyed record cache with staleness and single-flight fetch coalescing.
//!
//! A [`RecordCache`] holds one slot per key. A `fetch` either returns the
//! current snapshot (fresh value, or a failure still inside the staleness
//! window), attaches to the load already in flight for the key, or starts a
//! new load. In-flight loads are `Shared` futures stored in the slot, so every
//! concurrent consumer of a key awaits the same attempt and receives the same
//! terminal [`CacheEntry`]. Each attempt runs on its own tokio task, so it
//! completes and lands in the slot even when every consumer stops waiting.
//!
//! ## Refetch policy
//!
//! | Slot | `fetch` behavior |
//! |------|------------------|
//! | never loaded | load |
//! | loading | attach to in-flight load |
//! | Ready, younger than stale window | return cached |
//! | Failed, younger than stale window | return failure, no retry |
//! | older than stale window, or invalidated | load |
//!
//! There is no eviction: slots live as long as the cache.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::time::Instant;
use tracing::{debug, trace};

use jobdeck_core::{
    defaults, Error, ErrorHandler, FetchError, JobApi, JobId, JobItem, JobItemExpanded, Result,
};

/// Lifecycle state of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryState {
    /// Never requested.
    Idle,
    /// A load is in flight.
    Fetching,
    /// The last completed load succeeded.
    Ready,
    /// The last completed load failed.
    Failed,
}

/// Point-in-time view of one cache key.
#[derive(Debug)]
pub struct CacheEntry<V> {
    pub key: String,
    pub state: EntryState,
    /// Last successfully loaded value. Kept across a later failure.
    pub value: Option<Arc<V>>,
    /// Error of the last completed attempt, if it failed.
    pub error: Option<FetchError>,
    /// Completion time of the last attempt, successful or not.
    pub fetched_at: Option<Instant>,
}

impl<V> Clone for CacheEntry<V> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            state: self.state,
            value: self.value.clone(),
            error: self.error.clone(),
            fetched_at: self.fetched_at,
        }
    }
}

impl<V> CacheEntry<V> {
    fn idle(key: &str) -> Self {
        Self {
            key: key.to_string(),
            state: EntryState::Idle,
            value: None,
            error: None,
            fetched_at: None,
        }
    }

    pub fn is_fetching(&self) -> bool {
        self.state == EntryState::Fetching
    }

    pub fn is_ready(&self) -> bool {
        self.state == EntryState::Ready
    }

    pub fn is_failed(&self) -> bool {
        self.state == EntryState::Failed
    }

    /// Value only when the entry is Ready.
    pub fn ready_value(&self) -> Option<Arc<V>> {
        if self.is_ready() {
            self.value.clone()
        } else {
            None
        }
    }
}

type InFlight<V> = Shared<BoxFuture<'static, CacheEntry<V>>>;

struct Slot<V> {
    value: Option<Arc<V>>,
    error: Option<FetchError>,
    fetched_at: Option<Instant>,
    in_flight: Option<InFlight<V>>,
    invalidated: bool,
}

impl<V> Slot<V> {
    fn new() -> Self {
        Self {
            value: None,
            error: None,
            fetched_at: None,
            in_flight: None,
            invalidated: false,
        }
    }

    fn state(&self) -> EntryState {
        if self.in_flight.is_some() {
            EntryState::Fetching
        } else if self.error.is_some() {
            EntryState::Failed
        } else if self.value.is_some() {
            EntryState::Ready
        } else {
            EntryState::Idle
        }
    }

    fn snapshot(&self, key: &str) -> CacheEntry<V> {
        CacheEntry {
            key: key.to_string(),
            state: self.state(),
            value: self.value.clone(),
            error: self.error.clone(),
            fetched_at: self.fetched_at,
        }
    }

    fn needs_load(&self, now: Instant, stale_time: Duration) -> bool {
        if self.invalidated {
            return true;
        }
        match self.fetched_at {
            None => true,
            Some(at) => now.saturating_duration_since(at) >= stale_time,
        }
    }
}

struct CacheInner<V> {
    name: &'static str,
    slots: Mutex<HashMap<String, Slot<V>>>,
    stale_time: Duration,
    error_handler: Arc<dyn ErrorHandler>,
}

impl<V> CacheInner<V> {
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Slot<V>>> {
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record the outcome of an attempt and report a failure exactly once.
    fn complete(&self, key: &str, outcome: std::result::Result<V, FetchError>) -> CacheEntry<V> {
        let (entry, failure) = {
            let mut slots = self.lock();
            let slot = slots.entry(key.to_string()).or_insert_with(Slot::new);
            slot.in_flight = None;
            slot.fetched_at = Some(Instant::now());
            let failure = match outcome {
                Ok(value) => {
                    slot.value = Some(Arc::new(value));
                    slot.error = None;
                    None
                }
                Err(err) => {
                    slot.error = Some(err.clone());
                    Some(err)
                }
            };
            (slot.snapshot(key), failure)
        };

        match failure {
            Some(err) => self.error_handler.handle(key, &err),
            None => debug!(
                subsystem = "cache",
                component = self.name,
                cache_key = key,
                "Load completed"
            ),
        }

        entry
    }
}

/// Keyed cache of remote fetch results.
///
/// Cloning is cheap and yields a handle to the same cache.
pub struct RecordCache<V> {
    inner: Arc<CacheInner<V>>,
}

impl<V> Clone for RecordCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> fmt::Debug for RecordCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordCache")
            .field("name", &self.inner.name)
            .field("stale_time", &self.inner.stale_time)
            .field("len", &self.inner.lock().len())
            .finish()
    }
}

impl<V: Send + Sync + 'static> RecordCache<V> {
    /// Create an empty cache.
    ///
    /// `name` only labels log output.
    pub fn new(
        name: &'static str,
        stale_time: Duration,
        error_handler: Arc<dyn ErrorHandler>,
    ) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                name,
                slots: Mutex::new(HashMap::new()),
                stale_time,
                error_handler,
            }),
        }
    }

    /// Return the entry for `key`, loading it first when required.
    ///
    /// `loader` is invoked only when a new attempt starts; callers that find
    /// an attempt already in flight attach to it instead.
    pub async fn fetch<F, Fut>(&self, key: &str, loader: F) -> CacheEntry<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, FetchError>> + Send + 'static,
    {
        let in_flight = {
            let mut slots = self.inner.lock();
            let slot = slots.entry(key.to_string()).or_insert_with(Slot::new);

            if let Some(in_flight) = &slot.in_flight {
                debug!(
                    subsystem = "cache",
                    component = self.inner.name,
                    cache_key = key,
                    "Attaching to in-flight load"
                );
                in_flight.clone()
            } else if !slot.needs_load(Instant::now(), self.inner.stale_time) {
                trace!(
                    subsystem = "cache",
                    component = self.inner.name,
                    cache_key = key,
                    state = ?slot.state(),
                    "Cache hit"
                );
                return slot.snapshot(key);
            } else {
                debug!(
                    subsystem = "cache",
                    component = self.inner.name,
                    cache_key = key,
                    invalidated = slot.invalidated,
                    "Starting load"
                );
                slot.invalidated = false;
                let in_flight = self.start_load(key, loader());
                slot.in_flight = Some(in_flight.clone());
                in_flight
            }
        };

        in_flight.await
    }

    /// Run the attempt on its own task so it completes even if every
    /// consumer stops awaiting it. The slot holds a shared handle to that task.
    fn start_load<Fut>(&self, key: &str, load: Fut) -> InFlight<V>
    where
        Fut: Future<Output = std::result::Result<V, FetchError>> + Send + 'static,
    {
        let inner: Weak<CacheInner<V>> = Arc::downgrade(&self.inner);
        let key = key.to_string();

        let task = {
            let inner = inner.clone();
            let key = key.clone();
            tokio::spawn(async move {
                let outcome = load.await;
                finish(&inner, &key, outcome)
            })
        };

        task.map(move |joined| match joined {
            Ok(entry) => entry,
            // The loader panicked; settle the slot so the key does not stay Fetching.
            Err(e) => finish(
                &inner,
                &key,
                Err(FetchError::Network(format!("load task ended: {}", e))),
            ),
        })
        .boxed()
        .shared()
    }
}

/// Record an attempt's outcome in the cache, if it still exists.
fn finish<V>(
    inner: &Weak<CacheInner<V>>,
    key: &str,
    outcome: std::result::Result<V, FetchError>,
) -> CacheEntry<V> {
    if let Some(inner) = inner.upgrade() {
        return inner.complete(key, outcome);
    }

    // Cache dropped mid-flight; nobody is left to observe the slot.
    let mut entry = CacheEntry::idle(key);
    match outcome {
        Ok(value) => {
            entry.state = EntryState::Ready;
            entry.value = Some(Arc::new(value));
        }
        Err(err) => {
            entry.state = EntryState::Failed;
            entry.error = Some(err);
        }
    }
    entry.fetched_at = Some(Instant::now());
    entry
}

impl<V> RecordCache<V> {
    /// Current snapshot for `key` without triggering a load.
    pub fn peek(&self, key: &str) -> CacheEntry<V> {
        self.inner
            .lock()
            .get(key)
            .map(|slot| slot.snapshot(key))
            .unwrap_or_else(|| CacheEntry::idle(key))
    }

    /// Force the next `fetch` for `key` to reload regardless of staleness.
    ///
    /// Returns `false` if the key was never requested. An invalidation that
    /// lands while a load is in flight still applies after that load completes.
    pub fn invalidate(&self, key: &str) -> bool {
        let mut slots = self.inner.lock();
        match slots.get_mut(key) {
            Some(slot) => {
                slot.invalidated = true;
                debug!(
                    subsystem = "cache",
                    component = self.inner.name,
                    cache_key = key,
                    "Invalidated"
                );
                true
            }
            None => false,
        }
    }

    /// Number of keys held.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stale_time(&self) -> Duration {
        self.inner.stale_time
    }
}

// =============================================================================
// JOB CACHE
// =============================================================================

/// The shared cache instance injected into every state component.
///
/// Bundles the list cache (keyed by query) and the detail cache (keyed by id)
/// with the [`JobApi`] that feeds them. The bookmark and active-detail paths
/// share the detail cache, so a given id is only ever loaded once at a time.
#[derive(Clone)]
pub struct JobCache {
    api: Arc<dyn JobApi>,
    searches: RecordCache<Vec<JobItem>>,
    items: RecordCache<JobItemExpanded>,
}

impl fmt::Debug for JobCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobCache")
            .field("searches", &self.searches)
            .field("items", &self.items)
            .finish()
    }
}

impl JobCache {
    pub fn builder() -> JobCacheBuilder {
        JobCacheBuilder::default()
    }

    /// Cache key for a list fetch.
    pub fn search_key(text: &str) -> String {
        format!("{}:{}", defaults::SEARCH_KEY_PREFIX, text)
    }

    /// Cache key for a detail fetch.
    pub fn item_key(id: JobId) -> String {
        format!("{}:{}", defaults::ITEM_KEY_PREFIX, id)
    }

    /// Fetch summary records for `text` through the cache.
    pub async fn search(&self, text: &str) -> CacheEntry<Vec<JobItem>> {
        let api = Arc::clone(&self.api);
        let query = text.to_string();
        self.searches
            .fetch(&Self::search_key(text), move || async move {
                api.search(&query).await
            })
            .await
    }

    /// Fetch the detail record for `id` through the cache.
    pub async fn job_item(&self, id: JobId) -> CacheEntry<JobItemExpanded> {
        let api = Arc::clone(&self.api);
        self.items
            .fetch(&Self::item_key(id), move || async move {
                api.job_item(id).await
            })
            .await
    }

    pub fn peek_search(&self, text: &str) -> CacheEntry<Vec<JobItem>> {
        self.searches.peek(&Self::search_key(text))
    }

    pub fn peek_job_item(&self, id: JobId) -> CacheEntry<JobItemExpanded> {
        self.items.peek(&Self::item_key(id))
    }

    pub fn invalidate_search(&self, text: &str) -> bool {
        self.searches.invalidate(&Self::search_key(text))
    }

    pub fn invalidate_job_item(&self, id: JobId) -> bool {
        self.items.invalidate(&Self::item_key(id))
    }

    /// The underlying list cache.
    pub fn searches(&self) -> &RecordCache<Vec<JobItem>> {
        &self.searches
    }

    /// The underlying detail cache.
    pub fn items(&self) -> &RecordCache<JobItemExpanded> {
        &self.items
    }
}

/// Builder for [`JobCache`]; every collaborator is required.
pub struct JobCacheBuilder {
    api: Option<Arc<dyn JobApi>>,
    error_handler: Option<Arc<dyn ErrorHandler>>,
    stale_time: Duration,
}

impl Default for JobCacheBuilder {
    fn default() -> Self {
        Self {
            api: None,
            error_handler: None,
            stale_time: Duration::from_secs(defaults::STALE_TIME_SECS),
        }
    }
}

impl JobCacheBuilder {
    pub fn api(self, api: impl JobApi + 'static) -> Self {
        self.api_arc(Arc::new(api))
    }

    pub fn api_arc(mut self, api: Arc<dyn JobApi>) -> Self {
        self.api = Some(api);
        self
    }

    pub fn error_handler(self, handler: impl ErrorHandler + 'static) -> Self {
        self.error_handler_arc(Arc::new(handler))
    }

    pub fn error_handler_arc(mut self, handler: Arc<dyn ErrorHandler>) -> Self {
        self.error_handler = Some(handler);
        self
    }

    pub fn stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time;
        self
    }

    pub fn build(self) -> Result<JobCache> {
        let api = self.api.ok_or(Error::MissingDependency("JobApi"))?;
        let error_handler = self
            .error_handler
            .ok_or(Error::MissingDependency("ErrorHandler"))?;

        Ok(JobCache {
            api,
            searches: RecordCache::new("searches", self.stale_time, Arc::clone(&error_handler)),
            items: RecordCache::new("items", self.stale_time, error_handler),
        })
    }
}
