//! Active-detail state and the URL-fragment selection signal.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tracing::{debug, trace};

use jobdeck_core::{
    JobId, JobItemExpanded, SelectionCallback, SelectionSignal, Subscription,
};

use crate::cache::JobCache;

/// Parse a URL fragment such as `#123` into a job id.
///
/// Anything that is not a positive integer reads as no selection.
pub fn parse_fragment(fragment: &str) -> Option<JobId> {
    fragment
        .strip_prefix('#')
        .unwrap_or(fragment)
        .trim()
        .parse::<JobId>()
        .ok()
        .filter(|&id| id != 0)
}

type SharedCallback = Arc<dyn Fn(Option<JobId>) + Send + Sync>;

struct FragmentInner {
    fragment: Mutex<String>,
    subscribers: Mutex<HashMap<u64, SharedCallback>>,
    next_id: AtomicU64,
}

/// In-process [`SelectionSignal`] backed by a URL fragment string.
///
/// Subscribers are notified when the fragment changes, mirroring the
/// browser's `hashchange` event.
#[derive(Clone)]
pub struct FragmentSignal {
    inner: Arc<FragmentInner>,
}

impl Default for FragmentSignal {
    fn default() -> Self {
        Self::new("")
    }
}

impl FragmentSignal {
    pub fn new(fragment: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(FragmentInner {
                fragment: Mutex::new(fragment.into()),
                subscribers: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    pub fn fragment(&self) -> String {
        lock(&self.inner.fragment).clone()
    }

    /// Replace the fragment and notify subscribers if it changed.
    pub fn set_fragment(&self, fragment: impl Into<String>) {
        let fragment = fragment.into();
        {
            let mut current = lock(&self.inner.fragment);
            if *current == fragment {
                return;
            }
            *current = fragment.clone();
        }

        let id = parse_fragment(&fragment);
        let callbacks: Vec<SharedCallback> =
            lock(&self.inner.subscribers).values().cloned().collect();
        trace!(
            fragment = %fragment,
            subscribers = callbacks.len(),
            "Fragment changed"
        );
        for callback in callbacks {
            callback(id);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner.subscribers).len()
    }
}

impl SelectionSignal for FragmentSignal {
    fn read(&self) -> Option<JobId> {
        parse_fragment(&self.fragment())
    }

    fn subscribe(&self, callback: SelectionCallback) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.inner.subscribers).insert(id, Arc::from(callback));

        let inner: Weak<FragmentInner> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                lock(&inner.subscribers).remove(&id);
            }
        })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

// =============================================================================
// ACTIVE DETAIL
// =============================================================================

/// Detail record for the active id.
#[derive(Debug, Clone, Default)]
pub struct ActiveJob {
    pub item: Option<Arc<JobItemExpanded>>,
    pub is_loading: bool,
}

/// Tracks the selected id and resolves it through the cache.
pub struct ActiveDetailState {
    cache: JobCache,
    active_id: Arc<Mutex<Option<JobId>>>,
    _subscription: Subscription,
}

impl ActiveDetailState {
    /// Read the signal's current id and follow its change events until dropped.
    pub fn new(cache: JobCache, signal: &dyn SelectionSignal) -> Self {
        let active_id = Arc::new(Mutex::new(signal.read()));

        let tracked = Arc::clone(&active_id);
        let subscription = signal.subscribe(Box::new(move |id| {
            debug!(
                subsystem = "state",
                component = "active_detail",
                job_id = ?id,
                "Active id changed"
            );
            *lock(&tracked) = id;
        }));

        Self {
            cache,
            active_id,
            _subscription: subscription,
        }
    }

    pub fn active_id(&self) -> Option<JobId> {
        *lock(&self.active_id)
    }

    /// Fetch the active id's detail record. No id means no fetch.
    ///
    /// A failed fetch yields no record; the failure itself has already gone
    /// to the cache's error handler.
    pub async fn resolve(&self) -> ActiveJob {
        let Some(id) = self.active_id() else {
            return ActiveJob::default();
        };
        let entry = self.cache.job_item(id).await;
        ActiveJob {
            item: entry.ready_value(),
            is_loading: entry.is_fetching(),
        }
    }

    /// Current resolution from the cache without triggering a load.
    pub fn snapshot(&self) -> ActiveJob {
        let Some(id) = self.active_id() else {
            return ActiveJob::default();
        };
        let entry = self.cache.peek_job_item(id);
        ActiveJob {
            item: entry.ready_value(),
            is_loading: entry.is_fetching(),
        }
    }
}
