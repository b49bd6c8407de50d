//! Bookmark state: a persisted id set resolved into detail records.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info};

use jobdeck_core::{JobId, JobItemExpanded, KeyValueStore, Result};

use crate::cache::{CacheEntry, EntryState, JobCache};
use crate::persist::PersistedValue;

/// Detail records resolved from a set of ids.
#[derive(Debug, Clone, Default)]
pub struct ResolvedJobs {
    /// Records that resolved to Ready, in id order. Failed ids are omitted.
    pub items: Vec<Arc<JobItemExpanded>>,
    /// True while any id is still loading.
    pub is_loading: bool,
}

impl ResolvedJobs {
    fn from_entries(entries: &[CacheEntry<JobItemExpanded>]) -> Self {
        Self {
            items: entries.iter().filter_map(|e| e.ready_value()).collect(),
            is_loading: entries.iter().any(|e| e.state == EntryState::Fetching),
        }
    }

    pub fn ids(&self) -> Vec<JobId> {
        self.items.iter().map(|i| i.id).collect()
    }
}

/// Return `ids` with `id` removed if present, otherwise appended.
///
/// Removal filters rather than deleting by position, so the remaining order
/// is preserved.
pub fn toggle_id(ids: &[JobId], id: JobId) -> Vec<JobId> {
    if ids.contains(&id) {
        ids.iter().copied().filter(|&existing| existing != id).collect()
    } else {
        let mut next = ids.to_vec();
        next.push(id);
        next
    }
}

/// Drop repeated ids, keeping the first occurrence of each.
pub fn dedup_ids(ids: Vec<JobId>) -> Vec<JobId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

/// Owns the durable bookmark set.
pub struct BookmarkState {
    cache: JobCache,
    ids: PersistedValue<Vec<JobId>>,
}

impl BookmarkState {
    /// Load the bookmark set from `store` (empty if absent or unreadable).
    /// Repeated ids in the stored value collapse to their first occurrence.
    pub fn new(cache: JobCache, store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let ids = PersistedValue::load_normalized(store, key, Vec::new(), dedup_ids);
        debug!(
            subsystem = "state",
            component = "bookmarks",
            result_count = ids.get().len(),
            "Loaded bookmarks"
        );
        Self { cache, ids }
    }

    /// Add `id` if absent, remove it if present. Durable before returning.
    pub fn toggle(&self, id: JobId) -> Result<()> {
        let next = self.ids.update(|ids| toggle_id(ids, id))?;
        info!(
            subsystem = "state",
            component = "bookmarks",
            op = "toggle",
            job_id = id,
            bookmarked = next.contains(&id),
            "Bookmark toggled"
        );
        Ok(())
    }

    pub fn is_bookmarked(&self, id: JobId) -> bool {
        self.ids.get().contains(&id)
    }

    pub fn bookmarked_ids(&self) -> Vec<JobId> {
        self.ids.get()
    }

    /// Fetch every bookmarked id through the cache and collect the results.
    pub async fn resolve(&self) -> ResolvedJobs {
        let entries = join_all(
            self.ids
                .get()
                .into_iter()
                .filter(|&id| id != 0)
                .map(|id| self.cache.job_item(id)),
        )
        .await;
        ResolvedJobs::from_entries(&entries)
    }

    /// Current resolution from the cache without triggering loads.
    pub fn snapshot(&self) -> ResolvedJobs {
        let entries: Vec<_> = self
            .ids
            .get()
            .into_iter()
            .map(|id| self.cache.peek_job_item(id))
            .collect();
        ResolvedJobs::from_entries(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::MemoryStore;
    use jobdeck_core::mock::{job_expanded, MockCall, MockJobApi};
    use jobdeck_core::{CollectingErrorHandler, FetchError};

    fn cache_for(api: MockJobApi, handler: &CollectingErrorHandler) -> JobCache {
        JobCache::builder()
            .api(api)
            .error_handler(handler.clone())
            .build()
            .unwrap()
    }

    #[test]
    fn test_toggle_id_appends_then_removes() {
        let ids = toggle_id(&[], 4);
        assert_eq!(ids, vec![4]);
        assert!(toggle_id(&ids, 4).is_empty());
    }

    #[test]
    fn test_toggle_id_removal_preserves_order() {
        assert_eq!(toggle_id(&[1, 2, 3, 4], 2), vec![1, 3, 4]);
    }

    #[test]
    fn test_toggle_twice_is_identity() {
        let sets: [&[JobId]; 4] = [&[], &[1], &[5, 1, 9], &[9, 8, 7, 6, 5]];
        for set in sets {
            for id in [1, 7, 42] {
                assert_eq!(toggle_id(&toggle_id(set, id), id), set.to_vec());
            }
        }
    }

    #[tokio::test]
    async fn test_toggle_persists_across_reload() {
        let handler = CollectingErrorHandler::new();
        let store = MemoryStore::new();
        let cache = cache_for(MockJobApi::new(), &handler);

        {
            let bookmarks =
                BookmarkState::new(cache.clone(), Arc::new(store.clone()), "bookmarkedIds");
            bookmarks.toggle(3).unwrap();
            bookmarks.toggle(8).unwrap();
            bookmarks.toggle(3).unwrap();
        }

        let reloaded = BookmarkState::new(cache, Arc::new(store), "bookmarkedIds");
        assert_eq!(reloaded.bookmarked_ids(), vec![8]);
        assert!(reloaded.is_bookmarked(8));
        assert!(!reloaded.is_bookmarked(3));
    }

    #[tokio::test]
    async fn test_resolve_drops_failed_ids_silently() {
        let handler = CollectingErrorHandler::new();
        let api = MockJobApi::new()
            .with_item(job_expanded(1))
            .with_item_error(2, FetchError::Network("refused".into()))
            .with_item(job_expanded(3));
        let bookmarks = BookmarkState::new(
            cache_for(api, &handler),
            Arc::new(MemoryStore::new()),
            "bookmarkedIds",
        );
        for id in [3, 2, 1] {
            bookmarks.toggle(id).unwrap();
        }

        let resolved = bookmarks.resolve().await;

        assert_eq!(resolved.ids(), vec![3, 1]);
        assert!(!resolved.is_loading);
        assert_eq!(handler.len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_uses_cache_for_repeat_calls() {
        let handler = CollectingErrorHandler::new();
        let api = MockJobApi::new().with_item(job_expanded(5));
        let bookmarks = BookmarkState::new(
            cache_for(api.clone(), &handler),
            Arc::new(MemoryStore::new()),
            "bookmarkedIds",
        );
        bookmarks.toggle(5).unwrap();

        bookmarks.resolve().await;
        bookmarks.resolve().await;

        assert_eq!(api.call_count(&MockCall::JobItem(5)), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_reports_loading_while_fetching() {
        let handler = CollectingErrorHandler::new();
        let api = MockJobApi::new()
            .with_item(job_expanded(1))
            .with_latency_ms(50);
        let bookmarks = Arc::new(BookmarkState::new(
            cache_for(api, &handler),
            Arc::new(MemoryStore::new()),
            "bookmarkedIds",
        ));
        bookmarks.toggle(1).unwrap();

        assert!(!bookmarks.snapshot().is_loading);

        let task = {
            let bookmarks = Arc::clone(&bookmarks);
            tokio::spawn(async move { bookmarks.resolve().await })
        };
        tokio::task::yield_now().await;
        assert!(bookmarks.snapshot().is_loading);

        let resolved = task.await.unwrap();
        assert_eq!(resolved.ids(), vec![1]);
        assert_eq!(bookmarks.snapshot().ids(), vec![1]);
    }

    #[test]
    fn test_dedup_ids_keeps_first_occurrence() {
        assert_eq!(dedup_ids(vec![5, 3, 5, 9, 3]), vec![5, 3, 9]);
        assert!(dedup_ids(Vec::new()).is_empty());
    }

    #[tokio::test]
    async fn test_stored_duplicates_collapse_on_load() {
        let handler = CollectingErrorHandler::new();
        let store = MemoryStore::new();
        store.set("bookmarkedIds", "[5,5,3,5]").unwrap();
        let api = MockJobApi::new()
            .with_item(job_expanded(5))
            .with_item(job_expanded(3));

        let bookmarks = BookmarkState::new(
            cache_for(api.clone(), &handler),
            Arc::new(store.clone()),
            "bookmarkedIds",
        );
        assert_eq!(bookmarks.bookmarked_ids(), vec![5, 3]);

        let resolved = bookmarks.resolve().await;
        assert_eq!(resolved.ids(), vec![5, 3]);
        assert_eq!(api.call_count(&MockCall::JobItem(5)), 1);

        bookmarks.toggle(5).unwrap();
        assert_eq!(store.get("bookmarkedIds").unwrap().as_deref(), Some("[3]"));
    }

    #[tokio::test]
    async fn test_unreadable_stored_set_starts_empty() {
        let handler = CollectingErrorHandler::new();
        let store = MemoryStore::new();
        store.set("bookmarkedIds", "not-json").unwrap();

        let bookmarks = BookmarkState::new(
            cache_for(MockJobApi::new(), &handler),
            Arc::new(store.clone()),
            "bookmarkedIds",
        );

        assert!(bookmarks.bookmarked_ids().is_empty());
        assert_eq!(
            store.get("bookmarkedIds").unwrap().as_deref(),
            Some("not-json")
        );
    }
}
