//! Listing state: sorted, paginated view over the current query's results.
//!
//! Sorting and slicing are derived on every [`ListingState::view`] from the
//! cached result set; changing sort or page never refetches.

use std::ops::Range;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, trace};

use jobdeck_core::{JobItem, PageDirection, SortBy};

use crate::cache::{EntryState, JobCache};

/// Sort a result set; ties keep their fetch order.
pub fn sort_job_items(items: &[JobItem], sort_by: SortBy) -> Vec<JobItem> {
    let mut sorted = items.to_vec();
    match sort_by {
        SortBy::Relevant => {
            sorted.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score))
        }
        SortBy::Recent => sorted.sort_by(|a, b| a.days_ago.total_cmp(&b.days_ago)),
    }
    sorted
}

/// Index range of `page` (1-based) within `len` items.
///
/// Pages below 1 or past the end yield an empty range.
pub fn page_window(len: usize, page: i64, page_size: usize) -> Range<usize> {
    if page < 1 || page_size == 0 {
        return 0..0;
    }
    let start = ((page - 1) as usize).saturating_mul(page_size).min(len);
    let end = (page as usize).saturating_mul(page_size).min(len);
    start..end
}

/// Number of pages needed for `total` items.
pub fn total_pages(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        0
    } else {
        total.div_ceil(page_size)
    }
}

/// Derived page plus the fields a presentation layer renders around it.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingView {
    pub items: Vec<JobItem>,
    pub total_results: usize,
    pub total_pages: usize,
    pub current_page: i64,
    pub sort_by: SortBy,
    pub is_loading: bool,
}

struct ListingInner {
    query: String,
    sort_by: SortBy,
    current_page: i64,
    /// Last result set shown, kept while a new query loads.
    last_items: Option<Arc<Vec<JobItem>>>,
}

/// Owns the query/sort/page triple and derives the visible page.
pub struct ListingState {
    cache: JobCache,
    page_size: usize,
    inner: Mutex<ListingInner>,
}

impl ListingState {
    pub fn new(cache: JobCache, debounced_query: impl Into<String>, page_size: usize) -> Self {
        Self {
            cache,
            page_size,
            inner: Mutex::new(ListingInner {
                query: debounced_query.into(),
                sort_by: SortBy::default(),
                current_page: 1,
                last_items: None,
            }),
        }
    }

    /// Switch to a new debounced query. Sort mode and page are kept.
    pub fn set_query(&self, text: impl Into<String>) {
        let text = text.into();
        let mut inner = self.lock();
        if inner.query != text {
            debug!(subsystem = "state", component = "listing", query = %text, "Query changed");
            inner.query = text;
        }
    }

    pub fn query(&self) -> String {
        self.lock().query.clone()
    }

    /// Change sort mode; always returns to page 1.
    pub fn set_sort_by(&self, sort_by: SortBy) {
        let mut inner = self.lock();
        inner.current_page = 1;
        inner.sort_by = sort_by;
    }

    pub fn sort_by(&self) -> SortBy {
        self.lock().sort_by
    }

    /// Move one page forward or back. Not clamped to the valid range.
    pub fn change_page(&self, direction: PageDirection) {
        let mut inner = self.lock();
        match direction {
            PageDirection::Next => inner.current_page += 1,
            PageDirection::Previous => inner.current_page -= 1,
        }
        trace!(page = inner.current_page, "Page changed");
    }

    pub fn current_page(&self) -> i64 {
        self.lock().current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Load the current query through the cache.
    ///
    /// An empty query performs no fetch. A result that arrives after the
    /// query has moved on is left in the cache but not shown.
    pub async fn refresh(&self) {
        let query = self.query();
        if query.is_empty() {
            self.lock().last_items = None;
            return;
        }

        let entry = self.cache.search(&query).await;

        let mut inner = self.lock();
        if inner.query != query {
            debug!(
                subsystem = "state",
                component = "listing",
                query = %query,
                "Discarding result for superseded query"
            );
            return;
        }
        inner.last_items = entry.value;
        debug!(
            subsystem = "state",
            component = "listing",
            query = %query,
            state = ?entry.state,
            result_count = inner.last_items.as_ref().map(|i| i.len()).unwrap_or(0),
            "Listing refreshed"
        );
    }

    /// Full result set for the current query, in fetch order.
    pub fn job_items(&self) -> Option<Arc<Vec<JobItem>>> {
        let mut inner = self.lock();
        self.current_items(&mut inner).0
    }

    /// Derive the visible page from the cached result set.
    pub fn view(&self) -> ListingView {
        let mut inner = self.lock();
        let (items, is_loading) = self.current_items(&mut inner);
        let all = items.as_deref().map(Vec::as_slice).unwrap_or(&[]);

        let sorted = sort_job_items(all, inner.sort_by);
        let window = page_window(sorted.len(), inner.current_page, self.page_size);

        ListingView {
            items: sorted[window].to_vec(),
            total_results: all.len(),
            total_pages: total_pages(all.len(), self.page_size),
            current_page: inner.current_page,
            sort_by: inner.sort_by,
            is_loading,
        }
    }

    /// Result set to show for the current query, and whether it is loading.
    ///
    /// While the query's entry is idle or fetching without a value, the
    /// previously shown result set is returned instead of nothing.
    fn current_items(&self, inner: &mut ListingInner) -> (Option<Arc<Vec<JobItem>>>, bool) {
        if inner.query.is_empty() {
            return (None, false);
        }

        let entry = self.cache.peek_search(&inner.query);
        match entry.state {
            EntryState::Ready | EntryState::Failed => {
                inner.last_items = entry.value.clone();
                (entry.value, false)
            }
            EntryState::Fetching | EntryState::Idle => {
                let items = entry.value.or_else(|| inner.last_items.clone());
                (items, entry.state == EntryState::Fetching)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, ListingInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
