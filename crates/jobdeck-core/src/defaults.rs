//! Centralized default constants for jobdeck.
//!
//! All crates reference these constants instead of defining their own
//! magic numbers. Organized by domain area.

// =============================================================================
// REMOTE API
// =============================================================================

/// Default base URL of the remote job listing API.
pub const API_BASE_URL: &str = "https://bytegrad.com/course-assets/projects/rmtdev/api/data";

/// Timeout for a single HTTP request (seconds).
pub const HTTP_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// CACHE
// =============================================================================

/// Window after which a cached entry is eligible for refetch (seconds).
pub const STALE_TIME_SECS: u64 = 60 * 60;

/// Key prefix for list (search) entries.
pub const SEARCH_KEY_PREFIX: &str = "job-items";

/// Key prefix for detail entries.
pub const ITEM_KEY_PREFIX: &str = "job-item";

// =============================================================================
// INPUT
// =============================================================================

/// Quiescence window for the generic debouncer (milliseconds).
pub const DEBOUNCE_MS: u64 = 500;

/// Quiescence window applied to search text (milliseconds).
pub const SEARCH_DEBOUNCE_MS: u64 = 250;

// =============================================================================
// PAGINATION
// =============================================================================

/// Number of results shown per page.
pub const RESULTS_PER_PAGE: usize = 7;

// =============================================================================
// PERSISTENCE
// =============================================================================

/// Storage key for the bookmarked id set.
pub const BOOKMARKS_KEY: &str = "bookmarkedIds";
