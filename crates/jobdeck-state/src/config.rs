//! Board configuration.

use std::time::Duration;

use tracing::debug;

use jobdeck_core::defaults;

/// Tuning for the state layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    /// Quiescence window applied to search text.
    pub debounce: Duration,
    /// Results shown per page.
    pub page_size: usize,
    /// Window after which a cached entry is refetched.
    pub stale_time: Duration,
    /// Persistence key of the bookmark set.
    pub bookmarks_key: String,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(defaults::SEARCH_DEBOUNCE_MS),
            page_size: defaults::RESULTS_PER_PAGE,
            stale_time: Duration::from_secs(defaults::STALE_TIME_SECS),
            bookmarks_key: defaults::BOOKMARKS_KEY.to_string(),
        }
    }
}

impl BoardConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `JOBDECK_DEBOUNCE_MS` | `250` | Search text debounce window |
    /// | `JOBDECK_PAGE_SIZE` | `7` | Results per page (min 1) |
    /// | `JOBDECK_STALE_SECS` | `3600` | Cache staleness window |
    /// | `JOBDECK_BOOKMARKS_KEY` | `bookmarkedIds` | Bookmark storage key |
    pub fn from_env() -> Self {
        let debounce_ms = std::env::var("JOBDECK_DEBOUNCE_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults::SEARCH_DEBOUNCE_MS);

        let page_size = std::env::var("JOBDECK_PAGE_SIZE")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(defaults::RESULTS_PER_PAGE)
            .max(1);

        let stale_secs = std::env::var("JOBDECK_STALE_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults::STALE_TIME_SECS);

        let bookmarks_key = std::env::var("JOBDECK_BOOKMARKS_KEY")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| defaults::BOOKMARKS_KEY.to_string());

        debug!(debounce_ms, page_size, stale_secs, bookmarks_key = %bookmarks_key, "Loaded board config from env");

        Self {
            debounce: Duration::from_millis(debounce_ms),
            page_size,
            stale_time: Duration::from_secs(stale_secs),
            bookmarks_key,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time;
        self
    }

    pub fn with_bookmarks_key(mut self, key: impl Into<String>) -> Self {
        self.bookmarks_key = key.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BoardConfig::default();
        assert_eq!(config.debounce, Duration::from_millis(250));
        assert_eq!(config.page_size, 7);
        assert_eq!(config.stale_time, Duration::from_secs(3600));
        assert_eq!(config.bookmarks_key, "bookmarkedIds");
    }

    #[test]
    fn test_page_size_has_floor_of_one() {
        let config = BoardConfig::default().with_page_size(0);
        assert_eq!(config.page_size, 1);
    }

    #[test]
    fn test_builder_setters() {
        let config = BoardConfig::default()
            .with_debounce(Duration::from_millis(10))
            .with_stale_time(Duration::from_secs(5))
            .with_bookmarks_key("saved");
        assert_eq!(config.debounce, Duration::from_millis(10));
        assert_eq!(config.stale_time, Duration::from_secs(5));
        assert_eq!(config.bookmarks_key, "saved");
    }
}
