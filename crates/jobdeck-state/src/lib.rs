//! # jobdeck-state
//!
//! Reactive client-side data layer for jobdeck.
//!
//! This crate provides:
//! - A keyed record cache with single-flight loads and a staleness window
//! - Debounced search text
//! - Sorted, paginated listing of search results
//! - Persisted bookmarks resolved through the shared cache
//! - The active job detail, driven by a URL-fragment style selection signal
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use jobdeck_client::HttpJobApi;
//! use jobdeck_state::{BoardConfig, FileStore, FragmentSignal, JobBoard, LogErrorHandler};
//!
//! let board = JobBoard::builder()
//!     .api(HttpJobApi::from_env()?)
//!     .error_handler(LogErrorHandler)
//!     .store(FileStore::open("./state")?)
//!     .signal(FragmentSignal::new("#123"))
//!     .config(BoardConfig::from_env())
//!     .build()?;
//!
//! let search = board.create_search_state();
//! let listing = Arc::new(board.create_listing_state(""));
//! let _pipeline = board.spawn_search_pipeline(&search, Arc::clone(&listing));
//!
//! search.set_search_text("rust");
//! ```

pub mod active;
pub mod board;
pub mod bookmarks;
pub mod cache;
pub mod config;
pub mod debounce;
pub mod listing;
pub mod persist;
pub mod search;

pub use active::{parse_fragment, ActiveDetailState, ActiveJob, FragmentSignal};
pub use board::{JobBoard, JobBoardBuilder, PipelineHandle};
pub use bookmarks::{dedup_ids, toggle_id, BookmarkState, ResolvedJobs};
pub use cache::{CacheEntry, EntryState, JobCache, JobCacheBuilder, RecordCache};
pub use config::BoardConfig;
pub use debounce::Debouncer;
pub use listing::{page_window, sort_job_items, total_pages, ListingState, ListingView};
pub use persist::{FileStore, MemoryStore, PersistedValue};
pub use search::SearchState;

// Re-export core types for convenience
pub use jobdeck_core::*;
