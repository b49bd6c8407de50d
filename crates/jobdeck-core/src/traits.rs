//! Collaborator traits for the jobdeck data layer.
//!
//! Everything outside the core (remote API, durable storage, the selection
//! signal, the user-facing error sink) is reached through these traits, so
//! each state component receives its collaborators explicitly at
//! construction time.

use std::fmt;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::error;

use crate::error::{FetchError, Result};
use crate::models::{JobId, JobItem, JobItemExpanded};

// =============================================================================
// REMOTE API
// =============================================================================

/// Read-only access to the remote job listing API.
#[async_trait]
pub trait JobApi: Send + Sync {
    /// Fetch summary records matching a search phrase.
    async fn search(&self, text: &str) -> std::result::Result<Vec<JobItem>, FetchError>;

    /// Fetch the full record for one id.
    async fn job_item(&self, id: JobId) -> std::result::Result<JobItemExpanded, FetchError>;
}

// =============================================================================
// PERSISTENCE
// =============================================================================

/// Durable key-value store exchanging serialized text.
///
/// `set` must not return until the value is durable.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw stored text for `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Durably store `value` under `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

// =============================================================================
// SELECTION SIGNAL
// =============================================================================

/// Callback invoked with the new selected id on every change event.
pub type SelectionCallback = Box<dyn Fn(Option<JobId>) + Send + Sync>;

/// Global "selected id" signal sourced from outside the core.
pub trait SelectionSignal: Send + Sync {
    /// Current selected id.
    fn read(&self) -> Option<JobId>;

    /// Register for change events. Dropping the returned handle unsubscribes.
    fn subscribe(&self, callback: SelectionCallback) -> Subscription;
}

/// Handle returned by [`SelectionSignal::subscribe`].
///
/// Runs its unsubscribe action exactly once, either on [`Subscription::unsubscribe`]
/// or when dropped.
pub struct Subscription {
    on_drop: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Wrap an unsubscribe action.
    pub fn new(unsubscribe: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            on_drop: Some(Box::new(unsubscribe)),
        }
    }

    /// A subscription with nothing to release.
    pub fn noop() -> Self {
        Self { on_drop: None }
    }

    /// Unsubscribe now.
    pub fn unsubscribe(mut self) {
        if let Some(f) = self.on_drop.take() {
            f();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(f) = self.on_drop.take() {
            f();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.on_drop.is_some())
            .finish()
    }
}

// =============================================================================
// ERROR SINK
// =============================================================================

/// Receives each failed fetch attempt exactly once (e.g. a toast queue).
pub trait ErrorHandler: Send + Sync {
    fn handle(&self, key: &str, error: &FetchError);
}

/// Error handler that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogErrorHandler;

impl ErrorHandler for LogErrorHandler {
    fn handle(&self, key: &str, err: &FetchError) {
        error!(
            subsystem = "cache",
            cache_key = key,
            error_kind = err.kind(),
            error = %err,
            "Fetch failed"
        );
    }
}

/// Error handler that records every reported failure in order.
///
/// A presentation layer drains it to show messages; tests inspect it.
#[derive(Debug, Clone, Default)]
pub struct CollectingErrorHandler {
    errors: Arc<Mutex<Vec<(String, FetchError)>>>,
}

impl CollectingErrorHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of reported failures.
    pub fn errors(&self) -> Vec<(String, FetchError)> {
        self.errors.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Remove and return all reported failures.
    pub fn drain(&self) -> Vec<(String, FetchError)> {
        self.errors
            .lock()
            .map(|mut e| std::mem::take(&mut *e))
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.errors.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ErrorHandler for CollectingErrorHandler {
    fn handle(&self, key: &str, err: &FetchError) {
        LogErrorHandler.handle(key, err);
        if let Ok(mut errors) = self.errors.lock() {
            errors.push((key.to_string(), err.clone()));
        }
    }
}
