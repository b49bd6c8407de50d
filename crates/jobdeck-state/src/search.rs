//! Search text state: raw input plus its debounced form.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tracing::trace;

use crate::debounce::Debouncer;

/// Owns the raw search text and the debounced text that drives list fetches.
pub struct SearchState {
    search_text: Mutex<String>,
    debounced: Debouncer<String>,
}

impl SearchState {
    pub fn new(delay: Duration) -> Self {
        Self {
            search_text: Mutex::new(String::new()),
            debounced: Debouncer::new(String::new(), delay),
        }
    }

    /// Record new user input.
    pub fn set_search_text(&self, text: impl Into<String>) {
        let text = text.into();
        trace!(subsystem = "state", component = "search", query = %text, "Search text changed");
        *self.lock() = text.clone();
        self.debounced.set(text);
    }

    /// Raw text as last typed.
    pub fn search_text(&self) -> String {
        self.lock().clone()
    }

    /// Text after the quiescence window.
    pub fn debounced_search_text(&self) -> String {
        self.debounced.get()
    }

    /// Receiver notified on every debounced change.
    pub fn subscribe_debounced(&self) -> watch::Receiver<String> {
        self.debounced.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, String> {
        self.search_text.lock().unwrap_or_else(|e| e.into_inner())
    }
}
