//! Debounced value propagation.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::trace;

use jobdeck_core::defaults;

/// Propagates an input value to its output only after `delay` passes with
/// no further input.
///
/// Each [`Debouncer::set`] cancels the pending timer and schedules a new one,
/// so only the latest value within a quiescent window is ever published.
/// Dropping the debouncer cancels any pending timer. Must be used inside a
/// tokio runtime.
pub struct Debouncer<T> {
    delay: Duration,
    output: Arc<watch::Sender<T>>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<T> Debouncer<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn new(initial: T, delay: Duration) -> Self {
        let (output, _) = watch::channel(initial);
        Self {
            delay,
            output: Arc::new(output),
            pending: Mutex::new(None),
        }
    }

    /// Debouncer with the stock quiescence window (`defaults::DEBOUNCE_MS`).
    pub fn with_default_delay(initial: T) -> Self {
        Self::new(initial, Duration::from_millis(defaults::DEBOUNCE_MS))
    }

    /// Feed a new input value.
    pub fn set(&self, value: T) {
        let mut pending = self.lock_pending();
        if let Some(handle) = pending.take() {
            handle.abort();
        }

        let output = Arc::clone(&self.output);
        let delay = self.delay;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            trace!(delay_ms = delay.as_millis() as u64, "Debounce window elapsed");
            output.send_if_modified(|current| {
                if *current == value {
                    false
                } else {
                    *current = value;
                    true
                }
            });
        }));
    }

    /// Current debounced value.
    pub fn get(&self) -> T {
        self.output.borrow().clone()
    }

    /// Receiver notified each time the debounced value changes.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.output.subscribe()
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Whether a timer is scheduled and has not fired yet.
    pub fn is_pending(&self) -> bool {
        self.lock_pending()
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    fn lock_pending(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        let pending = self.pending.get_mut().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = pending.take() {
            handle.abort();
        }
    }
}
