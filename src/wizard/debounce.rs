//! Trailing-edge debounce driven by an externally supplied clock.

use std::time::{Duration, Instant};

pub const DEFAULT_WINDOW: Duration = Duration::from_millis(1000);

/// Holds the latest scheduled value until the window has passed without a
/// newer one arriving.
#[derive(Debug)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn set_window(&mut self, window: Duration) {
        self.window = window;
    }

    /// Replaces any pending value and restarts the window at `now`.
    pub fn schedule(&mut self, now: Instant, value: T) {
        self.pending = Some((now + self.window, value));
    }

    /// Releases the pending value once its deadline has been reached.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((deadline, _)) if now >= *deadline => self.pending.take().map(|(_, v)| v),
            _ => None,
        }
    }

    /// Drops the pending value, if any. Returns whether one was dropped.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}
