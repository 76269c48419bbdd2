//! Delay/collapse utility.
//!
//! `Debouncer::call` (re)arms a timer; only the arguments of the last call
//! inside the quiet window ever reach the wrapped function, exactly once.
//! Dropping the debouncer aborts a pending timer, so an owner that is torn
//! down can never be called back.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

pub struct Debouncer<T> {
    delay: Duration,
    f: Arc<dyn Fn(T) + Send + Sync>,
    pending: Option<JoinHandle<()>>,
}

impl<T> std::fmt::Debug for Debouncer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("delay", &self.delay)
            .field("pending", &self.pending.is_some())
            .finish()
    }
}

impl<T: Send + 'static> Debouncer<T> {
    /// Must be used from inside a tokio runtime: every call spawns a timer task.
    pub fn new<F>(delay: Duration, f: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            delay,
            f: Arc::new(f),
            pending: None,
        }
    }

    /// Schedule `f(args)` after the quiet period, replacing any pending call.
    /// Never runs `f` synchronously, even with a zero delay.
    pub fn call(&mut self, args: T) {
        self.cancel();

        let f = Arc::clone(&self.f);
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            f(args);
        }));
    }

    /// Drop the pending call, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
