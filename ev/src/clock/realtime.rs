//! Wall-clock timers backed by the tokio runtime

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::Instant;
use tracing::debug;

use super::{Clock, TimerCallback, TimerHandle};

/// Clock driven by `tokio::time`
///
/// Honors `tokio::time::pause()`, so tests can auto-advance it.
pub struct TokioClock {
    origin: Instant,
    runtime: Handle,
}

impl TokioClock {
    /// Create a clock whose origin is now
    ///
    /// Panics if called outside a tokio runtime.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            runtime: Handle::current(),
        }
    }
}

impl Clock for TokioClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn after(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        debug!(?delay, "TokioClock::after: called");
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();
        let task = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if !flag.load(Ordering::Acquire) {
                callback();
            }
        });
        TimerHandle::with_abort(cancelled, task.abort_handle())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[tokio::test(start_paused = true)]
    async fn test_now_tracks_tokio_time() {
        let clock = TokioClock::new();
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(clock.now() >= Duration::from_millis(250));
        assert!(clock.now() < Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_after_fires_once_due() {
        let clock = TokioClock::new();
        let fired = Arc::new(Mutex::new(Vec::new()));

        let f = fired.clone();
        clock.after(Duration::from_millis(40), Box::new(move || f.lock().push("tick")));

        tokio::time::sleep(Duration::from_millis(39)).await;
        assert!(fired.lock().is_empty());

        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(*fired.lock(), vec!["tick"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_fire() {
        let clock = TokioClock::new();
        let fired = Arc::new(Mutex::new(false));

        let f = fired.clone();
        let handle = clock.after(Duration::from_millis(10), Box::new(move || *f.lock() = true));
        handle.cancel();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!*fired.lock());
        assert!(handle.is_cancelled());
    }
}
