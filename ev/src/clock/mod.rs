//! Clock capability for the scheduler
//!
//! The scheduler never sleeps or spawns on its own. It reads the time with
//! [`Clock::now`] and asks for a callback with [`Clock::after`], so the same
//! ordering logic runs against real tokio timers ([`TokioClock`]) or against
//! a manually advanced simulated clock ([`ManualClock`]).

mod manual;
mod realtime;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::AbortHandle;

pub use manual::ManualClock;
pub use realtime::TokioClock;

/// Callback fired when a timer expires
pub type TimerCallback = Box<dyn FnOnce() + Send + 'static>;

/// Time source and timer factory
pub trait Clock: Send + Sync {
    /// Time elapsed since the clock's origin
    fn now(&self) -> Duration;

    /// Run `callback` once `delay` has elapsed, unless the handle is cancelled first
    fn after(&self, delay: Duration, callback: TimerCallback) -> TimerHandle;
}

/// Cancellation handle for a pending timer
///
/// Dropping the handle does not cancel the timer.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    cancelled: Arc<AtomicBool>,
    abort: Option<AbortHandle>,
}

impl TimerHandle {
    pub(crate) fn new(cancelled: Arc<AtomicBool>) -> Self {
        Self { cancelled, abort: None }
    }

    pub(crate) fn with_abort(cancelled: Arc<AtomicBool>, abort: AbortHandle) -> Self {
        Self {
            cancelled,
            abort: Some(abort),
        }
    }

    /// Cancel the timer; calling this more than once is harmless
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        if let Some(abort) = &self.abort {
            abort.abort();
        }
    }

    /// Whether `cancel` has been called
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Whole milliseconds of a duration, saturating
pub fn as_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
