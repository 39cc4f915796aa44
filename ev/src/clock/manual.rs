//! Simulated clock advanced by hand

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use super::{Clock, TimerCallback, TimerHandle};

struct PendingTimer {
    callback: TimerCallback,
    cancelled: Arc<AtomicBool>,
}

#[derive(Default)]
struct ManualInner {
    now: Duration,
    seq: u64,
    /// Keyed by (deadline, registration order) so ties fire FIFO
    timers: BTreeMap<(Duration, u64), PendingTimer>,
}

/// Deterministic clock for tests and headless runs
///
/// Time only moves inside [`ManualClock::advance`]. Due timers fire in
/// deadline order with `now()` set to their deadline; timers registered by a
/// callback fire in the same advance if they fall due before the target.
#[derive(Default)]
pub struct ManualClock {
    inner: Mutex<ManualInner>,
}

impl ManualClock {
    /// Create a clock reading zero with no timers
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward by `by`, firing every timer that falls due
    ///
    /// Returns the number of callbacks fired.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.inner.lock().now + by;
        self.advance_to(target)
    }

    /// Move time forward to `target` (no-op if already past it)
    pub fn advance_to(&self, target: Duration) -> usize {
        debug!(?target, "ManualClock::advance_to: called");
        let mut fired = 0;
        loop {
            // The lock is released before the callback runs so it can re-arm.
            let due = {
                let mut inner = self.inner.lock();
                let next_key = inner
                    .timers
                    .first_key_value()
                    .map(|(key, _)| *key)
                    .filter(|(deadline, _)| *deadline <= target);
                match next_key {
                    Some(key) => {
                        inner.now = inner.now.max(key.0);
                        inner.timers.remove(&key)
                    }
                    None => {
                        inner.now = inner.now.max(target);
                        None
                    }
                }
            };

            match due {
                Some(timer) => {
                    if !timer.cancelled.load(Ordering::Acquire) {
                        (timer.callback)();
                        fired += 1;
                    }
                }
                None => break,
            }
        }
        debug!(fired, "ManualClock::advance_to: done");
        fired
    }

    /// Number of registered timers that have not been cancelled
    pub fn pending(&self) -> usize {
        self.inner
            .lock()
            .timers
            .values()
            .filter(|t| !t.cancelled.load(Ordering::Acquire))
            .count()
    }

    /// Deadline of the earliest live timer
    pub fn next_deadline(&self) -> Option<Duration> {
        self.inner
            .lock()
            .timers
            .iter()
            .find(|(_, t)| !t.cancelled.load(Ordering::Acquire))
            .map(|((deadline, _), _)| *deadline)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.inner.lock().now
    }

    fn after(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        let mut inner = self.inner.lock();
        let deadline = inner.now + delay;
        let seq = inner.seq;
        inner.seq += 1;
        inner.timers.insert(
            (deadline, seq),
            PendingTimer {
                callback,
                cancelled: cancelled.clone(),
            },
        );
        TimerHandle::new(cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn recorder() -> (Arc<Mutex<Vec<&'static str>>>, impl Fn(&'static str) -> TimerCallback) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        let make = move |name: &'static str| -> TimerCallback {
            let sink = sink.clone();
            Box::new(move || sink.lock().push(name))
        };
        (log, make)
    }

    #[test]
    fn test_starts_at_zero() {
        let clock = ManualClock::new();
        assert_eq!(clock.now(), Duration::ZERO);
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn test_fires_in_deadline_order() {
        let clock = ManualClock::new();
        let (log, cb) = recorder();

        clock.after(ms(30), cb("c"));
        clock.after(ms(10), cb("a"));
        clock.after(ms(20), cb("b"));

        assert_eq!(clock.advance(ms(100)), 3);
        assert_eq!(*log.lock(), vec!["a", "b", "c"]);
        assert_eq!(clock.now(), ms(100));
    }

    #[test]
    fn test_ties_fire_in_registration_order() {
        let clock = ManualClock::new();
        let (log, cb) = recorder();

        clock.after(ms(10), cb("first"));
        clock.after(ms(10), cb("second"));

        clock.advance(ms(10));
        assert_eq!(*log.lock(), vec!["first", "second"]);
    }

    #[test]
    fn test_does_not_fire_early() {
        let clock = ManualClock::new();
        let (log, cb) = recorder();

        clock.after(ms(50), cb("late"));
        assert_eq!(clock.advance(ms(49)), 0);
        assert!(log.lock().is_empty());
        assert_eq!(clock.next_deadline(), Some(ms(50)));

        assert_eq!(clock.advance(ms(1)), 1);
        assert_eq!(*log.lock(), vec!["late"]);
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let clock = ManualClock::new();
        let (log, cb) = recorder();

        let handle = clock.after(ms(10), cb("cancelled"));
        clock.after(ms(20), cb("kept"));
        handle.cancel();
        assert_eq!(clock.pending(), 1);

        clock.advance(ms(50));
        assert_eq!(*log.lock(), vec!["kept"]);
    }

    #[test]
    fn test_callback_sees_its_deadline() {
        let clock = Arc::new(ManualClock::new());
        let seen = Arc::new(Mutex::new(None));

        let c = clock.clone();
        let s = seen.clone();
        clock.after(ms(25), Box::new(move || *s.lock() = Some(c.now())));

        clock.advance(ms(100));
        assert_eq!(*seen.lock(), Some(ms(25)));
    }

    #[test]
    fn test_rearming_callback_fires_within_same_advance() {
        let clock = Arc::new(ManualClock::new());
        let count = Arc::new(Mutex::new(0u32));

        fn arm(clock: Arc<ManualClock>, count: Arc<Mutex<u32>>) {
            let c = clock.clone();
            clock.after(
                Duration::from_millis(10),
                Box::new(move || {
                    *count.lock() += 1;
                    arm(c, count);
                }),
            );
        }

        arm(clock.clone(), count.clone());
        clock.advance(ms(55));

        // fires at 10, 20, 30, 40, 50; the 60ms timer stays pending
        assert_eq!(*count.lock(), 5);
        assert_eq!(clock.next_deadline(), Some(ms(60)));
    }
}
