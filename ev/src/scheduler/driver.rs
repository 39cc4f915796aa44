//! Timer-driven driver for the event loop

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::clock::{Clock, TimerHandle};
use crate::domain::{Example, QueueItem};
use crate::events::{EventBus, TimelineEntry};

use super::config::SchedulerConfig;
use super::engine::{EventLoop, Snapshot};

/// Ready delay applied to `add_macrotask` until changed
pub const DEFAULT_MACRO_DELAY: Duration = Duration::from_millis(50);

struct DriverState {
    machine: EventLoop,
    timer: Option<TimerHandle>,
    /// Bumped on every arm and stop; a callback from an older arm is stale
    generation: u64,
    running: bool,
    macro_delay: Duration,
}

struct Shared {
    clock: Arc<dyn Clock>,
    bus: Option<Arc<EventBus>>,
    state: Mutex<DriverState>,
}

impl Shared {
    /// Arm the next step; the callback only holds a weak reference
    fn arm(self: &Arc<Self>, state: &mut DriverState, delay: Duration) {
        state.generation += 1;
        let generation = state.generation;
        let weak: Weak<Shared> = Arc::downgrade(self);
        let handle = self.clock.after(
            delay,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.fire(generation);
                }
            }),
        );
        if let Some(previous) = state.timer.replace(handle) {
            previous.cancel();
        }
    }

    fn fire(self: &Arc<Self>, generation: u64) {
        let emitted = {
            let mut state = self.state.lock();
            if !state.running || state.generation != generation {
                debug!(generation, current = state.generation, "Shared::fire: stale timer, skipping");
                return;
            }
            // The stored handle is the one running now
            state.timer = None;
            let now = self.clock.now();
            let delay = state.machine.step(now);
            self.arm(&mut state, delay);
            state.machine.take_emitted()
        };
        self.publish(emitted);
    }

    fn publish(&self, entries: Vec<TimelineEntry>) {
        if let Some(bus) = &self.bus {
            for entry in entries {
                bus.emit(entry);
            }
        }
    }
}

/// Event loop bound to a clock
///
/// All mutation goes through one mutex shared by timer callbacks and user
/// commands. Dropping the loop stops it.
pub struct SchedulerLoop {
    shared: Arc<Shared>,
}

impl SchedulerLoop {
    pub fn new(config: SchedulerConfig, clock: Arc<dyn Clock>) -> Self {
        Self::build(config, clock, None)
    }

    /// Publish every timeline entry on `bus` as well as into the log
    pub fn with_event_bus(config: SchedulerConfig, clock: Arc<dyn Clock>, bus: Arc<EventBus>) -> Self {
        Self::build(config, clock, Some(bus))
    }

    fn build(config: SchedulerConfig, clock: Arc<dyn Clock>, bus: Option<Arc<EventBus>>) -> Self {
        debug!(has_bus = bus.is_some(), "SchedulerLoop::new: called");
        Self {
            shared: Arc::new(Shared {
                clock,
                bus,
                state: Mutex::new(DriverState {
                    machine: EventLoop::new(config),
                    timer: None,
                    generation: 0,
                    running: false,
                    macro_delay: DEFAULT_MACRO_DELAY,
                }),
            }),
        }
    }

    /// Begin ticking after the configured startup delay; no-op if running
    pub fn start(&self) {
        let mut state = self.shared.state.lock();
        if state.running {
            debug!("SchedulerLoop::start: already running");
            return;
        }
        info!("SchedulerLoop::start: starting event loop");
        state.running = true;
        let delay = state.machine.config().startup_delay();
        self.shared.arm(&mut state, delay);
    }

    /// Cancel the pending step; nothing runs until `start` is called again
    pub fn stop(&self) {
        let mut state = self.shared.state.lock();
        if let Some(timer) = state.timer.take() {
            timer.cancel();
        }
        state.generation += 1;
        if state.running {
            info!("SchedulerLoop::stop: event loop stopped");
        }
        state.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.shared.state.lock().running
    }

    pub fn now(&self) -> Duration {
        self.shared.clock.now()
    }

    /// Run `f` against the machine under the lock, then publish what it logged
    fn mutate<T>(&self, f: impl FnOnce(&mut DriverState, Duration) -> T) -> T {
        let (out, emitted) = {
            let mut state = self.shared.state.lock();
            let now = self.shared.clock.now();
            let out = f(&mut *state, now);
            (out, state.machine.take_emitted())
        };
        self.shared.publish(emitted);
        out
    }

    /// Enqueue a macrotask with the current ready delay
    pub fn add_macrotask(&self) -> QueueItem {
        self.mutate(|state, now| {
            let delay = state.macro_delay;
            state.machine.add_macrotask(delay, now)
        })
    }

    pub fn add_microtask(&self) -> QueueItem {
        self.mutate(|state, now| state.machine.add_microtask(now))
    }

    pub fn add_raf(&self) -> QueueItem {
        self.mutate(|state, now| state.machine.add_raf(now))
    }

    /// Schedule a scripted example using the current ready delay
    pub fn run_example(&self, example: Example) -> Vec<QueueItem> {
        self.mutate(|state, now| {
            let delay = state.macro_delay;
            state.machine.schedule_example(example, delay, now)
        })
    }

    /// Clear queues, call stack and log; a running loop keeps ticking
    pub fn reset(&self) {
        self.mutate(|state, now| state.machine.reset(now));
    }

    /// Any delay is accepted; callers that need a range clamp it themselves
    pub fn set_macro_delay(&self, delay: Duration) {
        debug!(?delay, "SchedulerLoop::set_macro_delay: called");
        self.shared.state.lock().macro_delay = delay;
    }

    pub fn macro_delay(&self) -> Duration {
        self.shared.state.lock().macro_delay
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = self.shared.state.lock();
        let mut snapshot = state.machine.snapshot(self.shared.clock.now());
        snapshot.macro_delay_ms = crate::clock::as_millis(state.macro_delay);
        snapshot.running = state.running;
        snapshot
    }
}

impl Drop for SchedulerLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
