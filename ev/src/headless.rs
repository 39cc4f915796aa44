//! Headless runs of the event loop
//!
//! Schedules a fixed set of work, lets the loop run for a bounded time and
//! collects every timeline entry it published. Simulated runs use a
//! [`ManualClock`] and finish instantly; real-time runs use [`TokioClock`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::{Receiver, error::TryRecvError};
use tracing::{debug, info, warn};

use crate::clock::{ManualClock, TokioClock};
use crate::domain::Example;
use crate::events::{EventBus, TimelineEntry};
use crate::scheduler::{SchedulerConfig, SchedulerLoop, Snapshot};

/// Simulated time advanced between bus drains
const DRAIN_SLICE: Duration = Duration::from_millis(100);

/// Work to schedule before the loop starts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunPlan {
    /// Scripted examples, scheduled first and in order
    pub examples: Vec<Example>,
    pub macros: usize,
    pub micros: usize,
    pub rafs: usize,
    /// Macrotask ready delay; the scheduler default when unset
    pub delay: Option<Duration>,
    /// How long the loop runs after `start`
    pub duration: Duration,
}

impl RunPlan {
    /// Issue the plan against `scheduler`: examples, then macros, micros, rafs
    pub fn schedule(&self, scheduler: &SchedulerLoop) {
        debug!(?self, "RunPlan::schedule: called");
        if let Some(delay) = self.delay {
            scheduler.set_macro_delay(delay);
        }
        for example in &self.examples {
            scheduler.run_example(*example);
        }
        for _ in 0..self.macros {
            scheduler.add_macrotask();
        }
        for _ in 0..self.micros {
            scheduler.add_microtask();
        }
        for _ in 0..self.rafs {
            scheduler.add_raf();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty() && self.macros == 0 && self.micros == 0 && self.rafs == 0
    }
}

/// Result of a headless run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Every published entry, oldest first
    pub entries: Vec<TimelineEntry>,
    /// State when the loop was stopped
    pub snapshot: Snapshot,
    /// Entries lost because the bus overflowed
    pub missed: u64,
}

fn drain(rx: &mut Receiver<TimelineEntry>, entries: &mut Vec<TimelineEntry>) -> u64 {
    let mut missed = 0;
    loop {
        match rx.try_recv() {
            Ok(entry) => entries.push(entry),
            Err(TryRecvError::Lagged(n)) => {
                warn!(missed = n, "headless: lagged behind event bus");
                missed += n;
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }
    missed
}

/// Run `plan` on simulated time
pub fn run_simulated(config: SchedulerConfig, plan: &RunPlan, bus: Arc<EventBus>) -> RunOutcome {
    info!(duration = ?plan.duration, "run_simulated: starting");
    let clock = Arc::new(ManualClock::new());
    let mut rx = bus.subscribe();
    let scheduler = SchedulerLoop::with_event_bus(config, clock.clone(), bus);

    let mut entries = Vec::new();
    plan.schedule(&scheduler);
    scheduler.start();

    let mut missed = drain(&mut rx, &mut entries);
    let mut remaining = plan.duration;
    while !remaining.is_zero() {
        let slice = remaining.min(DRAIN_SLICE);
        clock.advance(slice);
        remaining -= slice;
        missed += drain(&mut rx, &mut entries);
    }

    scheduler.stop();
    let snapshot = scheduler.snapshot();
    info!(entries = entries.len(), "run_simulated: done");
    RunOutcome {
        entries,
        snapshot,
        missed,
    }
}

/// Run `plan` on wall-clock time; must be called inside a tokio runtime
pub async fn run_realtime(config: SchedulerConfig, plan: &RunPlan, bus: Arc<EventBus>) -> RunOutcome {
    info!(duration = ?plan.duration, "run_realtime: starting");
    let clock = Arc::new(TokioClock::new());
    let mut rx = bus.subscribe();
    let scheduler = SchedulerLoop::with_event_bus(config, clock, bus);

    plan.schedule(&scheduler);
    scheduler.start();
    tokio::time::sleep(plan.duration).await;
    scheduler.stop();

    let mut entries = Vec::new();
    let missed = drain(&mut rx, &mut entries);
    let snapshot = scheduler.snapshot();
    info!(entries = entries.len(), "run_realtime: done");
    RunOutcome {
        entries,
        snapshot,
        missed,
    }
}
