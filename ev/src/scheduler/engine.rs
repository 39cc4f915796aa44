//! Event loop state machine
//!
//! One tick is: select at most one eligible macrotask and run it, then drain
//! every microtask that was queued when the drain began, then wait
//! `inter_tick` before the next tick. Each simulated execution spans a timed
//! step so the call stack is observable between begin and end.

use std::collections::VecDeque;
use std::time::Duration;

use tracing::{debug, info};

use crate::clock::as_millis;
use crate::domain::{Example, QueueItem, TaskKind};
use crate::events::{TimelineEntry, TimelineEvent};

use super::config::SchedulerConfig;
use super::queue::QueueModel;

/// Where the loop is within a tick
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    /// Between ticks; the next step selects a macrotask
    #[default]
    Idle,
    /// A macrotask is on the call stack; the next step ends it
    RunningMacro(QueueItem),
    /// `current` is on the call stack; `rest` are the remaining drain items
    Draining {
        current: QueueItem,
        rest: VecDeque<QueueItem>,
    },
}

/// Display form of [`Phase`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhaseKind {
    #[default]
    Idle,
    Macrotask,
    Draining,
}

impl Phase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            Self::Idle => PhaseKind::Idle,
            Self::RunningMacro(_) => PhaseKind::Macrotask,
            Self::Draining { .. } => PhaseKind::Draining,
        }
    }
}

impl std::fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Macrotask => write!(f, "macrotask"),
            Self::Draining => write!(f, "draining"),
        }
    }
}

/// Counters since the last reset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub ticks: u64,
    pub macrotasks_run: u64,
    pub microtasks_run: u64,
}

/// Pending macrotask as shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMacro {
    pub label: String,
    pub kind: TaskKind,
    pub delay_ms: u64,
    /// Time left before it may run
    pub remaining_ms: u64,
    pub eligible: bool,
}

/// Read-only view of the whole loop for rendering
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub now_ms: u64,
    pub phase: PhaseKind,
    pub microtasks: Vec<String>,
    pub macrotasks: Vec<PendingMacro>,
    /// Top of the stack first
    pub call_stack: Vec<String>,
    /// Oldest first
    pub log: Vec<TimelineEntry>,
    pub stats: LoopStats,
    pub macro_delay_ms: u64,
    pub running: bool,
}

/// The scheduling policy, independent of any timer mechanism
#[derive(Debug)]
pub struct EventLoop {
    config: SchedulerConfig,
    queues: QueueModel,
    phase: Phase,
    stats: LoopStats,
    /// Entries not yet handed to the driver for publishing
    outbox: Vec<TimelineEntry>,
}

impl EventLoop {
    pub fn new(config: SchedulerConfig) -> Self {
        debug!(?config, "EventLoop::new: called");
        Self {
            queues: QueueModel::new(config.log_capacity),
            config,
            phase: Phase::Idle,
            stats: LoopStats::default(),
            outbox: Vec::new(),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn queues(&self) -> &QueueModel {
        &self.queues
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    fn record(&mut self, now: Duration, event: TimelineEvent) {
        let entry = TimelineEntry::new(as_millis(now), event);
        self.queues.append_log(entry.clone());
        self.outbox.push(entry);
    }

    /// Entries recorded since the last call, oldest first
    pub fn take_emitted(&mut self) -> Vec<TimelineEntry> {
        std::mem::take(&mut self.outbox)
    }

    /// Enqueue one item of `kind`; `macro_delay` applies to `Macro` only
    pub fn enqueue(&mut self, kind: TaskKind, macro_delay: Duration, now: Duration) -> QueueItem {
        let item = match kind {
            TaskKind::Micro => self.queues.enqueue_micro(now),
            TaskKind::Macro => self.queues.enqueue_macro(kind, macro_delay, now),
            TaskKind::Raf => self.queues.enqueue_macro(kind, self.config.raf_delay(), now),
        };
        self.record(now, TimelineEvent::scheduled(&item));
        item
    }

    pub fn add_microtask(&mut self, now: Duration) -> QueueItem {
        self.enqueue(TaskKind::Micro, Duration::ZERO, now)
    }

    pub fn add_macrotask(&mut self, delay: Duration, now: Duration) -> QueueItem {
        self.enqueue(TaskKind::Macro, delay, now)
    }

    pub fn add_raf(&mut self, now: Duration) -> QueueItem {
        self.enqueue(TaskKind::Raf, Duration::ZERO, now)
    }

    /// Issue the example's primitives in order, then log its note
    pub fn schedule_example(&mut self, example: Example, macro_delay: Duration, now: Duration) -> Vec<QueueItem> {
        info!(%example, "EventLoop::schedule_example");
        let items = example
            .steps()
            .iter()
            .map(|kind| self.enqueue(*kind, macro_delay, now))
            .collect();
        self.record(now, TimelineEvent::ExampleScheduled { example });
        items
    }

    /// Clear all state; a tick in progress is abandoned
    ///
    /// The reset is published but not kept in the (now empty) log.
    pub fn reset(&mut self, now: Duration) {
        info!("EventLoop::reset: clearing queues, call stack and log");
        self.queues.reset();
        self.phase = Phase::Idle;
        self.stats = LoopStats::default();
        self.outbox.push(TimelineEntry::new(as_millis(now), TimelineEvent::Reset));
    }

    /// Perform one transition and return the delay before the next step
    pub fn step(&mut self, now: Duration) -> Duration {
        debug!(?now, phase = %self.phase.kind(), "EventLoop::step: called");
        let delay = match std::mem::take(&mut self.phase) {
            Phase::Idle => self.select_macro(now),
            Phase::RunningMacro(item) => {
                self.finish(&item, now);
                self.stats.macrotasks_run += 1;
                self.begin_drain(now)
            }
            Phase::Draining { current, rest } => {
                self.finish(&current, now);
                self.stats.microtasks_run += 1;
                self.continue_drain(rest, now)
            }
        };
        debug!(?delay, phase = %self.phase.kind(), "EventLoop::step: returning");
        delay
    }

    fn select_macro(&mut self, now: Duration) -> Duration {
        let selected = self
            .queues
            .find_next_eligible_macro(now)
            .and_then(|index| self.queues.take_macro(index));

        match selected {
            Some(item) => {
                debug!(label = %item.label, "EventLoop::select_macro: running macrotask");
                self.start(&item, now);
                self.phase = Phase::RunningMacro(item);
                self.config.macro_exec()
            }
            None => self.begin_drain(now),
        }
    }

    fn begin_drain(&mut self, now: Duration) -> Duration {
        let batch: VecDeque<QueueItem> = self.queues.drain_all_micro().into();
        if batch.is_empty() {
            return self.end_tick();
        }
        debug!(count = batch.len(), "EventLoop::begin_drain: draining microtasks");
        self.record(now, TimelineEvent::DrainStarted { count: batch.len() });
        self.continue_drain(batch, now)
    }

    fn continue_drain(&mut self, mut rest: VecDeque<QueueItem>, now: Duration) -> Duration {
        match rest.pop_front() {
            Some(current) => {
                self.start(&current, now);
                self.phase = Phase::Draining { current, rest };
                self.config.micro_exec()
            }
            None => {
                debug!("EventLoop::continue_drain: drain complete");
                self.end_tick()
            }
        }
    }

    fn end_tick(&mut self) -> Duration {
        self.stats.ticks += 1;
        debug!(ticks = self.stats.ticks, "EventLoop::end_tick: tick finished");
        self.phase = Phase::Idle;
        self.config.inter_tick()
    }

    fn start(&mut self, item: &QueueItem, now: Duration) {
        self.queues.push_frame(item.label.clone());
        self.record(now, TimelineEvent::started(item));
    }

    fn finish(&mut self, item: &QueueItem, now: Duration) {
        self.record(now, TimelineEvent::finished(item));
        self.queues.pop_frame();
    }

    /// Build a display snapshot at `now`
    pub fn snapshot(&self, now: Duration) -> Snapshot {
        Snapshot {
            now_ms: as_millis(now),
            phase: self.phase.kind(),
            microtasks: self.queues.microtasks().map(|i| i.label.clone()).collect(),
            macrotasks: self
                .queues
                .macrotasks()
                .map(|i| PendingMacro {
                    label: i.label.clone(),
                    kind: i.kind,
                    delay_ms: as_millis(i.ready_delay),
                    remaining_ms: as_millis(i.remaining(now)),
                    eligible: i.is_eligible(now),
                })
                .collect(),
            call_stack: self.queues.call_stack().iter().rev().cloned().collect(),
            log: self.queues.log().iter().cloned().collect(),
            stats: self.stats,
            macro_delay_ms: 0,
            running: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    /// Step the loop from `start` until `until`; returns the time reached
    fn run(el: &mut EventLoop, start: Duration, until: Duration) -> Duration {
        let mut now = start;
        while now < until {
            now += el.step(now);
        }
        now
    }

    fn lines(el: &EventLoop) -> Vec<String> {
        el.queues().log().iter().map(|e| e.event.to_string()).collect()
    }

    fn exec_lines(el: &EventLoop) -> Vec<String> {
        lines(el)
            .into_iter()
            .filter(|l| l.starts_with("Begin") || l.starts_with("End"))
            .collect()
    }

    #[test]
    fn test_idle_step_waits_inter_tick() {
        let mut el = EventLoop::new(SchedulerConfig::default());
        assert_eq!(el.step(ms(0)), ms(40));
        assert_eq!(el.stats().ticks, 1);
        assert!(el.queues().log().is_empty());
    }

    #[test]
    fn test_macro_then_micro_order() {
        let mut el = EventLoop::new(SchedulerConfig::default());
        el.add_macrotask(ms(50), ms(0));
        el.add_microtask(ms(0));

        // first tick at t=80 after the startup delay
        assert_eq!(el.step(ms(80)), ms(60));
        assert_eq!(el.phase().kind(), PhaseKind::Macrotask);
        assert_eq!(el.queues().call_stack(), &["MACRO #1".to_string()]);

        assert_eq!(el.step(ms(140)), ms(12));
        assert_eq!(el.phase().kind(), PhaseKind::Draining);
        assert_eq!(el.queues().call_stack(), &["MICRO #2".to_string()]);

        assert_eq!(el.step(ms(152)), ms(40));
        assert_eq!(el.phase().kind(), PhaseKind::Idle);
        assert!(el.queues().call_stack().is_empty());

        assert_eq!(
            exec_lines(&el),
            vec![
                "Begin macrotask MACRO #1",
                "End macrotask MACRO #1",
                "Begin microtask MICRO #2",
                "End microtask MICRO #2",
            ]
        );
        assert_eq!(
            el.stats(),
            LoopStats {
                ticks: 1,
                macrotasks_run: 1,
                microtasks_run: 1
            }
        );
    }

    #[test]
    fn test_micro_drains_before_ineligible_macro() {
        let mut el = EventLoop::new(SchedulerConfig::default());
        el.add_macrotask(ms(50), ms(0));
        el.add_microtask(ms(0));

        // at t=10 the macrotask is not yet eligible
        run(&mut el, ms(10), ms(200));
        assert_eq!(
            exec_lines(&el),
            vec![
                "Begin microtask MICRO #2",
                "End microtask MICRO #2",
                "Begin macrotask MACRO #1",
                "End macrotask MACRO #1",
            ]
        );
    }

    #[test]
    fn test_three_microtasks_single_drain() {
        let mut el = EventLoop::new(SchedulerConfig::default());
        el.schedule_example(Example::ThreeMicro, ms(50), ms(0));

        let mut now = ms(80);
        now += el.step(now);
        while el.phase().kind() == PhaseKind::Draining {
            now += el.step(now);
        }

        assert_eq!(el.stats().ticks, 1);
        assert_eq!(el.stats().microtasks_run, 3);
        assert_eq!(
            lines(&el)[3..].to_vec(),
            vec![
                "Example: 3 microtasks scheduled",
                "Draining 3 microtask(s)",
                "Begin microtask MICRO #1",
                "End microtask MICRO #1",
                "Begin microtask MICRO #2",
                "End microtask MICRO #2",
                "Begin microtask MICRO #3",
                "End microtask MICRO #3",
            ]
        );
        assert!(!lines(&el).iter().any(|l| l.contains("macrotask")));
    }

    #[test]
    fn test_one_macrotask_per_tick() {
        let mut el = EventLoop::new(SchedulerConfig::default());
        el.add_macrotask(ms(0), ms(0));
        el.add_macrotask(ms(0), ms(0));

        el.step(ms(0)); // begin #1
        assert_eq!(el.step(ms(60)), ms(40)); // end #1, nothing to drain, tick over
        assert_eq!(el.queues().macro_len(), 1);
        assert_eq!(el.stats().ticks, 1);

        el.step(ms(100)); // begin #2 in the next tick
        assert_eq!(el.queues().call_stack(), &["MACRO #2".to_string()]);
    }

    #[test]
    fn test_microtask_added_mid_drain_waits_for_next_tick() {
        let mut el = EventLoop::new(SchedulerConfig::default());
        el.add_microtask(ms(0));
        el.add_microtask(ms(0));

        el.step(ms(0)); // drain of 2 begins with MICRO #1
        el.add_microtask(ms(5));
        el.step(ms(12)); // MICRO #2
        assert_eq!(el.step(ms(24)), ms(40)); // drain done
        assert_eq!(el.queues().micro_len(), 1);
        assert_eq!(el.stats().ticks, 1);

        el.step(ms(64));
        assert_eq!(el.queues().call_stack(), &["MICRO #3".to_string()]);
    }

    #[test]
    fn test_raf_runs_as_macrotask() {
        let mut el = EventLoop::new(SchedulerConfig::default());
        let item = el.add_raf(ms(0));
        assert_eq!(item.label, "RAF #1");
        assert_eq!(el.queues().macro_len(), 1);

        run(&mut el, ms(0), ms(100));
        assert_eq!(exec_lines(&el), vec!["Begin macrotask RAF #1", "End macrotask RAF #1"]);
    }

    #[test]
    fn test_raf_uses_configured_delay() {
        let config = SchedulerConfig {
            raf_delay_ms: 16,
            ..Default::default()
        };
        let mut el = EventLoop::new(config);
        let item = el.add_raf(ms(0));
        assert_eq!(item.ready_delay, ms(16));
    }

    #[test]
    fn test_reset_mid_tick_abandons_it() {
        let mut el = EventLoop::new(SchedulerConfig::default());
        el.add_macrotask(ms(0), ms(0));
        el.step(ms(0));
        assert_eq!(el.phase().kind(), PhaseKind::Macrotask);

        el.reset(ms(30));
        assert_eq!(el.phase(), &Phase::Idle);
        assert!(el.queues().call_stack().is_empty());
        assert!(el.queues().log().is_empty());
        assert_eq!(el.stats(), LoopStats::default());

        // the abandoned macrotask never logs an end
        el.step(ms(60));
        assert!(el.queues().log().is_empty());
        assert_eq!(el.add_microtask(ms(61)).id.0, 1);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut el = EventLoop::new(SchedulerConfig::default());
        el.schedule_example(Example::MacroThenMicro, ms(50), ms(0));
        el.reset(ms(1));
        let once = el.snapshot(ms(1));
        el.reset(ms(1));
        let twice = el.snapshot(ms(1));
        assert_eq!(once, twice);
        assert!(once.log.is_empty());
    }

    #[test]
    fn test_emitted_includes_reset() {
        let mut el = EventLoop::new(SchedulerConfig::default());
        el.add_microtask(ms(0));
        el.reset(ms(3));
        let emitted = el.take_emitted();
        assert_eq!(emitted.len(), 2);
        assert_eq!(emitted[1].event, TimelineEvent::Reset);
        assert!(el.take_emitted().is_empty());
    }

    #[test]
    fn test_snapshot() {
        let mut el = EventLoop::new(SchedulerConfig::default());
        el.add_macrotask(ms(50), ms(0));
        el.add_macrotask(ms(0), ms(0));
        el.add_microtask(ms(0));

        let snap = el.snapshot(ms(10));
        assert_eq!(snap.now_ms, 10);
        assert_eq!(snap.microtasks, vec!["MICRO #3"]);
        assert_eq!(snap.macrotasks.len(), 2);
        assert!(!snap.macrotasks[0].eligible);
        assert!(snap.macrotasks[1].eligible);
        assert_eq!(snap.macrotasks[0].delay_ms, 50);
        assert_eq!(snap.macrotasks[0].remaining_ms, 40);
        assert_eq!(snap.macrotasks[1].remaining_ms, 0);
        assert_eq!(snap.log.len(), 3);
        assert_eq!(snap.phase, PhaseKind::Idle);
    }
}
