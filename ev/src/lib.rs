//! evloop - Event Loop Visualizer
//!
//! Models how a single-threaded event loop orders work: one eligible
//! macrotask per tick, then every microtask queued at the start of the
//! drain, then a pause before the next tick. Each simulated execution spans
//! time so the call stack can be watched while it runs.
//!
//! # Modules
//!
//! - [`domain`] - queue items, task kinds and scripted examples
//! - [`clock`] - time source and timers (tokio or manually advanced)
//! - [`scheduler`] - queue model, step machine and the timer-driven loop
//! - [`events`] - timeline events, broadcast bus and JSONL recorder
//! - [`headless`] - bounded runs without a terminal
//! - [`tui`] - interactive terminal view
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod cli;
pub mod clock;
pub mod config;
pub mod domain;
pub mod events;
pub mod headless;
pub mod scheduler;
pub mod tui;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, TimerHandle, TokioClock};
pub use config::{Config, UiConfig};
pub use domain::{Example, ItemId, QueueItem, TaskKind};
pub use events::{
    EventBus, RecordedEntry, TimelineEntry, TimelineEvent, TimelineRecorder, create_event_bus, read_timeline,
    spawn_timeline_recorder,
};
pub use headless::{RunOutcome, RunPlan, run_realtime, run_simulated};
pub use scheduler::{
    DEFAULT_MACRO_DELAY, EventLoop, LoopStats, PendingMacro, PhaseKind, QueueModel, SchedulerConfig, SchedulerLoop,
    Snapshot,
};
