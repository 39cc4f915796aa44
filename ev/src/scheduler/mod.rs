//! Event loop scheduler
//!
//! - [`QueueModel`] holds the microtask and macrotask queues, the call stack
//!   and the capped timeline log.
//! - [`EventLoop`] is the per-tick state machine: one eligible macrotask, then
//!   a full microtask drain, then reschedule. It performs one transition per
//!   `step(now)` and returns how long to wait before the next one.
//! - [`SchedulerLoop`] drives an `EventLoop` from a [`Clock`](crate::clock::Clock)
//!   and exposes the user command surface.

mod config;
mod driver;
mod engine;
mod queue;
mod timeline;

pub use crate::domain::Example;
pub use config::{MIN_STEP, SchedulerConfig};
pub use driver::{DEFAULT_MACRO_DELAY, SchedulerLoop};
pub use engine::{EventLoop, LoopStats, PendingMacro, Phase, PhaseKind, Snapshot};
pub use queue::QueueModel;
pub use timeline::TimelineLog;
