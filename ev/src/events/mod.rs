//! Timeline events
//!
//! Every observable action of the event loop - scheduling, macrotask and
//! microtask begin/end, drains, examples, resets - is a [`TimelineEvent`].
//! The scheduler keeps a capped log of them for display and publishes each
//! one on the [`EventBus`] for other consumers (headless output, the JSONL
//! recorder).
//!
//! ```text
//!   SchedulerLoop ──emit──▶ EventBus (tokio broadcast) ──▶ TimelineRecorder (.jsonl)
//!                                                     └──▶ `evl run` printer
//! ```

mod bus;
mod recorder;
mod types;

pub use bus::{DEFAULT_CHANNEL_CAPACITY, EventBus, create_event_bus};
pub use recorder::{RecordedEntry, TimelineRecorder, read_timeline, spawn_timeline_recorder};
pub use types::{TimelineEntry, TimelineEvent};
