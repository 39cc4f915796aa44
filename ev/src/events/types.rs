//! Event vocabulary of the event loop timeline

use serde::{Deserialize, Serialize};

use crate::domain::{Example, QueueItem, TaskKind};

/// Something observable that happened in the event loop
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TimelineEvent {
    /// An item was added to one of the queues
    Scheduled {
        id: u64,
        label: String,
        kind: TaskKind,
        delay_ms: u64,
    },
    /// A macrotask was selected and pushed onto the call stack
    MacroStarted { id: u64, label: String },
    /// The running macrotask finished and was popped
    MacroFinished { id: u64, label: String },
    /// A microtask drain began with `count` items snapshotted
    DrainStarted { count: usize },
    /// A microtask was pushed onto the call stack
    MicroStarted { id: u64, label: String },
    /// The running microtask finished and was popped
    MicroFinished { id: u64, label: String },
    /// A scripted example finished scheduling its primitives
    ExampleScheduled { example: Example },
    /// All state was cleared
    Reset,
}

impl TimelineEvent {
    pub fn scheduled(item: &QueueItem) -> Self {
        Self::Scheduled {
            id: item.id.0,
            label: item.label.clone(),
            kind: item.kind,
            delay_ms: crate::clock::as_millis(item.ready_delay),
        }
    }

    /// Begin event for an item about to run
    pub fn started(item: &QueueItem) -> Self {
        let (id, label) = (item.id.0, item.label.clone());
        if item.kind.is_macro_class() {
            Self::MacroStarted { id, label }
        } else {
            Self::MicroStarted { id, label }
        }
    }

    /// End event for an item that just ran
    pub fn finished(item: &QueueItem) -> Self {
        let (id, label) = (item.id.0, item.label.clone());
        if item.kind.is_macro_class() {
            Self::MacroFinished { id, label }
        } else {
            Self::MicroFinished { id, label }
        }
    }

    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Scheduled { .. } => "Scheduled",
            Self::MacroStarted { .. } => "MacroStarted",
            Self::MacroFinished { .. } => "MacroFinished",
            Self::DrainStarted { .. } => "DrainStarted",
            Self::MicroStarted { .. } => "MicroStarted",
            Self::MicroFinished { .. } => "MicroFinished",
            Self::ExampleScheduled { .. } => "ExampleScheduled",
            Self::Reset => "Reset",
        }
    }
}

impl std::fmt::Display for TimelineEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scheduled {
                label,
                kind: TaskKind::Micro,
                ..
            } => write!(f, "Scheduled microtask {}", label),
            Self::Scheduled {
                label,
                kind: TaskKind::Macro,
                delay_ms,
                ..
            } => write!(f, "Scheduled macrotask {} (delay {}ms)", label, delay_ms),
            Self::Scheduled {
                label,
                kind: TaskKind::Raf,
                ..
            } => write!(f, "Scheduled RAF {}", label),
            Self::MacroStarted { label, .. } => write!(f, "Begin macrotask {}", label),
            Self::MacroFinished { label, .. } => write!(f, "End macrotask {}", label),
            Self::DrainStarted { count } => write!(f, "Draining {} microtask(s)", count),
            Self::MicroStarted { label, .. } => write!(f, "Begin microtask {}", label),
            Self::MicroFinished { label, .. } => write!(f, "End microtask {}", label),
            Self::ExampleScheduled { example } => write!(f, "{}", example.note()),
            Self::Reset => write!(f, "Reset demo"),
        }
    }
}

/// A timeline event stamped with the clock reading at which it happened
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Milliseconds since the clock origin
    pub at_ms: u64,
    pub event: TimelineEvent,
}

impl TimelineEntry {
    pub fn new(at_ms: u64, event: TimelineEvent) -> Self {
        Self { at_ms, event }
    }

    /// Human-readable log line
    pub fn text(&self) -> String {
        format!("{:>6}ms · {}", self.at_ms, self.event)
    }
}
