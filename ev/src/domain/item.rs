//! Queue items - the units of simulated work

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Kind of scheduled work
///
/// `Raf` is a macrotask variant: it waits in the macrotask queue and is
/// selected by the same policy, it only carries its own label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Micro,
    Macro,
    Raf,
}

impl TaskKind {
    /// Upper-case tag used in item labels (`MICRO #3`)
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Micro => "MICRO",
            Self::Macro => "MACRO",
            Self::Raf => "RAF",
        }
    }

    /// True for items that live in the macrotask queue
    pub fn is_macro_class(&self) -> bool {
        matches!(self, Self::Macro | Self::Raf)
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Micro => write!(f, "micro"),
            Self::Macro => write!(f, "macro"),
            Self::Raf => write!(f, "raf"),
        }
    }
}

impl std::str::FromStr for TaskKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "micro" | "microtask" => Ok(Self::Micro),
            "macro" | "macrotask" => Ok(Self::Macro),
            "raf" => Ok(Self::Raf),
            _ => Err(format!("Unknown task kind: {}. Use: micro, macro, or raf", s)),
        }
    }
}

/// Identity of a queue item, issued from 1 and restarted on reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A pending unit of work in one of the two queues
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueItem {
    pub id: ItemId,
    pub label: String,
    pub kind: TaskKind,
    /// Time after `created_at` before the item may run (zero for microtasks)
    pub ready_delay: Duration,
    /// Clock reading at enqueue
    pub created_at: Duration,
}

impl QueueItem {
    /// Create an item; microtasks always get a zero delay
    pub fn new(id: ItemId, kind: TaskKind, ready_delay: Duration, created_at: Duration) -> Self {
        let ready_delay = if kind.is_macro_class() {
            ready_delay
        } else {
            Duration::ZERO
        };
        Self {
            id,
            label: format!("{} #{}", kind.tag(), id),
            kind,
            ready_delay,
            created_at,
        }
    }

    /// Whether the item's delay has elapsed at `now`
    pub fn is_eligible(&self, now: Duration) -> bool {
        now.saturating_sub(self.created_at) >= self.ready_delay
    }

    /// Remaining time until eligible (zero once eligible)
    pub fn remaining(&self, now: Duration) -> Duration {
        (self.created_at + self.ready_delay).saturating_sub(now)
    }
}
