//! Capped, append-only timeline log

use std::collections::VecDeque;

use tracing::debug;

use crate::events::TimelineEntry;

/// Most-recent-N log of timeline entries; the oldest entry is dropped on overflow
#[derive(Debug, Clone)]
pub struct TimelineLog {
    entries: VecDeque<TimelineEntry>,
    capacity: usize,
}

impl TimelineLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn push(&mut self, entry: TimelineEntry) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                debug!(at_ms = evicted.at_ms, "TimelineLog::push: evicted oldest entry");
            }
        }
        self.entries.push_back(entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries oldest first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &TimelineEntry> {
        self.entries.iter()
    }
}
