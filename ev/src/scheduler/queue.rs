//! Queue Model - the two task queues, the call stack and the timeline log

use std::collections::VecDeque;
use std::time::Duration;

use tracing::debug;

use crate::domain::{ItemId, QueueItem, TaskKind};
use crate::events::TimelineEntry;

use super::timeline::TimelineLog;

/// Pending work plus the display-only call stack and log
///
/// Both queues are strictly FIFO; items leave only through
/// [`take_macro`](Self::take_macro) or [`drain_all_micro`](Self::drain_all_micro).
#[derive(Debug, Clone)]
pub struct QueueModel {
    micros: VecDeque<QueueItem>,
    macros: VecDeque<QueueItem>,
    /// Bottom first
    call_stack: Vec<String>,
    log: TimelineLog,
    next_id: u64,
}

impl QueueModel {
    /// Create an empty model whose log keeps `log_capacity` entries
    pub fn new(log_capacity: usize) -> Self {
        Self {
            micros: VecDeque::new(),
            macros: VecDeque::new(),
            call_stack: Vec::new(),
            log: TimelineLog::new(log_capacity),
            next_id: 1,
        }
    }

    fn issue_id(&mut self) -> ItemId {
        let id = ItemId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Append a microtask; always immediately eligible
    pub fn enqueue_micro(&mut self, now: Duration) -> QueueItem {
        let item = QueueItem::new(self.issue_id(), TaskKind::Micro, Duration::ZERO, now);
        debug!(label = %item.label, "QueueModel::enqueue_micro");
        self.micros.push_back(item.clone());
        item
    }

    /// Append a macro-class item that becomes eligible after `delay`
    ///
    /// A `Micro` kind is routed to the microtask queue.
    pub fn enqueue_macro(&mut self, kind: TaskKind, delay: Duration, now: Duration) -> QueueItem {
        if !kind.is_macro_class() {
            return self.enqueue_micro(now);
        }
        let item = QueueItem::new(self.issue_id(), kind, delay, now);
        debug!(label = %item.label, ?delay, "QueueModel::enqueue_macro");
        self.macros.push_back(item.clone());
        item
    }

    /// Index of the first macrotask, by queue position, whose delay has elapsed
    ///
    /// An earlier item that is not yet eligible does not block a later one,
    /// but a later item never overtakes an earlier eligible one.
    pub fn find_next_eligible_macro(&self, now: Duration) -> Option<usize> {
        self.macros.iter().position(|item| item.is_eligible(now))
    }

    /// Remove the macrotask at `index`
    pub fn take_macro(&mut self, index: usize) -> Option<QueueItem> {
        debug!(index, len = self.macros.len(), "QueueModel::take_macro: called");
        self.macros.remove(index)
    }

    /// Snapshot and clear the whole microtask queue in one step
    pub fn drain_all_micro(&mut self) -> Vec<QueueItem> {
        debug!(count = self.micros.len(), "QueueModel::drain_all_micro");
        self.micros.drain(..).collect()
    }

    pub fn push_frame(&mut self, label: impl Into<String>) {
        self.call_stack.push(label.into());
    }

    pub fn pop_frame(&mut self) -> Option<String> {
        self.call_stack.pop()
    }

    pub fn append_log(&mut self, entry: TimelineEntry) {
        self.log.push(entry);
    }

    /// Clear queues, call stack and log; the next id issued is 1
    pub fn reset(&mut self) {
        debug!("QueueModel::reset: called");
        self.micros.clear();
        self.macros.clear();
        self.call_stack.clear();
        self.log.clear();
        self.next_id = 1;
    }

    pub fn microtasks(&self) -> impl Iterator<Item = &QueueItem> {
        self.micros.iter()
    }

    pub fn macrotasks(&self) -> impl Iterator<Item = &QueueItem> {
        self.macros.iter()
    }

    pub fn micro_len(&self) -> usize {
        self.micros.len()
    }

    pub fn macro_len(&self) -> usize {
        self.macros.len()
    }

    /// Call stack, bottom first
    pub fn call_stack(&self) -> &[String] {
        &self.call_stack
    }

    pub fn log(&self) -> &TimelineLog {
        &self.log
    }

    /// Id the next enqueue will receive
    pub fn peek_next_id(&self) -> ItemId {
        ItemId(self.next_id)
    }

    pub fn is_empty(&self) -> bool {
        self.micros.is_empty() && self.macros.is_empty()
    }
}
