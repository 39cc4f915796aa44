//! Event Bus - fan-out of timeline entries to any number of subscribers

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::debug;

use super::types::TimelineEntry;

/// Default channel capacity (entries)
pub const DEFAULT_CHANNEL_CAPACITY: usize = 10_000;

/// Broadcast channel for timeline entries
///
/// Emitting never blocks and never fails: with no subscribers the entry is
/// dropped, and a slow subscriber sees `Lagged` rather than stalling the loop.
pub struct EventBus {
    tx: broadcast::Sender<TimelineEntry>,
}

impl EventBus {
    /// Create a new event bus with the given capacity
    pub fn new(capacity: usize) -> Self {
        debug!(capacity, "EventBus::new: creating event bus");
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Create a new event bus with default capacity
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Emit an entry to all subscribers
    pub fn emit(&self, entry: TimelineEntry) {
        debug!(event_type = entry.event.event_type(), at_ms = entry.at_ms, "EventBus::emit");
        // No subscribers is fine
        let _ = self.tx.send(entry);
    }

    /// Subscribe to entries emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<TimelineEntry> {
        debug!("EventBus::subscribe: new subscriber");
        self.tx.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

/// Create a shared event bus with default capacity
pub fn create_event_bus() -> Arc<EventBus> {
    Arc::new(EventBus::with_default_capacity())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::TimelineEvent;

    #[tokio::test]
    async fn test_emit_reaches_every_subscriber() {
        let bus = EventBus::new(16);
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.emit(TimelineEntry::new(10, TimelineEvent::Reset));

        assert_eq!(a.recv().await.unwrap().event, TimelineEvent::Reset);
        assert_eq!(b.recv().await.unwrap().at_ms, 10);
    }

    #[test]
    fn test_emit_without_subscribers_is_ok() {
        let bus = create_event_bus();
        bus.emit(TimelineEntry::new(0, TimelineEvent::Reset));
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_late_subscriber_misses_earlier_entries() {
        let bus = EventBus::new(16);
        bus.emit(TimelineEntry::new(1, TimelineEvent::Reset));

        let mut rx = bus.subscribe();
        bus.emit(TimelineEntry::new(2, TimelineEvent::DrainStarted { count: 1 }));

        assert_eq!(rx.recv().await.unwrap().at_ms, 2);
        assert!(rx.try_recv().is_err());
    }
}
