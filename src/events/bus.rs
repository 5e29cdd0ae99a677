//! # Event bus for broadcasting runtime events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking event publishing from multiple sources (stream supervisors,
//! fleet).
//!
//! ## Architecture
//! ```text
//! Publishers (many):                    Subscriber (one):
//!   Supervisor cam-1 ──┐
//!   Supervisor cam-2 ──┼──► Bus ──► subscriber_listener ──► SubscriberSet
//!   Supervisor cam-N ──┤ (broadcast       (in Fleet)
//!   Fleet            ──┘   channel)
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks.
//! - **Bounded capacity**: a single ring buffer stores recent events for all
//!   receivers; slow receivers observe `RecvError::Lagged(n)`.
//! - **No persistence**: events are lost if there are no active subscribers
//!   at send time.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for runtime events.
///
/// Thin wrapper over [`tokio::sync::broadcast`] with a `publish`/`subscribe`
/// API. Cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (clamped to ≥ 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Publishes an event to all active subscribers.
    ///
    /// If there are no receivers, the event is dropped; the call still
    /// returns immediately.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that observes subsequent events.
    ///
    /// Each call creates an independent receiver; it only gets events sent
    /// after it subscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn subscriber_receives_published_events() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        bus.publish(Event::now(EventKind::StreamStarting).with_stream("cam-1"));

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::StreamStarting);
        assert_eq!(ev.stream.as_deref(), Some("cam-1"));
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_a_noop() {
        let bus = Bus::new(1);
        bus.publish(Event::now(EventKind::ShutdownRequested));
    }
}
