//! # Stateful subscriber tracking each stream's lifecycle state.
//!
//! [`StateTracker`] folds runtime events into a per-stream [`StreamState`].
//! The fleet uses it during graceful shutdown to name the streams that did
//! not stop within the grace period; embedders can query it for a live
//! status view.
//!
//! ```text
//! StreamStarting    → Running
//! StreamStalled     → Stalled
//! RelayExited       → Probing
//! SourceUnreachable → Probing   (protocol re-entry scheduled)
//! SourceReachable   → Running   (immediately restarted)
//! RetriesExhausted  → Abandoned (terminal)
//! StreamStopped     → removed
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::events::{Event, EventKind};

use super::Subscribe;

/// Lifecycle state of one supervised stream, derived from events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamState {
    /// Relay is live (or about to be restarted without delay).
    Running,
    /// Stall detector fired; restart protocol entered.
    Stalled,
    /// Restart protocol is probing the source (possibly between delayed
    /// attempts).
    Probing,
    /// Retry ceiling reached; supervisor is inert for this stream.
    Abandoned,
}

/// Tracks the current state of every supervised stream.
///
/// Cloneable; clones share the same internal map.
#[derive(Clone, Default)]
pub struct StateTracker {
    inner: Arc<Mutex<HashMap<String, StreamState>>>,
}

impl StateTracker {
    /// Creates a new, empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of stream states.
    pub async fn snapshot(&self) -> HashMap<String, StreamState> {
        self.inner.lock().await.clone()
    }

    /// Returns the names of streams that are neither stopped nor abandoned.
    ///
    /// Used for the stuck-stream report when the shutdown grace period is
    /// exceeded.
    pub async fn active(&self) -> Vec<String> {
        let map = self.inner.lock().await;
        let mut names: Vec<String> = map
            .iter()
            .filter(|(_, state)| **state != StreamState::Abandoned)
            .map(|(name, _)| name.clone())
            .collect();
        names.sort_unstable();
        names
    }
}

#[async_trait]
impl Subscribe for StateTracker {
    async fn on_event(&self, event: &Event) {
        let Some(name) = event.stream.as_deref() else {
            return;
        };
        let next = match event.kind {
            EventKind::StreamStarting | EventKind::SourceReachable => StreamState::Running,
            EventKind::StreamStalled => StreamState::Stalled,
            EventKind::RelayExited | EventKind::SourceUnreachable => StreamState::Probing,
            EventKind::RetriesExhausted => StreamState::Abandoned,
            EventKind::StreamStopped => {
                self.inner.lock().await.remove(name);
                return;
            }
            _ => return,
        };
        self.inner.lock().await.insert(name.to_string(), next);
    }

    fn name(&self) -> &'static str {
        "state"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn folds_events_into_states() {
        let tracker = StateTracker::new();

        tracker
            .on_event(&Event::now(EventKind::StreamStarting).with_stream("cam-1"))
            .await;
        tracker
            .on_event(&Event::now(EventKind::StreamStalled).with_stream("cam-1"))
            .await;
        assert_eq!(
            tracker.snapshot().await.get("cam-1"),
            Some(&StreamState::Stalled)
        );

        tracker
            .on_event(&Event::now(EventKind::RetriesExhausted).with_stream("cam-1"))
            .await;
        assert_eq!(
            tracker.snapshot().await.get("cam-1"),
            Some(&StreamState::Abandoned)
        );
        // Abandoned streams are terminal, not stuck.
        assert!(tracker.active().await.is_empty());
    }

    #[tokio::test]
    async fn stopped_streams_are_removed() {
        let tracker = StateTracker::new();
        tracker
            .on_event(&Event::now(EventKind::StreamStarting).with_stream("cam-2"))
            .await;
        assert_eq!(tracker.active().await, vec!["cam-2".to_string()]);

        tracker
            .on_event(&Event::now(EventKind::StreamStopped).with_stream("cam-2"))
            .await;
        assert!(tracker.snapshot().await.is_empty());
    }
}
