//! # Runtime events emitted by the fleet and stream supervisors.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Stream lifecycle**: starting, relay exited, stalled, stopped
//! - **Restart protocol**: probe results, retry scheduling, stop failures
//! - **Fleet lifecycle**: shutdown request, grace outcome
//!
//! The [`Event`] struct carries metadata such as timestamps, the stream
//! name, attempt counts, and retry delays.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use streamvisor::{Event, EventKind};
//!
//! let ev = Event::now(EventKind::SourceUnreachable)
//!     .with_stream("cam-1")
//!     .with_attempt(3)
//!     .with_delay(Duration::from_secs(5));
//!
//! assert_eq!(ev.kind, EventKind::SourceUnreachable);
//! assert_eq!(ev.stream.as_deref(), Some("cam-1"));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Stream lifecycle ===
    /// A relay process is being started for the stream.
    ///
    /// Sets: `stream`, `attempt` (restart count so far), `at`, `seq`.
    StreamStarting,

    /// The relay process exited abnormally.
    ///
    /// Sets: `stream`, `reason` (exit description), `at`, `seq`.
    RelayExited,

    /// The stall detector declared the stream stuck.
    ///
    /// Sets: `stream`, `idle_ms` (observed idle time), `timeout_ms`
    /// (configured threshold), `at`, `seq`.
    StreamStalled,

    /// The supervisor stopped the stream due to fleet shutdown.
    ///
    /// Sets: `stream`, `at`, `seq`.
    StreamStopped,

    // === Restart protocol ===
    /// Liveness probe against the source failed; a delayed protocol re-entry
    /// is scheduled.
    ///
    /// Sets: `stream`, `attempt`, `delay_ms`, `at`, `seq`.
    SourceUnreachable,

    /// Liveness probe succeeded; the relay is restarted immediately.
    ///
    /// Sets: `stream`, `attempt`, `at`, `seq`.
    SourceReachable,

    /// Stopping the superseded relay handle failed (best-effort, protocol
    /// continues).
    ///
    /// Sets: `stream`, `reason`, `at`, `seq`.
    StopFailed,

    /// The retry ceiling was reached; the supervisor abandons the stream.
    ///
    /// Terminal for the stream: no further timers are armed.
    ///
    /// Sets: `stream`, `attempt` (the ceiling), `at`, `seq`.
    RetriesExhausted,

    // === Fleet lifecycle ===
    /// Shutdown requested (OS signal observed).
    ///
    /// Sets: `at`, `seq`.
    ShutdownRequested,

    /// All streams stopped within the configured grace period.
    ///
    /// Sets: `at`, `seq`.
    AllStoppedWithin,

    /// Grace period exceeded; some streams did not stop in time.
    ///
    /// Sets: `at`, `seq`.
    GraceExceeded,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the stream, if applicable.
    pub stream: Option<Arc<str>>,
    /// Restart attempt count (within the supervisor's episode).
    pub attempt: Option<u32>,
    /// Scheduled retry delay in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Observed idle time in milliseconds (stall events).
    pub idle_ms: Option<u32>,
    /// Configured watchdog threshold in milliseconds (stall events).
    pub timeout_ms: Option<u32>,
    /// Human-readable reason (exit status, stop error, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// next sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            stream: None,
            attempt: None,
            delay_ms: None,
            idle_ms: None,
            timeout_ms: None,
            reason: None,
        }
    }

    /// Attaches a stream name.
    #[inline]
    pub fn with_stream(mut self, stream: impl Into<Arc<str>>) -> Self {
        self.stream = Some(stream.into());
        self
    }

    /// Attaches a restart attempt count.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a retry delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(compact_ms(d));
        self
    }

    /// Attaches an observed idle duration (stored as milliseconds).
    #[inline]
    pub fn with_idle(mut self, d: Duration) -> Self {
        self.idle_ms = Some(compact_ms(d));
        self
    }

    /// Attaches the configured watchdog threshold (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        self.timeout_ms = Some(compact_ms(d));
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

fn compact_ms(d: Duration) -> u32 {
    d.as_millis().min(u128::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_are_monotonic() {
        let a = Event::now(EventKind::StreamStarting);
        let b = Event::now(EventKind::StreamStarting);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn builder_sets_metadata() {
        let ev = Event::now(EventKind::StreamStalled)
            .with_stream("cam-1")
            .with_idle(Duration::from_secs(12))
            .with_timeout(Duration::from_secs(10));
        assert_eq!(ev.stream.as_deref(), Some("cam-1"));
        assert_eq!(ev.idle_ms, Some(12_000));
        assert_eq!(ev.timeout_ms, Some(10_000));
        assert!(ev.attempt.is_none());
    }
}
