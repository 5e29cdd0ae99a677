//! # Fleet: registry of stream supervisors and graceful shutdown.
//!
//! The [`Fleet`] owns the event bus, a [`SubscriberSet`], and runtime-wide
//! configuration. It constructs one [`StreamSupervisor`] per configured
//! stream, handles OS termination signals, and performs graceful shutdown
//! with a configurable grace period.
//!
//! ## High-level architecture
//! ```text
//! Inputs to run():
//!   Vec<StreamConfig> ──► Fleet::run(streams, spawner)
//!
//! Preparation:
//!   - reject duplicate stream names / unusable locators
//!   - subscriber_listener(): Bus.subscribe() ─► SubscriberSet::emit(&Event)
//!
//! Spawn supervisors:
//!   StreamConfig[0] ... StreamConfig[N-1]
//!       │                     │
//!       └──► StreamSupervisor::new(cfg, spawner, bus)   (one per stream)
//!                └──► child CancellationToken = runtime_token.child_token()
//!                     set.spawn(supervisor.run(child_token))
//!
//! Shutdown path:
//!   shutdown::wait_for_shutdown_signal()
//!             └─► Bus.publish(ShutdownRequested)
//!             └─► runtime_token.cancel() → propagates to children
//!             └─► wait_all_with_grace(cfg.grace):
//!                    ├─ all joined  → Bus.publish(AllStoppedWithin)
//!                    └─ timeout     → Bus.publish(GraceExceeded),
//!                                     StateTracker names stuck streams
//! ```
//!
//! Supervisors never share mutable state: each owns its own relay handle,
//! stall detector, retry counter and timers; the fleet only holds the
//! explicit registry and the shared (immutable) bus handles.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::{FleetConfig, StreamConfig};
use crate::core::shutdown;
use crate::core::supervisor::{ExitReason, StreamSupervisor};
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::relay::RelaySpawner;
use crate::subscribers::{StateTracker, Subscribe, SubscriberSet};

/// Coordinates stream supervisors, event delivery, and graceful shutdown.
pub struct Fleet {
    /// Runtime-wide configuration.
    pub cfg: FleetConfig,
    /// Event bus shared with all supervisors.
    pub bus: Bus,
    /// Fan-out set for subscribers.
    subs: Arc<SubscriberSet>,
    /// Per-stream state view used for the stuck-stream snapshot.
    states: StateTracker,
}

impl Fleet {
    /// Creates a fleet with the given config and subscribers.
    ///
    /// A [`StateTracker`] is always appended to the subscriber set; it backs
    /// the stuck-stream report on grace-exceeded shutdown.
    pub fn new(cfg: FleetConfig, mut subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        let bus = Bus::new(cfg.bus_capacity);
        let states = StateTracker::new();
        subscribers.push(Arc::new(states.clone()));
        Self {
            cfg,
            bus,
            subs: Arc::new(SubscriberSet::new(subscribers)),
            states,
        }
    }

    /// Runs one supervisor per stream configuration until either:
    /// - every supervisor exits on its own (all streams abandoned), or
    /// - a termination signal arrives → graceful shutdown (which may end
    ///   with [`RuntimeError::GraceExceeded`]).
    pub async fn run(
        &self,
        streams: Vec<StreamConfig>,
        spawner: Arc<dyn RelaySpawner>,
    ) -> Result<(), RuntimeError> {
        self.subscriber_listener();

        let token = CancellationToken::new();
        let mut set = JoinSet::new();
        self.spawn_supervisors(&mut set, &token, streams, spawner)?;
        self.drive_shutdown(&mut set, &token).await
    }

    /// Subscribes to the bus and forwards events to the subscriber set
    /// (fire-and-forget).
    fn subscriber_listener(&self) {
        let mut rx = self.bus.subscribe();
        let set = Arc::clone(&self.subs);
        tokio::spawn(async move {
            while let Ok(ev) = rx.recv().await {
                set.emit(&ev);
            }
        });
    }

    /// Validates configurations and spawns one supervisor per stream.
    fn spawn_supervisors(
        &self,
        set: &mut JoinSet<ExitReason>,
        runtime_token: &CancellationToken,
        streams: Vec<StreamConfig>,
        spawner: Arc<dyn RelaySpawner>,
    ) -> Result<(), RuntimeError> {
        let mut seen = HashSet::new();
        for cfg in streams {
            if !seen.insert(cfg.name.clone()) {
                return Err(RuntimeError::DuplicateStream { name: cfg.name });
            }
            let name = cfg.name.clone();
            let supervisor = StreamSupervisor::new(cfg, Arc::clone(&spawner), self.bus.clone())
                .map_err(|source| RuntimeError::BadLocator { name, source })?;
            set.spawn(supervisor.run(runtime_token.child_token()));
        }
        Ok(())
    }

    /// Waits until either all supervisors finish or a shutdown signal is
    /// received.
    async fn drive_shutdown(
        &self,
        set: &mut JoinSet<ExitReason>,
        runtime_token: &CancellationToken,
    ) -> Result<(), RuntimeError> {
        tokio::select! {
            _ = shutdown::wait_for_shutdown_signal() => {
                self.bus.publish(Event::now(EventKind::ShutdownRequested));
                runtime_token.cancel();
                self.wait_all_with_grace(set).await
            }
            _ = async { while set.join_next().await.is_some() {} } => {
                Ok(())
            }
        }
    }

    /// Waits for all supervisors to finish within the configured grace
    /// period.
    ///
    /// Publishes [`EventKind::AllStoppedWithin`] on success, or
    /// [`EventKind::GraceExceeded`] on timeout together with a
    /// [`RuntimeError::GraceExceeded`] naming the stuck streams.
    async fn wait_all_with_grace(
        &self,
        set: &mut JoinSet<ExitReason>,
    ) -> Result<(), RuntimeError> {
        let grace = self.cfg.grace;
        let done = async { while set.join_next().await.is_some() {} };

        match tokio::time::timeout(grace, done).await {
            Ok(()) => {
                self.bus.publish(Event::now(EventKind::AllStoppedWithin));
                Ok(())
            }
            Err(_) => {
                self.bus.publish(Event::now(EventKind::GraceExceeded));
                let stuck = self.states.active().await;
                Err(RuntimeError::GraceExceeded { grace, stuck })
            }
        }
    }
}
