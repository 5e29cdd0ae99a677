//! # streamvisor
//!
//! **Streamvisor** is a supervision runtime for long-running media-relay
//! subprocesses. It keeps one relay process per network camera alive across
//! process crashes, stalled feeds, and source outages, with a bounded-retry
//! restart protocol.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ StreamConfig │   │ StreamConfig │   │ StreamConfig │
//!     │   (cam #1)   │   │   (cam #2)   │   │   (cam #3)   │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Fleet (runtime orchestrator)                                     │
//! │  - Bus (broadcast events)                                         │
//! │  - SubscriberSet (fans out to user subscribers)                   │
//! │  - StateTracker (per-stream lifecycle state)                      │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ StreamSuper- │   │ StreamSuper- │   │ StreamSuper- │
//! │ visor cam-1  │   │ visor cam-2  │   │ visor cam-3  │
//! └┬─────────────┘   └──────────────┘   └──────────────┘
//!  │ owns exactly one live pair:
//!  ├──► RelayHandle   (spawned via RelaySpawner, e.g. FfmpegRelay)
//!  └──► StallDetector (fresh per handle, watches diagnostics)
//! ```
//!
//! ### Per-stream lifecycle
//! ```text
//! loop {
//!   ├─► spawn relay, arm fresh stall detector
//!   ├─► Running until abnormal exit or stall
//!   ├─► restart protocol:
//!   │     ├─ retries ≥ max_retries → Abandoned (terminal, reported)
//!   │     ├─ retries += 1
//!   │     ├─ stop old handle (best-effort, idempotent)
//!   │     └─ probe source host:port
//!   │          ├─ reachable   → restart immediately
//!   │          └─ unreachable → sleep retry_delay, re-enter protocol
//!   └─ exit conditions:
//!        - runtime token cancelled (fleet shutdown)
//!        - retry ceiling reached → ExitReason::Exhausted
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                  |
//! |-------------------|---------------------------------------------------------------|-------------------------------------|
//! | **Supervision**   | Per-stream restart protocol with a bounded retry ceiling.     | [`StreamSupervisor`], [`Fleet`]     |
//! | **Watchdog**      | Stall detection over the relay's diagnostic output.           | [`StallDetector`]                   |
//! | **Liveness**      | Transport-level reachability gate for the source.             | [`probe`]                           |
//! | **Process**       | Opaque start/stop contract over the relay subprocess.         | [`RelaySpawner`], [`RelayHandle`]   |
//! | **Subscriber API**| Hook into lifecycle events (logging, state, custom).          | [`Subscribe`], [`LogWriter`]        |
//! | **Errors**        | Typed errors for the runtime and the relay boundary.          | [`RuntimeError`], [`RelayError`]    |
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use streamvisor::{Fleet, FleetConfig, FfmpegRelay, LogWriter, StreamConfig, Subscribe};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     tracing_subscriber::fmt::init();
//!
//!     let mut cam = StreamConfig::new(
//!         "kamera-2",
//!         "rtsp://192.167.0.4:1554/live/1",
//!         "http://127.0.0.1:8081/feed",
//!     );
//!     cam.relay_options = vec![
//!         ("-r".into(), "60".into()),
//!         ("-codec:v".into(), "mpeg1video".into()),
//!         ("-stats".into(), String::new()),
//!     ];
//!     cam.max_retries = 20;
//!
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];
//!     let fleet = Fleet::new(FleetConfig::default(), subs);
//!     fleet.run(vec![cam], Arc::new(FfmpegRelay::new())).await?;
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod locator;
mod probe;
mod relay;
mod subscribers;
mod watchdog;

// ---- Public re-exports ----

pub use config::{FleetConfig, StreamConfig};
pub use core::{ExitReason, Fleet, StreamSupervisor};
pub use error::{LocatorError, RelayError, RuntimeError};
pub use events::{Bus, Event, EventKind};
pub use locator::SourceEndpoint;
pub use probe::probe;
pub use relay::{ExitNotice, FfmpegRelay, RelayControl, RelayHandle, RelaySpawner};
pub use subscribers::{LogWriter, StateTracker, StreamState, Subscribe, SubscriberSet};
pub use watchdog::{StallDetector, StallNotice};
