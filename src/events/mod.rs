//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to stream lifecycle events emitted by the fleet and the
//! per-stream supervisors.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] — event classification and payload metadata
//! - [`Bus`] — thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Fleet`, `StreamSupervisor`.
//! - **Consumers**: `Fleet::subscriber_listener()` (fans out to the
//!   `SubscriberSet`) and `StateTracker`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
