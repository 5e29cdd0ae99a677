//! # Event subscribers for the streamvisor runtime.
//!
//! This module provides the [`Subscribe`] trait and built-in implementations
//! for handling runtime events broadcast through the
//! [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   StreamSupervisor ── publish(Event) ──► Bus ──► Fleet listener
//!                                                      │
//!                                              SubscriberSet::emit
//!                                              ┌───────┼────────┐
//!                                              ▼       ▼        ▼
//!                                          LogWriter StateTracker custom
//! ```
//!
//! ## Subscriber types
//! - **Passive** — observe and react (logging, metrics, alerting)
//! - **Stateful** — maintain state from events ([`StateTracker`])

mod log;
mod set;
mod state;
mod subscribe;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use state::{StateTracker, StreamState};
pub use subscribe::Subscribe;
