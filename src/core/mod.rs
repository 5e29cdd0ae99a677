//! Runtime core: per-stream supervision and fleet orchestration.
//!
//! Internal modules:
//! - [`supervisor`]: the per-stream state machine (watchdog, liveness
//!   probing, bounded-retry restart protocol);
//! - [`fleet`]: constructs one supervisor per configured stream, fans events
//!   out to subscribers, and drives graceful shutdown;
//! - [`shutdown`]: cross-platform shutdown signal handling.

mod fleet;
mod shutdown;
mod supervisor;

pub use fleet::Fleet;
pub use supervisor::{ExitReason, StreamSupervisor};
