//! # Relay handle: the start/stop/observe contract.
//!
//! [`RelaySpawner`] is the seam between the supervision state machine and
//! whatever actually runs the media relay. The production implementation is
//! [`FfmpegRelay`](super::FfmpegRelay); tests script their own spawners.
//!
//! A [`RelayHandle`] bundles everything the supervisor needs from one live
//! process:
//! - `diagnostics`: live text lines from the process (consumed by the stall
//!   detector),
//! - `exits`: a notice delivered when the process exits abnormally,
//! - `control`: idempotent termination.
//!
//! ## Rules
//! - Event delivery over the channels is in-order and at most once per
//!   notice; a clean exit closes `exits` without a notice.
//! - `stop()` must be idempotent and must not resolve before the process
//!   termination attempt has completed, so the supervisor's restart
//!   sequencing holds.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::config::StreamConfig;
use crate::error::RelayError;

/// Notification that a relay process exited abnormally.
#[derive(Clone, Debug)]
pub struct ExitNotice {
    /// Process exit code, if the process exited with one (`None` when it was
    /// terminated by a signal or its status could not be collected).
    pub code: Option<i32>,
}

impl std::fmt::Display for ExitNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code {
            Some(code) => write!(f, "relay exited with code {code}"),
            None => write!(f, "relay terminated without exit code"),
        }
    }
}

/// Termination surface of one live relay process.
#[async_trait]
pub trait RelayControl: Send {
    /// Terminates the process.
    ///
    /// Must be idempotent: stopping an already-stopped relay returns
    /// `Ok(())`. Resolves only after the termination attempt has completed.
    async fn stop(&mut self) -> Result<(), RelayError>;
}

/// Control and observation surface over one spawned relay process.
pub struct RelayHandle {
    /// Live diagnostic text lines from the process.
    pub diagnostics: mpsc::Receiver<String>,
    /// Abnormal-exit notices. Closed without a notice on clean exit.
    pub exits: mpsc::Receiver<ExitNotice>,
    /// Idempotent termination.
    pub control: Box<dyn RelayControl>,
}

/// Starts relay processes for stream configurations.
#[async_trait]
pub trait RelaySpawner: Send + Sync + 'static {
    /// Spawns a relay for the given stream.
    ///
    /// Start is fire-and-forget from the supervisor's point of view: a
    /// process that comes up and then fails reports through the handle's
    /// `exits` channel, not through this result. `Err` here means the
    /// process could not be created at all.
    async fn spawn(&self, cfg: &StreamConfig) -> Result<RelayHandle, RelayError>;
}
