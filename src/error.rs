//! Error types used by the streamvisor runtime.
//!
//! This module defines three error enums:
//!
//! - [`RuntimeError`] — errors raised by the fleet orchestration itself.
//! - [`RelayError`] — errors raised while spawning or stopping a relay process.
//! - [`LocatorError`] — structural problems with a source endpoint locator.
//!
//! Recoverable conditions (abnormal relay exits, unreachable sources, stop
//! failures) never surface as `Err` values: they are handled inside the
//! restart protocol and reported through the event bus. Only terminal or
//! structural conditions reach a caller.

use std::time::Duration;
use thiserror::Error;

/// Errors produced by the fleet runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; some streams remained stuck.
    #[error("shutdown grace {grace:?} exceeded; stuck streams: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of streams that did not stop in time.
        stuck: Vec<String>,
    },

    /// Two stream configurations share the same name.
    #[error("duplicate stream name: {name}")]
    DuplicateStream {
        /// The offending stream name.
        name: String,
    },

    /// A stream configuration carries an unusable source locator.
    #[error("stream {name}: {source}")]
    BadLocator {
        /// The offending stream name.
        name: String,
        /// The underlying locator error.
        #[source]
        source: LocatorError,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
            RuntimeError::DuplicateStream { .. } => "runtime_duplicate_stream",
            RuntimeError::BadLocator { .. } => "runtime_bad_locator",
        }
    }
}

/// Errors produced at the process-handle boundary.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RelayError {
    /// The relay process could not be spawned.
    #[error("failed to spawn relay: {0}")]
    Spawn(#[source] std::io::Error),

    /// Terminating the relay process failed.
    ///
    /// The supervisor treats this as best-effort: the error is reported at
    /// warning level and the restart protocol continues.
    #[error("failed to stop relay: {0}")]
    Stop(#[source] std::io::Error),
}

impl RelayError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RelayError::Spawn(_) => "relay_spawn_failed",
            RelayError::Stop(_) => "relay_stop_failed",
        }
    }
}

/// Errors produced while parsing a source endpoint locator.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum LocatorError {
    /// The locator string is not a valid URL.
    #[error("invalid source locator {locator:?}: {source}")]
    Parse {
        /// The locator as configured.
        locator: String,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },

    /// The locator parsed but carries no host to probe.
    #[error("source locator {locator:?} has no host")]
    MissingHost {
        /// The locator as configured.
        locator: String,
    },
}
