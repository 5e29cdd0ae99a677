//! # Stream and fleet configuration.
//!
//! [`StreamConfig`] describes one supervised camera stream: where the feed
//! comes from, where the relay writes its output, how the relay process is
//! parameterized, and the retry/watchdog knobs of the supervision state
//! machine. The struct maps 1:1 onto the records an embedder loads from a
//! static list or a persistent store; it derives `serde::Deserialize` so
//! either source can produce it directly.
//!
//! [`FleetConfig`] holds runtime-wide settings (shutdown grace, event bus
//! capacity).
//!
//! # Example
//! ```
//! use streamvisor::StreamConfig;
//!
//! let cfg = StreamConfig::new("cam-1", "rtsp://192.168.0.4:1554/live/1", "ws://127.0.0.1:9998");
//! assert_eq!(cfg.max_retries, 10);
//! assert_eq!(cfg.retry_delay().as_millis(), 5000);
//! ```

use std::time::Duration;

use serde::Deserialize;

/// Configuration for one supervised stream.
///
/// Immutable per supervisor instance. Durations are carried as millisecond
/// fields so records deserialize 1:1 from external stores; accessor methods
/// expose them as [`Duration`].
#[derive(Clone, Debug, Deserialize)]
pub struct StreamConfig {
    /// Identifying stream name; tags every log line and event.
    pub name: String,
    /// Source endpoint locator (scheme, optional credentials, host, port, path).
    pub source_url: String,
    /// Destination/transport parameter handed to the relay process.
    pub destination: String,
    /// Ordered relay option set; order is preserved when building the
    /// process command line. An empty value denotes a bare flag.
    #[serde(default)]
    pub relay_options: Vec<(String, String)>,
    /// Substring of a diagnostic line that counts as forward progress.
    #[serde(default = "defaults::activity_marker")]
    pub activity_marker: String,
    /// Maximum restart attempts before the supervisor abandons the stream.
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,
    /// Delay between restart-protocol attempts while the source is
    /// unreachable, in milliseconds.
    #[serde(default = "defaults::retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Idle time on the diagnostic stream after which the stream counts as
    /// stalled, in milliseconds.
    #[serde(default = "defaults::watchdog_timeout_ms")]
    pub watchdog_timeout_ms: u64,
    /// Polling cadence of the stall detector, in milliseconds.
    #[serde(default = "defaults::watchdog_check_interval_ms")]
    pub watchdog_check_interval_ms: u64,
    /// Timeout for one liveness probe against the source, in milliseconds.
    #[serde(default = "defaults::probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

mod defaults {
    pub(super) fn activity_marker() -> String {
        "frame=".to_string()
    }
    pub(super) fn max_retries() -> u32 {
        10
    }
    pub(super) fn retry_delay_ms() -> u64 {
        5_000
    }
    pub(super) fn watchdog_timeout_ms() -> u64 {
        10_000
    }
    pub(super) fn watchdog_check_interval_ms() -> u64 {
        3_000
    }
    pub(super) fn probe_timeout_ms() -> u64 {
        3_000
    }
}

impl StreamConfig {
    /// Creates a configuration with default supervision knobs.
    pub fn new(
        name: impl Into<String>,
        source_url: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            source_url: source_url.into(),
            destination: destination.into(),
            relay_options: Vec::new(),
            activity_marker: defaults::activity_marker(),
            max_retries: defaults::max_retries(),
            retry_delay_ms: defaults::retry_delay_ms(),
            watchdog_timeout_ms: defaults::watchdog_timeout_ms(),
            watchdog_check_interval_ms: defaults::watchdog_check_interval_ms(),
            probe_timeout_ms: defaults::probe_timeout_ms(),
        }
    }

    /// Delay between restart-protocol attempts.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Watchdog idle threshold.
    pub fn watchdog_timeout(&self) -> Duration {
        Duration::from_millis(self.watchdog_timeout_ms)
    }

    /// Watchdog polling cadence.
    pub fn watchdog_check_interval(&self) -> Duration {
        Duration::from_millis(self.watchdog_check_interval_ms)
    }

    /// Liveness probe timeout.
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

/// Runtime-wide configuration for the fleet.
#[derive(Clone, Debug)]
pub struct FleetConfig {
    /// Maximum time to wait for supervisors to stop during shutdown.
    pub grace: Duration,
    /// Capacity of the event bus channel.
    pub bus_capacity: usize,
}

impl Default for FleetConfig {
    /// Provides a default configuration:
    /// - `grace = 30s`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(30),
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_supervision_contract() {
        let cfg = StreamConfig::new("cam", "rtsp://10.0.0.1/live", "ws://127.0.0.1:9999");
        assert_eq!(cfg.max_retries, 10);
        assert_eq!(cfg.retry_delay(), Duration::from_millis(5_000));
        assert_eq!(cfg.watchdog_timeout(), Duration::from_millis(10_000));
        assert_eq!(cfg.watchdog_check_interval(), Duration::from_millis(3_000));
        assert_eq!(cfg.probe_timeout(), Duration::from_millis(3_000));
        assert_eq!(cfg.activity_marker, "frame=");
    }

    #[test]
    fn deserializes_from_record_with_partial_fields() {
        let raw = r#"{
            "name": "kamera-2",
            "source_url": "rtsp://192.167.0.4:1554/live/1",
            "destination": "ws://0.0.0.0:9998",
            "relay_options": [["-r", "60"], ["-stats", ""]],
            "max_retries": 20
        }"#;
        let cfg: StreamConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(cfg.name, "kamera-2");
        assert_eq!(cfg.max_retries, 20);
        // Unspecified knobs fall back to defaults.
        assert_eq!(cfg.retry_delay_ms, 5_000);
        assert_eq!(cfg.watchdog_timeout_ms, 10_000);
        // Option order is preserved.
        assert_eq!(cfg.relay_options[0].0, "-r");
        assert_eq!(cfg.relay_options[1].0, "-stats");
    }
}
