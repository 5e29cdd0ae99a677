//! # Logging subscriber.
//!
//! [`LogWriter`] renders runtime events as structured log lines through
//! [`tracing`], one line per state transition, tagged with the stream name.
//!
//! ## Output shape
//! ```text
//! INFO  stream=cam-1 Starting stream...
//! WARN  stream=cam-1 FFmpeg error. Retrying in 5s...
//! WARN  stream=cam-1 No frame for 10s. Restarting stream...
//! INFO  stream=cam-1 RTSP not reachable. Retrying in 5s...
//! INFO  stream=cam-1 RTSP reachable. Restarting stream...
//! ERROR stream=cam-1 Max retries reached. Giving up.
//! ```

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::events::{Event, EventKind};

use super::Subscribe;

/// Subscriber that logs every runtime event through `tracing`.
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, event: &Event) {
        let stream = event.stream.as_deref().unwrap_or("-");
        match event.kind {
            EventKind::StreamStarting => {
                info!(stream, "Starting stream...");
            }
            EventKind::RelayExited => {
                warn!(
                    stream,
                    reason = event.reason.as_deref().unwrap_or("unknown"),
                    "FFmpeg error. Retrying in {}s...",
                    secs(event.delay_ms),
                );
            }
            EventKind::StreamStalled => {
                warn!(
                    stream,
                    "No frame for {}s. Restarting stream...",
                    secs(event.timeout_ms),
                );
            }
            EventKind::SourceUnreachable => {
                info!(
                    stream,
                    attempt = event.attempt,
                    "RTSP not reachable. Retrying in {}s...",
                    secs(event.delay_ms),
                );
            }
            EventKind::SourceReachable => {
                info!(stream, attempt = event.attempt, "RTSP reachable. Restarting stream...");
            }
            EventKind::StopFailed => {
                warn!(
                    stream,
                    "Error stopping stream: {}",
                    event.reason.as_deref().unwrap_or("unknown"),
                );
            }
            EventKind::RetriesExhausted => {
                error!(stream, attempts = event.attempt, "Max retries reached. Giving up.");
            }
            EventKind::StreamStopped => {
                info!(stream, "Stream stopped.");
            }
            EventKind::ShutdownRequested => {
                info!("Shutdown requested.");
            }
            EventKind::AllStoppedWithin => {
                info!("All streams stopped within grace.");
            }
            EventKind::GraceExceeded => {
                error!("Grace period exceeded; some streams are stuck.");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

fn secs(ms: Option<u32>) -> u32 {
    ms.unwrap_or(0) / 1000
}
