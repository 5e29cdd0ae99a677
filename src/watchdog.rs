//! # Stall detector.
//!
//! [`StallDetector`] watches the diagnostic output of one live relay process
//! and declares the stream stuck when no forward progress is observed for
//! longer than the configured watchdog timeout.
//!
//! ## Flow
//! ```text
//! relay diagnostics ──► detector task ──► StallNotice (at most once)
//!        │                    │
//!  line contains        poll every check_interval:
//!  activity marker      idle = now - last_activity
//!  → last_activity      idle > timeout → fire, exit
//!    = now
//! ```
//!
//! ## Rules
//! - **Single-shot**: the detector fires at most once, then its task exits.
//!   A fresh detector must be created for each new relay handle.
//! - **No-activity edge case**: if no activity marker is ever observed, the
//!   detector still fires once the timeout elapses from detector creation.
//! - **Cancellation**: the supervisor cancels the detector's token the
//!   moment its relay handle is superseded; a cancelled detector never
//!   fires.
//! - The first poll happens one `check_interval` after creation, so with
//!   `timeout = 10s` and `check_interval = 3s` the notice fires on the poll
//!   at `t = 12s`, not earlier.
//!
//! One task owns both the line listener and the polling loop (selected over
//! concurrently), so `last_activity` has a single writer and every poll
//! observes the latest update.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

/// Notice that a stream produced no activity within the watchdog timeout.
#[derive(Clone, Debug)]
pub struct StallNotice {
    /// Idle time observed at the poll that fired.
    pub idle: Duration,
}

/// Single-shot watchdog over one relay handle's diagnostic stream.
pub struct StallDetector {
    rx: mpsc::Receiver<StallNotice>,
}

impl StallDetector {
    /// Spawns the detector task over a diagnostic line channel.
    ///
    /// `marker` is the activity substring (e.g. `"frame="`); any diagnostic
    /// line containing it counts as forward progress. The task runs until it
    /// fires or `token` is cancelled. `check_interval` is clamped to at
    /// least one millisecond.
    pub fn spawn(
        lines: mpsc::Receiver<String>,
        marker: String,
        timeout: Duration,
        check_interval: Duration,
        token: CancellationToken,
    ) -> Self {
        // tokio intervals reject a zero period.
        let check_interval = check_interval.max(Duration::from_millis(1));
        let (tx, rx) = mpsc::channel(1);
        tokio::spawn(watch(lines, marker, timeout, check_interval, token, tx));
        Self { rx }
    }

    /// Waits for the stall notice.
    ///
    /// Returns `None` if the detector was cancelled before firing. After a
    /// notice has been delivered, subsequent calls return `None` (the
    /// detector is single-shot).
    pub async fn stalled(&mut self) -> Option<StallNotice> {
        self.rx.recv().await
    }
}

async fn watch(
    mut lines: mpsc::Receiver<String>,
    marker: String,
    timeout: Duration,
    check_interval: Duration,
    token: CancellationToken,
    tx: mpsc::Sender<StallNotice>,
) {
    let mut last_activity = Instant::now();
    let mut ticker = time::interval_at(Instant::now() + check_interval, check_interval);
    let mut lines_open = true;

    loop {
        tokio::select! {
            _ = token.cancelled() => return,
            line = lines.recv(), if lines_open => match line {
                Some(line) => {
                    if line.contains(&marker) {
                        last_activity = Instant::now();
                    }
                }
                // Relay output ended; keep polling until timeout or cancel.
                None => lines_open = false,
            },
            _ = ticker.tick() => {
                let idle = last_activity.elapsed();
                if idle > timeout {
                    let _ = tx.send(StallNotice { idle }).await;
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector(
        lines: mpsc::Receiver<String>,
        token: &CancellationToken,
    ) -> StallDetector {
        StallDetector::spawn(
            lines,
            "frame=".to_string(),
            Duration::from_secs(10),
            Duration::from_secs(3),
            token.clone(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn fires_without_any_activity_on_the_expected_poll() {
        let (_tx, rx) = mpsc::channel(8);
        let token = CancellationToken::new();
        let mut det = detector(rx, &token);

        let started = Instant::now();
        let notice = det.stalled().await.expect("detector should fire");

        // Polls at 3s/6s/9s see idle <= 10s; the 12s poll fires.
        assert_eq!(started.elapsed(), Duration::from_secs(12));
        assert_eq!(notice.idle, Duration::from_secs(12));
    }

    #[tokio::test(start_paused = true)]
    async fn activity_marker_pushes_the_deadline_back() {
        let (tx, rx) = mpsc::channel(8);
        let token = CancellationToken::new();
        let mut det = detector(rx, &token);

        let started = Instant::now();
        tokio::spawn(async move {
            time::sleep(Duration::from_secs(9)).await;
            let _ = tx.send("frame=  240 fps= 30".to_string()).await;
            // Keep the sender alive past the expected firing point.
            time::sleep(Duration::from_secs(30)).await;
        });

        let notice = det.stalled().await.expect("detector should fire");
        // Activity at t=9s; idle exceeds 10s at t=19.x, first poll after
        // that is t=21s.
        assert_eq!(started.elapsed(), Duration::from_secs(21));
        assert_eq!(notice.idle, Duration::from_secs(12));
    }

    #[tokio::test(start_paused = true)]
    async fn non_marker_lines_do_not_count_as_activity() {
        let (tx, rx) = mpsc::channel(8);
        let token = CancellationToken::new();
        let mut det = detector(rx, &token);

        let started = Instant::now();
        tokio::spawn(async move {
            for _ in 0..20 {
                time::sleep(Duration::from_secs(1)).await;
                if tx.send("Press [q] to stop".to_string()).await.is_err() {
                    return;
                }
            }
        });

        det.stalled().await.expect("detector should fire");
        assert_eq!(started.elapsed(), Duration::from_secs(12));
    }

    #[tokio::test(start_paused = true)]
    async fn fires_even_after_diagnostics_channel_closes() {
        let (tx, rx) = mpsc::channel(8);
        let token = CancellationToken::new();
        let mut det = detector(rx, &token);
        drop(tx);

        let started = Instant::now();
        det.stalled().await.expect("detector should fire");
        assert_eq!(started.elapsed(), Duration::from_secs(12));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_check_interval_is_clamped_not_fatal() {
        let (_tx, rx) = mpsc::channel(8);
        let token = CancellationToken::new();
        let mut det = StallDetector::spawn(
            rx,
            "frame=".to_string(),
            Duration::from_millis(50),
            Duration::ZERO,
            token.clone(),
        );

        let started = Instant::now();
        det.stalled().await.expect("detector should fire");
        // Polls every clamped millisecond; fires right after the timeout.
        assert!(started.elapsed() > Duration::from_millis(50));
        assert!(started.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_detector_never_fires() {
        let (_tx, rx) = mpsc::channel(8);
        let token = CancellationToken::new();
        let mut det = detector(rx, &token);

        token.cancel();
        assert!(det.stalled().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn fires_at_most_once() {
        let (_tx, rx) = mpsc::channel(8);
        let token = CancellationToken::new();
        let mut det = detector(rx, &token);

        assert!(det.stalled().await.is_some());
        assert!(det.stalled().await.is_none());
    }
}
