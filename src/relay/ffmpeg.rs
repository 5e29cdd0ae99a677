//! # ffmpeg-backed relay spawner.
//!
//! [`FfmpegRelay`] spawns the transcoding process with
//! `tokio::process::Command`:
//!
//! ```text
//! ffmpeg -i <source_url> [relay options, in order] <destination>
//! ```
//!
//! stderr is piped and split into diagnostic segments for the stall
//! detector. ffmpeg writes progress lines (`frame= ...`) terminated by `\r`
//! and regular log lines terminated by `\n`, so the splitter treats both as
//! segment boundaries.
//!
//! A monitor task owns the child: it reaps the process, reports abnormal
//! exits (non-success status) through the handle's `exits` channel, and
//! suppresses the notice when the exit was caused by an explicit `stop()`.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStderr, Command};
use tokio::sync::{mpsc, oneshot};

use crate::config::StreamConfig;
use crate::error::RelayError;

use super::handle::{ExitNotice, RelayControl, RelayHandle, RelaySpawner};

/// Buffered diagnostic lines before the oldest are awaited on.
const DIAGNOSTIC_CHANNEL_CAPACITY: usize = 64;

/// Spawner for ffmpeg relay processes.
#[derive(Clone, Debug)]
pub struct FfmpegRelay {
    binary: PathBuf,
}

impl FfmpegRelay {
    /// Creates a spawner using `ffmpeg` from `PATH`.
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("ffmpeg"),
        }
    }

    /// Overrides the ffmpeg binary path.
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }
}

impl Default for FfmpegRelay {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RelaySpawner for FfmpegRelay {
    async fn spawn(&self, cfg: &StreamConfig) -> Result<RelayHandle, RelayError> {
        let mut child = Command::new(&self.binary)
            .args(build_args(cfg))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(RelayError::Spawn)?;

        let stderr = child.stderr.take().ok_or_else(|| {
            RelayError::Spawn(std::io::Error::other("child stderr was not piped"))
        })?;

        let (line_tx, line_rx) = mpsc::channel(DIAGNOSTIC_CHANNEL_CAPACITY);
        tokio::spawn(forward_diagnostics(stderr, line_tx));

        let (exit_tx, exit_rx) = mpsc::channel(1);
        let (stop_tx, stop_rx) = oneshot::channel();
        let (done_tx, done_rx) = mpsc::channel::<()>(1);
        tokio::spawn(monitor(child, stop_rx, exit_tx, done_tx));

        Ok(RelayHandle {
            diagnostics: line_rx,
            exits: exit_rx,
            control: Box::new(FfmpegControl {
                stop_tx: Some(stop_tx),
                done: done_rx,
            }),
        })
    }
}

/// Builds the ffmpeg argument list: input, ordered options, destination.
///
/// An option with an empty value is passed as a bare flag (`-stats`).
fn build_args(cfg: &StreamConfig) -> Vec<String> {
    let mut args = Vec::with_capacity(2 + cfg.relay_options.len() * 2 + 1);
    args.push("-i".to_string());
    args.push(cfg.source_url.clone());
    for (key, value) in &cfg.relay_options {
        args.push(key.clone());
        if !value.is_empty() {
            args.push(value.clone());
        }
    }
    args.push(cfg.destination.clone());
    args
}

/// Forwards stderr to the diagnostics channel, split on `\r` and `\n`.
async fn forward_diagnostics(mut stderr: ChildStderr, tx: mpsc::Sender<String>) {
    let mut buf = [0u8; 8192];
    let mut carry = String::new();

    loop {
        let n = match stderr.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        carry.push_str(&String::from_utf8_lossy(&buf[..n]));

        while let Some(pos) = carry.find(['\r', '\n']) {
            let segment = carry[..pos].to_string();
            carry.drain(..=pos);
            if !segment.is_empty() && tx.send(segment).await.is_err() {
                return;
            }
        }
    }

    if !carry.is_empty() {
        let _ = tx.send(carry).await;
    }
}

/// Owns the child: reaps it and reports abnormal exits.
///
/// When a stop request arrives first, the child is killed and no exit notice
/// is sent. Dropping `_done_tx` on return is what unblocks `stop()`.
async fn monitor(
    mut child: Child,
    stop_rx: oneshot::Receiver<()>,
    exit_tx: mpsc::Sender<ExitNotice>,
    _done_tx: mpsc::Sender<()>,
) {
    tokio::select! {
        status = child.wait() => {
            let abnormal = match &status {
                Ok(status) => !status.success(),
                Err(_) => true,
            };
            if abnormal {
                let notice = ExitNotice {
                    code: status.ok().and_then(|s| s.code()),
                };
                let _ = exit_tx.send(notice).await;
            }
        }
        // Explicit stop, or the handle was dropped without one.
        _ = stop_rx => {
            let _ = child.start_kill();
            let _ = child.wait().await;
        }
    }
}

struct FfmpegControl {
    stop_tx: Option<oneshot::Sender<()>>,
    done: mpsc::Receiver<()>,
}

#[async_trait]
impl RelayControl for FfmpegControl {
    async fn stop(&mut self) -> Result<(), RelayError> {
        if let Some(tx) = self.stop_tx.take() {
            // Monitor already finished if this fails; nothing to kill.
            let _ = tx.send(());
        }
        // The monitor drops its end of `done` only after the child has been
        // reaped, which keeps restart sequencing strict.
        while self.done.recv().await.is_some() {}
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Child {
        Command::new("sh")
            .arg("-c")
            .arg(script)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .unwrap()
    }

    fn wire(child: Child) -> (mpsc::Receiver<ExitNotice>, FfmpegControl) {
        let (exit_tx, exit_rx) = mpsc::channel(1);
        let (stop_tx, stop_rx) = oneshot::channel();
        let (done_tx, done_rx) = mpsc::channel::<()>(1);
        tokio::spawn(monitor(child, stop_rx, exit_tx, done_tx));
        (
            exit_rx,
            FfmpegControl {
                stop_tx: Some(stop_tx),
                done: done_rx,
            },
        )
    }

    #[test]
    fn build_args_preserves_option_order_and_flags() {
        let mut cfg = StreamConfig::new("cam", "rtsp://10.0.0.1:554/live", "ws://0.0.0.0:9998");
        cfg.relay_options = vec![
            ("-r".to_string(), "60".to_string()),
            ("-codec:v".to_string(), "mpeg1video".to_string()),
            ("-stats".to_string(), String::new()),
        ];

        let args = build_args(&cfg);
        assert_eq!(
            args,
            vec![
                "-i",
                "rtsp://10.0.0.1:554/live",
                "-r",
                "60",
                "-codec:v",
                "mpeg1video",
                "-stats",
                "ws://0.0.0.0:9998",
            ]
        );
    }

    #[tokio::test]
    async fn abnormal_exit_is_reported_with_code() {
        let (mut exits, _control) = wire(sh("exit 3"));
        let notice = exits.recv().await.expect("abnormal exit notice");
        assert_eq!(notice.code, Some(3));
    }

    #[tokio::test]
    async fn clean_exit_closes_channel_without_notice() {
        let (mut exits, _control) = wire(sh("exit 0"));
        assert!(exits.recv().await.is_none());
    }

    #[tokio::test]
    async fn stop_is_idempotent_and_suppresses_exit_notice() {
        let (mut exits, mut control) = wire(sh("sleep 30"));

        control.stop().await.unwrap();
        // Stopping an already-stopped relay does not raise.
        control.stop().await.unwrap();

        // Kill-by-stop is not an abnormal exit.
        assert!(exits.recv().await.is_none());
    }

    #[tokio::test]
    async fn diagnostics_are_split_on_carriage_returns() {
        let mut child = sh(r"printf 'frame=   10 fps= 30\rframe=   20 fps= 30\rdone\n' 1>&2; sleep 1");
        let stderr = child.stderr.take().unwrap();
        let (tx, mut rx) = mpsc::channel(8);
        tokio::spawn(forward_diagnostics(stderr, tx));

        let first = rx.recv().await.unwrap();
        assert!(first.contains("frame="), "got {first:?}");
        let second = rx.recv().await.unwrap();
        assert!(second.contains("frame="), "got {second:?}");
        let third = rx.recv().await.unwrap();
        assert_eq!(third, "done");
    }
}
