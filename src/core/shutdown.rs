//! # Cross-platform OS signal handling.
//!
//! [`wait_for_shutdown_signal`] completes when the process receives a
//! termination signal: `SIGINT`/`SIGTERM` on unix (plus Ctrl-C), Ctrl-C
//! elsewhere. Each call registers independent listeners.

/// Waits for a termination signal.
///
/// Returns `Ok(())` when any signal is received, or `Err` if signal
/// registration fails.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigint.recv() => {}
        _ = sigterm.recv() => {}
    }
    Ok(())
}

/// Waits for a termination signal (Ctrl-C).
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
