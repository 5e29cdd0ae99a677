//! # Liveness prober.
//!
//! [`probe`] answers one question: does anything accept a TCP connection at
//! the source endpoint right now? It opens a transport connection with a
//! bounded timeout, drops it immediately on success, and collapses every
//! failure path (refused, unroutable, DNS failure, timeout) to `false`.
//!
//! The prober is deliberately a boolean gate, not a diagnostic tool: the
//! restart protocol only needs to know whether restarting the relay has any
//! chance of succeeding.

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time;

/// Probes `host:port` with the given timeout.
///
/// Resolves `true` on a successful connect (the connection is released
/// immediately; the port is never held open), `false` on any error or once
/// `timeout` elapses. Never returns an error.
pub async fn probe(host: &str, port: u16, timeout: Duration) -> bool {
    match time::timeout(timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(stream)) => {
            drop(stream);
            true
        }
        // Connect error or timeout: the caller only needs the gate.
        Ok(Err(_)) | Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn reachable_endpoint_resolves_true() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        assert!(probe("127.0.0.1", port, Duration::from_secs(3)).await);

        // The probe released its connection; the listener can still accept.
        drop(listener);
    }

    #[tokio::test]
    async fn refused_endpoint_resolves_false() {
        // Bind-then-drop guarantees the port is closed.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        assert!(!probe("127.0.0.1", port, Duration::from_secs(3)).await);
    }

    #[tokio::test]
    async fn unresolvable_host_resolves_false() {
        assert!(!probe("camera.invalid", 554, Duration::from_millis(500)).await);
    }

    #[tokio::test]
    async fn unreachable_host_resolves_false_within_timeout() {
        // RFC 5737 TEST-NET address: never routable, forces the timeout path.
        let started = std::time::Instant::now();
        let alive = probe("192.0.2.1", 554, Duration::from_millis(200)).await;
        assert!(!alive);
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
