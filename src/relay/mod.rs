//! Process-handle boundary for the managed relay subprocess.
//!
//! The supervisor treats the transcoding process as opaque: something that
//! can be started with a declarative option set, stopped idempotently, and
//! observed through two channels (diagnostic text lines and an
//! abnormal-exit notice).
//!
//! ## Contents
//! - [`RelaySpawner`] — trait seam for starting relays (mockable in tests)
//! - [`RelayHandle`] / [`RelayControl`] — control surface over one live
//!   relay process
//! - [`ExitNotice`] — abnormal-exit notification payload
//! - [`FfmpegRelay`] — production spawner over `tokio::process::Command`

mod ffmpeg;
mod handle;

pub use ffmpeg::FfmpegRelay;
pub use handle::{ExitNotice, RelayControl, RelayHandle, RelaySpawner};
