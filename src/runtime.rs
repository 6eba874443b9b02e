//! Thin shims over the two supported async runtimes.
//!
//! Every other module reaches the runtime only through this file, so a
//! session built under `runtime-async-std` and one built under
//! `runtime-tokio` share every line outside of it.

pub use futures::io::{AsyncRead as Read, AsyncReadExt, AsyncWrite as Write, AsyncWriteExt};

use std::future::Future;
use std::time::Duration;

// Dialing a `TcpStream` and performing the TLS handshake are a higher
// layer's job. That layer is free to hand either runtime's native stream
// type to `Session::connect` as long as it satisfies `futures::io::{AsyncRead,
// AsyncWrite}` — async-std's `TcpStream` does so natively; a tokio
// `TcpStream` needs a `tokio_util::compat` wrapper first, which belongs with
// that higher layer's dialing code, not here.

/// Spawns `future` to run to completion on the active runtime, detached
/// from the caller (no join handle is returned; callers that need the
/// result communicate it back over a channel, as the event-loop task and
/// [`crate::executor::CompletionExecutor`] both do).
pub fn spawn<F>(future: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    #[cfg(feature = "runtime-tokio")]
    {
        tokio::task::spawn(future);
    }
    #[cfg(feature = "runtime-async-std")]
    {
        async_std::task::spawn(future);
    }
}

/// Resolves after `duration` has elapsed, on whichever runtime is active.
pub async fn sleep(duration: Duration) {
    #[cfg(feature = "runtime-tokio")]
    {
        tokio::time::sleep(duration).await;
    }
    #[cfg(feature = "runtime-async-std")]
    {
        async_std::task::sleep(duration).await;
    }
}
