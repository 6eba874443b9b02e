//! The session engine of an async SMTP client.
//!
//! A [`session::Session`] is one live connection: it serializes writes onto
//! a transport, demultiplexes responses (including pipelined batches per
//! [RFC 2920](https://tools.ietf.org/html/rfc2920)), validates pipelining
//! rules, and tracks server-advertised ESMTP extensions. Dialing,
//! TLS handshakes, DNS resolution, and SASL mechanism negotiation live in a
//! higher layer; this crate only drives an already-open duplex stream.

#![deny(
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    missing_debug_implementations,
    missing_docs,
    clippy::unwrap_used
)]

#[cfg(not(any(feature = "runtime-tokio", feature = "runtime-async-std")))]
compile_error!("one of 'runtime-async-std' or 'runtime-tokio' features must be enabled");

#[cfg(all(feature = "runtime-tokio", feature = "runtime-async-std"))]
compile_error!("only one of 'runtime-async-std' or 'runtime-tokio' features must be enabled");

mod bridge;
mod channel;
pub mod codec;
pub mod command;
pub mod demux;
pub mod error;
pub mod executor;
pub mod extension;
pub mod mock;
pub mod pipeline;
pub mod response;
mod runtime;
pub mod session;
pub mod tls;

pub use crate::channel::Transport;
pub use crate::command::{CommandKind, SmtpCommand};
pub use crate::error::{Error, SessionResult};
pub use crate::extension::{Extension, ExtensionSet};
pub use crate::response::SmtpResponse;
pub use crate::session::{BufferAllocator, ClientResponse, Session, SessionBuilder, SessionConfig};

/// Runs an async test body under whichever runtime feature is active.
///
/// Exported unconditionally (not gated to the lib's own unit tests) so
/// integration tests under `tests/` can use it too — anything that spawns
/// a task via [`crate::session::Session::connect`] needs a live Tokio or
/// async-std reactor in scope, which plain `#[test]` does not provide.
#[macro_export]
macro_rules! async_test {
    ($name:ident, $block:block) => {
        #[cfg(feature = "runtime-tokio")]
        #[tokio::test]
        async fn $name() {
            $block
        }

        #[cfg(feature = "runtime-async-std")]
        #[async_std::test]
        async fn $name() {
            $block
        }
    };
}
