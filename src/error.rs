//! Error and result type for the session engine.

use std::io;

/// An enum of all error kinds the session engine can produce.
///
/// Every string-bearing variant is pre-formatted with the owning session's
/// connection identifier (`"[<connectionId>] "`) at construction time, so
/// the message text stays stable and comparable in tests.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A pipelined submission violated a pipelining rule.
    ///
    /// Raised synchronously at the call site; nothing is written to the
    /// wire and no expectation is registered.
    #[error("{0}")]
    InvalidArgument(String),

    /// A second expectation was requested while one was already pending.
    #[error("{0}")]
    InvalidState(String),

    /// The channel closed, locally or by the peer, while an expectation was pending.
    #[error("{0}")]
    ChannelClosed(String),

    /// The read timeout elapsed before the expectation completed.
    #[error("{0}")]
    ReadTimeout(String),

    /// A lower-layer transport exception, surfaced via `exceptionCaught`.
    ///
    /// The pending expectation and the session's close-completion are always
    /// failed with an equivalent `Transport` value for the same underlying
    /// I/O failure (same `kind()` and message), so both sinks observe the
    /// same cause.
    #[error("io: {0}")]
    Transport(#[from] io::Error),

    /// A session configuration value (e.g. a zero keepalive) was invalid.
    #[error("{0}")]
    Configuration(String),

    /// TLS engine construction failed.
    #[error("tls: {0}")]
    Tls(#[from] async_native_tls::Error),
}

impl Error {
    /// Prefixes `message` with the connection identifier that owns it.
    pub(crate) fn prefixed(connection_id: &str, message: impl std::fmt::Display) -> String {
        format!("[{}] {}", connection_id, message)
    }
}

/// The session engine's result type.
pub type SessionResult<T> = std::result::Result<T, Error>;
