//! Correlates inbound SMTP responses with the one outstanding submission.

use std::time::{Duration, Instant};

use futures::channel::oneshot;
use log::debug;

use crate::error::Error;
use crate::response::SmtpResponse;

/// What a completed (or failed) expectation resolves to.
pub type Completion = Result<Vec<SmtpResponse>, Error>;

/// A reserved slot awaiting `expected` responses from the server.
struct PendingExpectation {
    expected: usize,
    accumulated: Vec<SmtpResponse>,
    sender: oneshot::Sender<Completion>,
    debug_descriptor: String,
    deadline: Instant,
}

/// Holds at most one [`PendingExpectation`] per session, accumulates
/// inbound responses onto it, and resolves or fails it on the matching
/// terminal event.
///
/// Owned exclusively by the session's event-loop task: every method here
/// takes `&mut self` and none of them are `async`, so the type needs no
/// locking to satisfy "at most one PendingExpectation at any instant".
pub struct ResponseDemultiplexer {
    connection_id: String,
    read_timeout: Duration,
    pending: Option<PendingExpectation>,
}

impl std::fmt::Debug for ResponseDemultiplexer {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("ResponseDemultiplexer")
            .field("connection_id", &self.connection_id)
            .field("read_timeout", &self.read_timeout)
            .field("is_pending", &self.is_pending())
            .finish()
    }
}

impl ResponseDemultiplexer {
    /// Creates a demultiplexer for the session identified by `connection_id`,
    /// failing any future expectation that runs longer than `read_timeout`.
    pub fn new(connection_id: impl Into<String>, read_timeout: Duration) -> Self {
        ResponseDemultiplexer {
            connection_id: connection_id.into(),
            read_timeout,
            pending: None,
        }
    }

    /// `true` while an expectation is outstanding.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The deadline of the current expectation, if any; the event loop uses
    /// this to size its next timer sleep.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Reserves a slot for `n` upcoming responses, delivering the eventual
    /// result through `sender`.
    ///
    /// Returns `true` if the reservation succeeded and the caller should go
    /// on to write the submission's frames. Returns `false` if a prior
    /// expectation was still outstanding, in which case `sender` has
    /// already been resolved with the exact `InvalidState` message and the
    /// prior expectation is left untouched.
    pub fn expect(&mut self, n: usize, debug_descriptor: String, sender: oneshot::Sender<Completion>) -> bool {
        debug_assert!(n >= 1, "expectation count must be at least 1");

        if let Some(existing) = &self.pending {
            let message = Error::prefixed(
                &self.connection_id,
                format!(
                    "Cannot wait for a response to [{}] because we're still waiting for a response to [{}]",
                    debug_descriptor, existing.debug_descriptor
                ),
            );
            let _ = sender.send(Err(Error::InvalidState(message)));
            return false;
        }

        self.pending = Some(PendingExpectation {
            expected: n,
            accumulated: Vec::with_capacity(n),
            sender,
            debug_descriptor,
            deadline: Instant::now() + self.read_timeout,
        });
        true
    }

    /// Called when the codec produces a complete [`SmtpResponse`].
    ///
    /// Discards the response (logging at debug level) if nothing is
    /// pending; otherwise appends it and resolves the expectation once its
    /// count is reached.
    pub fn on_response(&mut self, response: SmtpResponse) {
        let done = match &mut self.pending {
            None => {
                debug!(
                    "[{}] discarding response with no pending expectation: {:?}",
                    self.connection_id, response
                );
                return;
            }
            Some(pending) => {
                pending.accumulated.push(response);
                pending.accumulated.len() == pending.expected
            }
        };

        if done {
            let pending = self.pending.take().expect("checked above");
            let _ = pending.sender.send(Ok(pending.accumulated));
        }
    }

    /// Called for transport reads that are not SMTP responses (e.g. TLS
    /// handshake events read off the same stream). Never affects `pending`.
    pub fn on_non_response_read(&self) {}

    /// Fails the pending expectation, if any, with a transport exception.
    pub fn on_exception(&mut self, error: Error) {
        if let Some(pending) = self.pending.take() {
            let _ = pending.sender.send(Err(error));
        }
    }

    /// Fails the pending expectation, if any, because the channel went
    /// inactive while it was outstanding.
    pub fn on_channel_inactive(&mut self) {
        if let Some(pending) = self.pending.take() {
            let message = Error::prefixed(
                &self.connection_id,
                format!(
                    "Handled channelInactive while waiting for a response to [{}]",
                    pending.debug_descriptor
                ),
            );
            let _ = pending.sender.send(Err(Error::ChannelClosed(message)));
        }
    }

    /// Fails the pending expectation, if any, because its deadline elapsed.
    pub fn on_timeout(&mut self) {
        if let Some(pending) = self.pending.take() {
            let message = Error::prefixed(
                &self.connection_id,
                format!(
                    "Timed out waiting for a response to [{}]",
                    pending.debug_descriptor
                ),
            );
            let _ = pending.sender.send(Err(Error::ReadTimeout(message)));
        }
    }
}
