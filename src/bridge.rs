//! The inbound bridge between transport events and the demultiplexer.
//!
//! In a reactor runtime this would be a handler installed at the tail of a
//! channel pipeline. The event-loop task in [`crate::channel`] has no such
//! pipeline to install one into — it drives its own read loop — so these
//! are plain functions it calls directly, in the same order a pipeline
//! handler's `channelRead` / `exceptionCaught` / `channelInactive` would
//! have fired.

use log::debug;

use crate::demux::ResponseDemultiplexer;
use crate::error::Error;
use crate::response::SmtpResponse;

/// A complete response was read off the wire.
pub(crate) fn channel_read(demux: &mut ResponseDemultiplexer, response: SmtpResponse) {
    demux.on_response(response);
}

/// A line was read that did not parse as, or complete, an SMTP response
/// (partial continuation lines, or anything a lower layer cares about but
/// the demultiplexer can't correlate against).
pub(crate) fn channel_read_non_response(demux: &ResponseDemultiplexer) {
    demux.on_non_response_read();
}

/// A transport-level exception occurred. Fails the pending expectation, if
/// any; the caller is responsible for then closing the transport, matching
/// the ordering `exceptionCaught` → `ctx.close()` from a pipeline handler.
pub(crate) fn exception_caught(demux: &mut ResponseDemultiplexer, connection_id: &str, error: Error) {
    debug!("[{}] exception caught: {}", connection_id, error);
    demux.on_exception(error);
}

/// The channel transitioned to inactive (EOF, local close, or as the last
/// step after an exception). Fails any pending expectation with
/// `ChannelClosed`; the caller resolves the session's close-completion
/// immediately afterward.
pub(crate) fn channel_inactive(demux: &mut ResponseDemultiplexer) {
    demux.on_channel_inactive();
}
