//! The transport abstraction and the per-session event-loop task.
//!
//! A session owns exactly one live transport. Rather than a Netty-style
//! pipeline into which an inbound handler is installed, a single background
//! task reads and writes that transport directly; it is the one place that
//! ever touches [`ResponseDemultiplexer`], which is what gives "at most one
//! `PendingExpectation`, mutated without locking" for free.

use std::time::Instant;

use futures::channel::{mpsc, oneshot};
use futures::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use futures::{FutureExt, StreamExt};
use log::{debug, warn};

use crate::bridge;
use crate::codec::{Frame, SmtpResponseCodec};
use crate::demux::{Completion, ResponseDemultiplexer};
use crate::error::Error;
use crate::runtime;

/// Anything the event loop can read from and write to: a TCP stream, a TLS
/// stream wrapping one, or (in tests) an in-memory duplex pipe.
pub trait Transport: runtime::Read + runtime::Write + Unpin + Send {}

impl<T: runtime::Read + runtime::Write + Unpin + Send> Transport for T {}

/// A message sent from a `Session` handle to its event-loop task.
pub(crate) enum ChannelCommand {
    /// Reserve an expectation and write `frames`, flushing once at the end.
    Submit {
        frames: Vec<Frame>,
        expected: usize,
        debug_descriptor: String,
        completion: oneshot::Sender<Completion>,
    },
    /// Initiate a graceful close; acked once the transport is dropped.
    Close(oneshot::Sender<()>),
}

/// The sending half a `Session` handle holds; cheap to clone.
pub(crate) type ChannelSender = mpsc::UnboundedSender<ChannelCommand>;

/// Spawns the event-loop task for one session and returns the handle its
/// `Session` wraps, plus a future resolving when the channel's close
/// completion is observed.
pub(crate) fn spawn<T>(
    transport: T,
    connection_id: String,
    read_timeout: std::time::Duration,
) -> (ChannelSender, oneshot::Receiver<Result<(), Error>>)
where
    T: Transport + 'static,
{
    let (command_tx, command_rx) = mpsc::unbounded();
    let (close_tx, close_rx) = oneshot::channel();
    let demux = ResponseDemultiplexer::new(connection_id.clone(), read_timeout);

    runtime::spawn(run(transport, command_rx, demux, connection_id, close_tx));

    (command_tx, close_rx)
}

async fn run<T>(
    transport: T,
    mut commands: mpsc::UnboundedReceiver<ChannelCommand>,
    mut demux: ResponseDemultiplexer,
    connection_id: String,
    close_sender: oneshot::Sender<Result<(), Error>>,
) where
    T: Transport + 'static,
{
    let (reader, mut writer) = AsyncReadExt::split(transport);
    let mut reader = BufReader::new(reader);
    let mut codec = SmtpResponseCodec::new();
    let mut line_buf = String::new();
    let mut terminal_error: Option<Error> = None;

    'event_loop: loop {
        let deadline = demux.deadline();
        let timer = async {
            match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if deadline > now {
                        runtime::sleep(deadline - now).await;
                    }
                }
                None => std::future::pending::<()>().await,
            }
        };
        futures::pin_mut!(timer);

        line_buf.clear();
        let read_line = reader.read_line(&mut line_buf);
        futures::pin_mut!(read_line);

        // Biased so that, whenever a freshly-submitted command and a just-arrived
        // response are both ready in the same tick, the command is always
        // processed first — a response can only ever correspond to something
        // already written, so a submission must never lose a race against a
        // read it happens to be concurrent with.
        futures::select_biased! {
            cmd = commands.next() => {
                match cmd {
                    Some(ChannelCommand::Submit { frames, expected, debug_descriptor, completion }) => {
                        if !demux.expect(expected, debug_descriptor, completion) {
                            continue 'event_loop;
                        }
                        if let Err(e) = write_frames(&mut writer, frames).await {
                            let (pending_cause, terminal_cause) = same_cause(e);
                            bridge::exception_caught(&mut demux, &connection_id, pending_cause);
                            terminal_error = Some(terminal_cause);
                            break 'event_loop;
                        }
                    }
                    Some(ChannelCommand::Close(ack)) => {
                        let _ = ack.send(());
                        break 'event_loop;
                    }
                    None => break 'event_loop,
                }
            }
            result = read_line => {
                match result {
                    Ok(0) => break 'event_loop,
                    Ok(_) => {
                        let trimmed = line_buf.trim_end_matches(['\r', '\n']);
                        match codec.decode_line(trimmed) {
                            Ok(Some(response)) => bridge::channel_read(&mut demux, response),
                            Ok(None) => bridge::channel_read_non_response(&demux),
                            Err(message) => {
                                warn!("[{}] {}", connection_id, message);
                                bridge::channel_read_non_response(&demux);
                            }
                        }
                    }
                    Err(e) => {
                        let (pending_cause, terminal_cause) = same_cause(e);
                        bridge::exception_caught(&mut demux, &connection_id, pending_cause);
                        terminal_error = Some(terminal_cause);
                        break 'event_loop;
                    }
                }
            }
            () = timer => {
                demux.on_timeout();
            }
        }
    }

    bridge::channel_inactive(&mut demux);
    debug!("[{}] channel inactive", connection_id);

    let close_result = match terminal_error {
        Some(err) => Err(err),
        None => Ok(()),
    };
    let _ = close_sender.send(close_result);
}

/// Builds two independent `Error::Transport` values for the same underlying
/// I/O failure, so the pending expectation and the close-completion fail
/// with the same cause without requiring `io::Error` to be `Clone`.
fn same_cause(e: std::io::Error) -> (Error, Error) {
    let twin = std::io::Error::new(e.kind(), e.to_string());
    (Error::Transport(e), Error::Transport(twin))
}

async fn write_frames<W>(writer: &mut W, frames: Vec<Frame>) -> std::io::Result<()>
where
    W: runtime::Write + Unpin,
{
    for frame in frames {
        writer.write_all(&frame.into_bytes()).await?;
    }
    writer.flush().await
}
