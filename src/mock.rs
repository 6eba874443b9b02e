//! An in-memory duplex transport for tests.
//!
//! The event-loop task in [`crate::channel`] drives its transport as a
//! continuously-read stream rather than a one-shot request/response
//! exchange, so (unlike a plain `Cursor`-backed double) this mock must be
//! able to genuinely pend a read until a test supplies more bytes. It is
//! Built around a queue the test fills paired with one it drains, with a
//! waker added so the background task can actually sleep between responses
//! instead of seeing an empty buffer as EOF.

#![allow(missing_docs)]

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, Waker};

use futures::io::{AsyncRead, AsyncWrite};

#[derive(Default)]
struct Queue {
    bytes: VecDeque<u8>,
    closed: bool,
    failed: Option<std::io::ErrorKind>,
    waker: Option<Waker>,
}

impl Queue {
    fn push(&mut self, data: &[u8]) {
        self.bytes.extend(data);
        if let Some(waker) = self.waker.take() {
            waker.wake();
        }
    }

    fn close(&mut self) {
        self.closed = true;
        if let Some(waker) = self.waker.take() {
            waker.wake();
        }
    }

    fn fail(&mut self, kind: std::io::ErrorKind) {
        self.failed = Some(kind);
        if let Some(waker) = self.waker.take() {
            waker.wake();
        }
    }
}

/// The transport half handed to `Session::connect`.
pub struct MockTransport {
    inbound: Arc<Mutex<Queue>>,
    outbound: Arc<Mutex<Queue>>,
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("MockTransport").finish()
    }
}

/// The test-side half: queue bytes for the session to read, and inspect
/// what it wrote.
#[derive(Clone)]
pub struct MockHandle {
    inbound: Arc<Mutex<Queue>>,
    outbound: Arc<Mutex<Queue>>,
}

impl std::fmt::Debug for MockHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("MockHandle").finish()
    }
}

impl MockTransport {
    /// Creates a connected transport/handle pair.
    pub fn pair() -> (MockTransport, MockHandle) {
        let inbound = Arc::new(Mutex::new(Queue::default()));
        let outbound = Arc::new(Mutex::new(Queue::default()));
        (
            MockTransport {
                inbound: inbound.clone(),
                outbound: outbound.clone(),
            },
            MockHandle { inbound, outbound },
        )
    }
}

impl MockHandle {
    /// Queues raw bytes for the session to read next.
    pub fn queue_bytes(&self, data: &[u8]) {
        self.inbound.lock().expect("mock lock poisoned").push(data);
    }

    /// Queues a response line (a convenience over [`Self::queue_bytes`]);
    /// `text` should already end in `\r\n`.
    pub fn queue_response(&self, text: &str) {
        self.queue_bytes(text.as_bytes());
    }

    /// Simulates the peer closing the connection: the session's next read
    /// observes EOF.
    pub fn close(&self) {
        self.inbound.lock().expect("mock lock poisoned").close();
    }

    /// Simulates a transport-level failure: the session's next read observes
    /// an I/O error of `kind`, which becomes the terminal error fed through
    /// `exceptionCaught` before the channel closes.
    pub fn fail(&self, kind: std::io::ErrorKind) {
        self.inbound.lock().expect("mock lock poisoned").fail(kind);
    }

    /// Drains everything written so far, decoded as UTF-8.
    pub fn written_text(&self) -> String {
        let mut queue = self.outbound.lock().expect("mock lock poisoned");
        let bytes: Vec<u8> = queue.bytes.drain(..).collect();
        String::from_utf8(bytes).expect("mock transport only carries ASCII SMTP text in tests")
    }
}

impl AsyncRead for MockTransport {
    fn poll_read(self: Pin<&mut Self>, cx: &mut Context, buf: &mut [u8]) -> Poll<std::io::Result<usize>> {
        let mut queue = self.inbound.lock().expect("mock lock poisoned");
        if queue.bytes.is_empty() {
            if let Some(kind) = queue.failed.take() {
                return Poll::Ready(Err(std::io::Error::from(kind)));
            }
            if queue.closed {
                return Poll::Ready(Ok(0));
            }
            queue.waker = Some(cx.waker().clone());
            return Poll::Pending;
        }
        let n = std::cmp::min(buf.len(), queue.bytes.len());
        for slot in buf.iter_mut().take(n) {
            *slot = queue.bytes.pop_front().expect("checked non-empty above");
        }
        Poll::Ready(Ok(n))
    }
}

impl AsyncWrite for MockTransport {
    fn poll_write(self: Pin<&mut Self>, _cx: &mut Context, buf: &[u8]) -> Poll<std::io::Result<usize>> {
        self.outbound.lock().expect("mock lock poisoned").push(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context) -> Poll<std::io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_close(self: Pin<&mut Self>, _cx: &mut Context) -> Poll<std::io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use futures::{AsyncReadExt, AsyncWriteExt};

    #[test]
    fn test_write_then_read_written_text() {
        futures::executor::block_on(async {
            let (mut transport, handle) = MockTransport::pair();
            transport.write_all(b"EHLO there\r\n").await.unwrap();
            assert_eq!(handle.written_text(), "EHLO there\r\n");
        });
    }

    #[test]
    fn test_queued_response_is_read() {
        futures::executor::block_on(async {
            let (mut transport, handle) = MockTransport::pair();
            handle.queue_response("250 OK\r\n");
            let mut buf = [0u8; 64];
            let n = transport.read(&mut buf).await.unwrap();
            assert_eq!(&buf[..n], b"250 OK\r\n");
        });
    }

    #[test]
    fn test_close_yields_eof() {
        futures::executor::block_on(async {
            let (mut transport, handle) = MockTransport::pair();
            handle.close();
            let mut buf = [0u8; 8];
            let n = transport.read(&mut buf).await.unwrap();
            assert_eq!(n, 0);
        });
    }

    #[test]
    fn test_fail_yields_io_error() {
        futures::executor::block_on(async {
            let (mut transport, handle) = MockTransport::pair();
            handle.fail(std::io::ErrorKind::ConnectionReset);
            let mut buf = [0u8; 8];
            let err = transport.read(&mut buf).await.unwrap_err();
            assert_eq!(err.kind(), std::io::ErrorKind::ConnectionReset);
        });
    }
}
