//! The session façade: the public surface of one live SMTP connection.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::channel::oneshot;
use futures::future::{BoxFuture, FutureExt, Shared};

use crate::channel::{self, ChannelCommand, Transport};
use crate::codec::Frame;
use crate::command::SmtpCommand;
use crate::error::Error;
use crate::executor::CompletionExecutor;
use crate::extension::{Extension, ExtensionSet};
use crate::pipeline;
use crate::response::SmtpResponse;
use crate::tls::TlsConfig;

/// Sentinel default read timeout: two minutes.
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(120);

/// Default connection identifier used when none is configured.
const DEFAULT_CONNECTION_ID: &str = "unidentified-connection";

/// Which buffer-allocation strategy a higher layer should use when reading
/// off the transport. Buffer pooling itself is transport plumbing and out
/// of scope for the session engine; this marker exists only so
/// configuration call sites carry this knob explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferAllocator {
    /// A pooled allocator, reused across reads. The default.
    #[default]
    Pooled,
    /// A fresh heap allocation per read.
    Unpooled,
}

/// Session configuration values, consumed once at construction.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// The server this session talks to. Required; dialing it is a higher
    /// layer's job, but the address travels with the config for logging.
    pub remote_addr: SocketAddr,
    /// The local address to bind from, if the caller cares which one.
    pub local_addr: Option<SocketAddr>,
    /// Idle-connection keepalive interval. `None` disables keepalive.
    pub keepalive: Option<Duration>,
    /// How long a single expectation may remain unresolved before failing
    /// with [`Error::ReadTimeout`].
    pub read_timeout: Duration,
    /// Identifier prefixed onto every error message this session produces.
    pub connection_id: String,
    /// TLS trust configuration, consumed by a higher layer performing
    /// STARTTLS via [`TlsConfig::client_config`].
    pub tls: TlsConfig,
    /// Buffer-allocation strategy hint for a higher layer's transport.
    pub buffer_allocator: BufferAllocator,
}

impl SessionConfig {
    /// Starts a config for `remote_addr` with every other field defaulted.
    pub fn new(remote_addr: SocketAddr) -> Self {
        SessionConfig {
            remote_addr,
            local_addr: None,
            keepalive: None,
            read_timeout: DEFAULT_READ_TIMEOUT,
            connection_id: DEFAULT_CONNECTION_ID.to_string(),
            tls: TlsConfig::new(),
            buffer_allocator: BufferAllocator::default(),
        }
    }
}

/// Builds a [`SessionConfig`], validating fields the struct alone can't.
#[derive(Debug, Clone)]
pub struct SessionBuilder {
    config: SessionConfig,
}

impl SessionBuilder {
    /// Starts building a config for `remote_addr`.
    pub fn new(remote_addr: SocketAddr) -> Self {
        SessionBuilder {
            config: SessionConfig::new(remote_addr),
        }
    }

    /// Sets the local address to bind from.
    pub fn local_addr(mut self, addr: SocketAddr) -> Self {
        self.config.local_addr = Some(addr);
        self
    }

    /// Enables keepalive with the given interval.
    ///
    /// Rejects a zero duration with the exact configuration-error message
    /// callers of the original API rely on.
    pub fn keepalive(mut self, interval: Duration) -> Result<Self, Error> {
        if interval.is_zero() {
            return Err(Error::Configuration(
                "keepAliveTimeout must not be zero; use Optional.empty() to disable keepalive"
                    .to_string(),
            ));
        }
        self.config.keepalive = Some(interval);
        Ok(self)
    }

    /// Overrides the default two-minute read timeout.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_timeout = timeout;
        self
    }

    /// Overrides the default `"unidentified-connection"` identifier.
    pub fn connection_id(mut self, id: impl Into<String>) -> Self {
        self.config.connection_id = id.into();
        self
    }

    /// Overrides the default (platform trust store) TLS configuration.
    pub fn tls(mut self, tls: TlsConfig) -> Self {
        self.config.tls = tls;
        self
    }

    /// Overrides the default pooled buffer allocator hint.
    pub fn buffer_allocator(mut self, allocator: BufferAllocator) -> Self {
        self.config.buffer_allocator = allocator;
        self
    }

    /// Finishes building.
    pub fn build(self) -> SessionConfig {
        self.config
    }
}

/// The engine's wrapper around a server response: the code and details,
/// plus a non-owning back-reference to the session that produced it.
#[derive(Clone, Debug)]
pub struct ClientResponse {
    session: Session,
    /// The SMTP reply code.
    pub code: u16,
    /// The (possibly multi-line) reply text.
    pub details: Vec<String>,
}

impl ClientResponse {
    /// The session that produced this response.
    pub fn session(&self) -> &Session {
        &self.session
    }

    fn wrap(session: Session, response: SmtpResponse) -> Self {
        ClientResponse {
            session,
            code: response.code,
            details: response.details,
        }
    }
}

struct SessionInner {
    connection_id: String,
    sender: channel::ChannelSender,
    extensions: Mutex<ExtensionSet>,
    executor: Arc<dyn CompletionExecutor>,
    close_completion: Shared<BoxFuture<'static, Result<(), Error>>>,
}

impl std::fmt::Debug for SessionInner {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("SessionInner")
            .field("connection_id", &self.connection_id)
            .finish()
    }
}

/// A cheaply-cloneable handle to one live SMTP connection.
///
/// Every clone shares the same underlying event-loop task; dropping every
/// clone (and every [`ClientResponse`] derived from one) drops the task's
/// command sender, which ends the event loop and closes the transport.
#[derive(Clone, Debug)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    /// Connects a session over an already-established `transport`
    /// (dialing, TLS handshakes, and DNS resolution are a higher layer's
    /// job — the core only drives an already-open duplex stream).
    pub fn connect<T>(transport: T, config: SessionConfig, executor: Arc<dyn CompletionExecutor>) -> Session
    where
        T: Transport + 'static,
    {
        let (sender, close_rx) = channel::spawn(transport, config.connection_id.clone(), config.read_timeout);
        let close_completion: Shared<BoxFuture<'static, Result<(), Error>>> = async move {
            match close_rx.await {
                Ok(result) => result,
                Err(_) => Ok(()),
            }
        }
        .boxed()
        .shared();

        Session {
            inner: Arc::new(SessionInner {
                connection_id: config.connection_id,
                sender,
                extensions: Mutex::new(ExtensionSet::new()),
                executor,
                close_completion,
            }),
        }
    }

    /// This session's connection identifier.
    pub fn connection_id(&self) -> &str {
        &self.inner.connection_id
    }

    /// Sends a single command and awaits its one response.
    pub async fn send(&self, command: impl SmtpCommand) -> Result<ClientResponse, Error> {
        let frames = vec![Frame::Command(command.to_string())];
        let responses = self.submit(frames, 1, command.to_string()).await?;
        Ok(self.wrap_first(responses))
    }

    /// Sends pre-encoded content, terminated by the empty-last-chunk
    /// sentinel, and awaits the single response it produces.
    pub async fn send_content(&self, content: Vec<u8>) -> Result<ClientResponse, Error> {
        let frames = vec![Frame::Content(content), Frame::EmptyLastChunk];
        let responses = self.submit(frames, 1, "<content>".to_string()).await?;
        Ok(self.wrap_first(responses))
    }

    /// Validates and sends an optional leading content payload followed by
    /// a batch of pipelined commands, awaiting one response per wire unit.
    pub async fn send_pipelined(
        &self,
        content: Option<Vec<u8>>,
        commands: Vec<Box<dyn SmtpCommand + Send>>,
    ) -> Result<Vec<ClientResponse>, Error> {
        let kinds: Vec<_> = commands.iter().map(|c| c.kind()).collect();
        pipeline::validate(&kinds)?;

        let mut frames = Vec::with_capacity(commands.len() + 2);
        let mut debug_descriptor = String::new();
        if let Some(bytes) = content {
            frames.push(Frame::Content(bytes));
            frames.push(Frame::EmptyLastChunk);
            debug_descriptor.push_str("<content>;");
        }
        for command in &commands {
            frames.push(Frame::Command(command.to_string()));
            debug_descriptor.push_str(&command.to_string());
        }

        let expected = frames
            .iter()
            .filter(|f| !matches!(f, Frame::EmptyLastChunk))
            .count();
        let responses = self.submit(frames, expected, debug_descriptor).await?;
        Ok(responses
            .into_iter()
            .map(|r| ClientResponse::wrap(self.clone(), r))
            .collect())
    }

    /// Replaces the session's advertised-extensions set wholesale.
    ///
    /// Typically called by a higher layer after parsing an EHLO response.
    pub fn set_supported_extensions(&self, features: HashSet<Extension>) {
        self.inner.extensions.lock().expect("extensions lock poisoned").replace_with(features);
    }

    /// Checks whether the server has advertised `tag`.
    pub fn is_supported(&self, tag: Extension) -> bool {
        self.inner.extensions.lock().expect("extensions lock poisoned").contains(tag)
    }

    /// Initiates a close and awaits the channel reporting closed.
    pub async fn close(&self) -> Result<(), Error> {
        let (ack_tx, ack_rx) = oneshot::channel();
        let _ = self.inner.sender.unbounded_send(ChannelCommand::Close(ack_tx));
        let _ = ack_rx.await;
        self.close_completion().await
    }

    /// The session's close-completion: resolves exactly once, when the
    /// channel transitions to inactive. Failed with the terminal transport
    /// error if one was observed first; otherwise resolves successfully.
    pub fn close_completion(&self) -> impl std::future::Future<Output = Result<(), Error>> + Send + 'static {
        self.inner.close_completion.clone()
    }

    async fn submit(
        &self,
        frames: Vec<Frame>,
        expected: usize,
        debug_descriptor: String,
    ) -> Result<Vec<SmtpResponse>, Error> {
        let (completion_tx, completion_rx) = oneshot::channel();
        let command = ChannelCommand::Submit {
            frames,
            expected,
            debug_descriptor,
            completion: completion_tx,
        };
        if self.inner.sender.unbounded_send(command).is_err() {
            return Err(Error::ChannelClosed(Error::prefixed(
                &self.inner.connection_id,
                "channel already closed",
            )));
        }

        // Relay the demultiplexer's completion through the caller-supplied
        // executor, so neither success nor failure ever resolves on the
        // event-loop thread that produced it.
        let (result_tx, result_rx) = oneshot::channel();
        self.inner.executor.spawn(Box::pin(async move {
            let outcome = match completion_rx.await {
                Ok(result) => result,
                Err(_) => Err(Error::ChannelClosed("channel dropped before responding".to_string())),
            };
            let _ = result_tx.send(outcome);
        }));

        match result_rx.await {
            Ok(result) => result,
            Err(_) => Err(Error::ChannelClosed(Error::prefixed(
                &self.inner.connection_id,
                "completion executor dropped the pending result",
            ))),
        }
    }

    fn wrap_first(&self, mut responses: Vec<SmtpResponse>) -> ClientResponse {
        let response = responses.pop().expect("expected exactly one response");
        ClientResponse::wrap(self.clone(), response)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::command::{DataCommand, MailCommand, NoopCommand, RcptCommand};
    use crate::executor::ThreadPoolExecutor;
    use crate::mock::MockTransport;

    fn session_over(transport: MockTransport) -> Session {
        let config = SessionConfig::new("127.0.0.1:25".parse().unwrap());
        Session::connect(transport, config, Arc::new(ThreadPoolExecutor))
    }

    crate::async_test! { test_single_noop, {
        let (transport, handle) = MockTransport::pair();
        let session = session_over(transport);

        handle.queue_response("250 OK\r\n");
        let response = session.send(NoopCommand).await.unwrap();
        assert_eq!(response.code, 250);
        assert_eq!(response.details, vec!["OK".to_string()]);
        assert_eq!(handle.written_text(), "NOOP\r\n");
    }}

    crate::async_test! { test_valid_pipeline_wraps_every_response_with_session_back_reference, {
        let (transport, handle) = MockTransport::pair();
        let session = session_over(transport);

        handle.queue_response("250 OK\r\n250 OK\r\n354 go ahead\r\n");
        let commands: Vec<Box<dyn SmtpCommand + Send>> = vec![
            Box::new(MailCommand::new(Some("alice@example.com".to_string()), vec![])),
            Box::new(RcptCommand::new("bob@example.com", vec![])),
            Box::new(DataCommand),
        ];
        let responses = session.send_pipelined(None, commands).await.unwrap();
        assert_eq!(responses.len(), 3);
        assert_eq!(responses[2].code, 354);
        assert_eq!(responses[0].session().connection_id(), session.connection_id());
        assert_eq!(
            handle.written_text(),
            "MAIL FROM:<alice@example.com>\r\nRCPT TO:<bob@example.com>\r\nDATA\r\n"
        );
    }}

    crate::async_test! { test_invalid_pipeline_writes_nothing, {
        let (transport, handle) = MockTransport::pair();
        let session = session_over(transport);

        let commands: Vec<Box<dyn SmtpCommand + Send>> =
            vec![Box::new(DataCommand), Box::new(NoopCommand)];
        let err = session.send_pipelined(None, commands).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(handle.written_text(), "");
    }}

    crate::async_test! { test_channel_closed_mid_wait_resolves_close_completion_successfully, {
        let (transport, handle) = MockTransport::pair();
        let session = session_over(transport);

        let send_fut = session.send(NoopCommand);
        handle.close();
        let result = send_fut.await;
        assert!(matches!(result, Err(Error::ChannelClosed(_))));
        assert!(session.close_completion().await.is_ok());
    }}
}
