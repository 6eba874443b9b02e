//! Integration coverage for pipelining-rule validation, exercised through
//! the public `Session` surface rather than the internal `pipeline` module.

use std::sync::Arc;

use smtp_session_engine::command::{DataCommand, EhloCommand, HeloCommand, HelpCommand, NoopCommand, RcptCommand};
use smtp_session_engine::executor::ThreadPoolExecutor;
use smtp_session_engine::mock::MockTransport;
use smtp_session_engine::{Error, Session, SessionConfig, SmtpCommand};

fn session_over(transport: MockTransport) -> Session {
    let config = SessionConfig::new("127.0.0.1:25".parse().unwrap());
    Session::connect(transport, config, Arc::new(ThreadPoolExecutor))
}

smtp_session_engine::async_test! { test_helo_cannot_be_pipelined, {
    let (transport, handle) = MockTransport::pair();
    let session = session_over(transport);

    let commands: Vec<Box<dyn SmtpCommand + Send>> =
        vec![Box::new(HeloCommand::new("localhost")), Box::new(NoopCommand)];
    let err = session.send_pipelined(None, commands).await.unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert_eq!(handle.written_text(), "");
}}

smtp_session_engine::async_test! { test_help_cannot_be_pipelined, {
    let (transport, handle) = MockTransport::pair();
    let session = session_over(transport);

    let commands: Vec<Box<dyn SmtpCommand + Send>> =
        vec![Box::new(NoopCommand), Box::new(HelpCommand::new(None))];
    let err = session.send_pipelined(None, commands).await.unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert_eq!(handle.written_text(), "");
}}

smtp_session_engine::async_test! { test_ehlo_allowed_only_as_last, {
    let (transport, handle) = MockTransport::pair();
    let session = session_over(transport);

    let commands: Vec<Box<dyn SmtpCommand + Send>> =
        vec![Box::new(EhloCommand::new("localhost")), Box::new(NoopCommand)];
    let err = session.send_pipelined(None, commands).await.unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert_eq!(handle.written_text(), "");
}}

smtp_session_engine::async_test! { test_data_allowed_as_last_element_of_batch, {
    let (transport, handle) = MockTransport::pair();
    let session = session_over(transport);

    handle.queue_response("250 OK\r\n354 go ahead\r\n");
    let commands: Vec<Box<dyn SmtpCommand + Send>> =
        vec![Box::new(RcptCommand::new("bob@example.com", vec![])), Box::new(DataCommand)];
    let responses = session.send_pipelined(None, commands).await.unwrap();
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[1].code, 354);
    assert_eq!(handle.written_text(), "RCPT TO:<bob@example.com>\r\nDATA\r\n");
}}

smtp_session_engine::async_test! { test_single_command_batch_always_accepted_regardless_of_kind, {
    let (transport, handle) = MockTransport::pair();
    let session = session_over(transport);

    handle.queue_response("250 OK\r\n");
    let commands: Vec<Box<dyn SmtpCommand + Send>> = vec![Box::new(HeloCommand::new("localhost"))];
    let responses = session.send_pipelined(None, commands).await.unwrap();
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].code, 250);
    assert_eq!(handle.written_text(), "HELO localhost\r\n");
}}
