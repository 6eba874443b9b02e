//! The line-level SMTP codec.
//!
//! The underlying byte-level SMTP line codec is an external collaborator
//! the session engine merely assumes. This module is the thin, literal
//! implementation of that collaborator: it frames `CODE[- ]TEXT\r\n` lines
//! into [`SmtpResponse`]s on read, and turns outbound [`Frame`]s into bytes
//! on write. It deliberately does not dot-stuff or otherwise re-encode
//! message content — callers hand the session engine already-encoded bytes.

use crate::response::{parse_response_line, SmtpResponse};

/// One unit handed to the channel for writing: a rendered command line,
/// a chunk of pre-encoded content bytes, or the empty-last-chunk sentinel
/// that terminates a DATA stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A rendered SMTP command line, CRLF-terminated.
    Command(String),
    /// A chunk of pre-encoded message content.
    Content(Vec<u8>),
    /// Sentinel marking the end of a content stream.
    EmptyLastChunk,
}

impl Frame {
    /// Renders this frame to the bytes that should be written to the wire.
    ///
    /// `EmptyLastChunk` becomes the DATA terminator; callers are responsible
    /// for any dot-stuffing of the content itself before wrapping it in
    /// `Frame::Content`.
    pub(crate) fn into_bytes(self) -> Vec<u8> {
        match self {
            Frame::Command(text) => text.into_bytes(),
            Frame::Content(bytes) => bytes,
            Frame::EmptyLastChunk => b"\r\n.\r\n".to_vec(),
        }
    }
}

/// Accumulates successive [`crate::response::ResponseLine`]s (as read off
/// the wire, one per `\r\n`-terminated line) into complete [`SmtpResponse`]s.
#[derive(Debug, Default)]
pub struct SmtpResponseCodec {
    code: Option<u16>,
    details: Vec<String>,
}

impl SmtpResponseCodec {
    /// Creates a fresh codec with no partially-accumulated response.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one raw line (CRLF already stripped) into the accumulator.
    ///
    /// Returns `Ok(Some(response))` once a non-continuation line completes
    /// a response, `Ok(None)` while more continuation lines are expected,
    /// and `Err` if the line could not be parsed as `CODE[- ]TEXT`.
    pub fn decode_line(&mut self, line: &str) -> Result<Option<SmtpResponse>, &'static str> {
        let (_, parsed) = parse_response_line(line).map_err(|_| "malformed SMTP response line")?;

        if let Some(code) = self.code {
            if code != parsed.code {
                return Err("response code changed across continuation lines");
            }
        } else {
            self.code = Some(parsed.code);
        }
        self.details.push(parsed.text);

        if parsed.is_continuation {
            Ok(None)
        } else {
            let code = self.code.take().expect("set above");
            let details = std::mem::take(&mut self.details);
            Ok(Some(SmtpResponse::new(code, details)))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_frame_into_bytes() {
        assert_eq!(
            Frame::Command("NOOP\r\n".to_string()).into_bytes(),
            b"NOOP\r\n".to_vec()
        );
        assert_eq!(Frame::Content(vec![0u8]).into_bytes(), vec![0u8]);
        assert_eq!(Frame::EmptyLastChunk.into_bytes(), b"\r\n.\r\n".to_vec());
    }

    #[test]
    fn test_single_line_response() {
        let mut codec = SmtpResponseCodec::new();
        let resp = codec.decode_line("250 OK").unwrap().unwrap();
        assert_eq!(resp.code, 250);
        assert_eq!(resp.details, vec!["OK".to_string()]);
    }

    #[test]
    fn test_multi_line_response() {
        let mut codec = SmtpResponseCodec::new();
        assert!(codec.decode_line("250-mail.example.com").unwrap().is_none());
        assert!(codec.decode_line("250-PIPELINING").unwrap().is_none());
        let resp = codec.decode_line("250 SIZE 1000000").unwrap().unwrap();
        assert_eq!(resp.code, 250);
        assert_eq!(
            resp.details,
            vec![
                "mail.example.com".to_string(),
                "PIPELINING".to_string(),
                "SIZE 1000000".to_string()
            ]
        );
    }

    #[test]
    fn test_malformed_line() {
        let mut codec = SmtpResponseCodec::new();
        assert!(codec.decode_line("not a response").is_err());
    }
}
