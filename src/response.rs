//! The response type produced by the line codec and consumed by the session engine.
//!
//! Framing multiple `CODE[- ]TEXT\r\n` lines into a single [`SmtpResponse`] is
//! the line codec's job; this module only defines the shape both sides
//! agree on, plus the minimal parser used by
//! [`crate::codec::SmtpResponseCodec`].

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while_m_n},
    character::complete::not_line_ending,
    combinator::{map, map_res},
    sequence::tuple,
    IResult,
};

/// A single parsed SMTP reply line, before multi-line accumulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResponseLine {
    pub code: u16,
    pub text: String,
    /// `true` when the separator was `-`, meaning more lines follow.
    pub is_continuation: bool,
}

/// An SMTP server response: a three-digit reply code plus its (possibly
/// multi-line) text, as produced by the codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpResponse {
    /// The three-digit reply code.
    pub code: u16,
    /// The detail lines, in the order they were sent (one entry per physical
    /// reply line, continuation marker already stripped).
    pub details: Vec<String>,
}

impl SmtpResponse {
    /// Creates a response out of a code and its detail lines.
    pub fn new(code: u16, details: Vec<String>) -> Self {
        SmtpResponse { code, details }
    }

    /// `2xx` and `3xx` codes are positive completions/intermediate replies.
    pub fn is_positive(&self) -> bool {
        self.code < 400
    }
}

fn three_digit_code(input: &str) -> IResult<&str, u16> {
    map_res(take_while_m_n(3, 3, |c: char| c.is_ascii_digit()), |s: &str| {
        s.parse::<u16>()
    })(input)
}

fn separator(input: &str) -> IResult<&str, bool> {
    alt((map(tag("-"), |_| true), map(tag(" "), |_| false)))(input)
}

/// Parses one `CODE[- ]TEXT` line (CRLF already stripped by the caller).
pub(crate) fn parse_response_line(input: &str) -> IResult<&str, ResponseLine> {
    map(
        tuple((three_digit_code, separator, not_line_ending)),
        |(code, is_continuation, text): (u16, bool, &str)| ResponseLine {
            code,
            text: text.to_string(),
            is_continuation,
        },
    )(input)
}
