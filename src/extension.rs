//! The set of ESMTP extensions a server has advertised for a session.

use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};

/// A known ESMTP capability keyword.
///
/// Unknown keywords a server advertises are tolerated silently by
/// [`ExtensionSet::replace_with`] — only the tags named here are ever held.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum Extension {
    /// `PIPELINING` — RFC 2920.
    Pipelining,
    /// `8BITMIME` — RFC 6152.
    EightBitMime,
    /// `SMTPUTF8` — RFC 6531.
    SmtpUtf8,
    /// `STARTTLS` — RFC 3207.
    StartTls,
    /// `SIZE`.
    Size,
    /// `AUTH`.
    Auth,
    /// `CHUNKING` (`BDAT`) — RFC 3030.
    Chunking,
}

impl Display for Extension {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            Extension::Pipelining => write!(f, "PIPELINING"),
            Extension::EightBitMime => write!(f, "8BITMIME"),
            Extension::SmtpUtf8 => write!(f, "SMTPUTF8"),
            Extension::StartTls => write!(f, "STARTTLS"),
            Extension::Size => write!(f, "SIZE"),
            Extension::Auth => write!(f, "AUTH"),
            Extension::Chunking => write!(f, "CHUNKING"),
        }
    }
}

/// The set of extensions a session's server currently advertises.
///
/// Parsing an EHLO response into a set of tags is a higher layer's job;
/// this type only holds the result of that parsing and answers membership
/// queries for it. Replacement is wholesale, so callers never observe a
/// partially-updated set.
#[derive(Debug, Default, Clone)]
pub struct ExtensionSet {
    features: HashSet<Extension>,
}

impl ExtensionSet {
    /// An empty set, as held before the first EHLO response is parsed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks whether `tag` was advertised.
    pub fn contains(&self, tag: Extension) -> bool {
        self.features.contains(&tag)
    }

    /// Replaces the whole set at once, typically after a higher layer
    /// parses a fresh EHLO response.
    pub fn replace_with(&mut self, features: HashSet<Extension>) {
        self.features = features;
    }

    /// `true` if no extensions have been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
