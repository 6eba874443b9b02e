//! TLS configuration, used by a higher layer to perform STARTTLS.
//!
//! The handshake itself — wrapping the live transport in a TLS stream — is
//! socket plumbing and stays with that higher layer. What the session
//! engine owns is the equivalent of `createSslEngine()`: building a
//! preconfigured connector from the session's trust-store setting.

use async_native_tls::TlsConnector;

/// Which certificates a session's TLS connector trusts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustStore {
    /// The platform's native root certificate store (the default).
    PlatformDefault,
    /// Accept any certificate, valid or not. Only useful in tests against
    /// a self-signed loopback server.
    AcceptInvalidCerts,
}

impl Default for TrustStore {
    fn default() -> Self {
        TrustStore::PlatformDefault
    }
}

/// Session-level TLS settings, supplied at [`crate::session::SessionConfig`]
/// construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TlsConfig {
    trust_store: TrustStore,
}

impl TlsConfig {
    /// Builds a config that trusts the platform's native root store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a config that accepts any certificate; for tests only.
    pub fn accept_invalid_certs() -> Self {
        TlsConfig {
            trust_store: TrustStore::AcceptInvalidCerts,
        }
    }

    /// Builds a client-mode TLS connector from this configuration, for use
    /// by the higher layer performing the STARTTLS handshake.
    pub fn client_config(&self) -> TlsConnector {
        let connector = TlsConnector::new();
        match self.trust_store {
            TrustStore::PlatformDefault => connector,
            TrustStore::AcceptInvalidCerts => connector.danger_accept_invalid_certs(true),
        }
    }
}
